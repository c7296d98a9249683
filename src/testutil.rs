//! Shared test helpers for tokenbox unit tests.

use std::sync::Arc;

use crate::blob_store::LocalStore;
use crate::config::Config;
use crate::storage::Database;
use crate::AppState;

/// Create a test AppState with a temporary database and local blob store.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let data_dir = temp_dir.path().join("data");
    let uploads_dir = temp_dir.path().join("uploads");

    let config = Config {
        bind_address: "127.0.0.1:0".to_string(),
        data_dir: data_dir.to_string_lossy().to_string(),
        uploads_dir: uploads_dir.to_string_lossy().to_string(),
        max_upload_size: 10 * 1024 * 1024, // 10MB for tests
        public_base_url: None,
    };

    let db = Database::open(&data_dir).expect("Failed to open test database");
    let blob_store = LocalStore::new(&uploads_dir).expect("Failed to create test blob store");

    Arc::new(AppState {
        config,
        db,
        blob_store: Arc::new(blob_store),
    })
}
