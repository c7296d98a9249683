use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

/// Headroom on top of the upload cap so multipart framing does not trip the
/// transport body limit before the handler's exact size check runs.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_size as usize + MULTIPART_OVERHEAD;

    Router::new()
        // Uploads and metadata
        .route(
            "/files",
            post(handlers::upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/files/:token", get(handlers::get_file_by_token))
        // Shareable download URL
        .route("/file/:token", get(handlers::serve_file))
        // Aggregate stats
        .route("/stats", get(handlers::file_stats))
        // Internal
        .route("/_internal/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
