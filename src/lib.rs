//! tokenbox - a minimal file-sharing service with token-gated downloads
//!
//! Clients upload a file and receive a shareable token URL; anyone holding
//! the token can fetch the file or its metadata. This crate provides:
//! - An uploads-directory blob store behind a swappable trait
//! - redb embedded database for file metadata (ACID, MVCC, crash-safe)
//! - REST API with multipart upload support

pub mod api;
pub mod blob_store;
pub mod config;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use config::Config;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub blob_store: Arc<dyn blob_store::BlobStore>,
}
