mod local;

pub use local::LocalStore;

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid blob key: {0}")]
    InvalidKey(String),
}

/// Abstraction over blob storage backends.
/// Keys are storage filenames -- the raw blobs are meaningless without the
/// metadata DB.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write a blob under `key`, returning the path it was stored at.
    async fn put(&self, key: &str, data: Bytes) -> Result<PathBuf, BlobStoreError>;
    async fn exists(&self, key: &str) -> Result<bool, BlobStoreError>;
    async fn delete(&self, key: &str) -> Result<(), BlobStoreError>;
}
