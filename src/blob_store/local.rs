use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use super::{BlobStore, BlobStoreError};

/// Blob store backed by a local uploads directory.
pub struct LocalStore {
    base_path: PathBuf,
}

impl LocalStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, std::io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    /// Resolve a key inside the base directory. Keys must be plain file
    /// names: anything that could climb out of the directory is rejected.
    fn blob_path(&self, key: &str) -> Result<PathBuf, BlobStoreError> {
        if key.is_empty() || key == "." || key == ".." || key.contains('/') || key.contains('\\') {
            return Err(BlobStoreError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(key))
    }
}

#[async_trait]
impl BlobStore for LocalStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<PathBuf, BlobStoreError> {
        let path = self.blob_path(key)?;
        tokio::fs::write(&path, &data).await?;
        Ok(path)
    }

    async fn exists(&self, key: &str) -> Result<bool, BlobStoreError> {
        let path = self.blob_path(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        let path = self.blob_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
