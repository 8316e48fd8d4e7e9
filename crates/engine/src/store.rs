//! Image storage access.
//!
//! Upload transport is out of scope; the engine only needs to read the
//! original bytes back (detection, search, crop-for-indexing), persist new
//! uploads under an opaque key, and drop the bytes when a photo is deleted.
//! [`LocalImageStore`] keeps files on the local filesystem; an object-store
//! port would implement the same trait.

use std::path::PathBuf;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Image not found in store: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Read the full image bytes for a storage key.
    async fn load(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Persist image bytes under a fresh opaque key, returned to the caller.
    async fn save(&self, bytes: &[u8]) -> Result<String, StoreError>;

    /// Remove the stored bytes. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Filesystem-backed image store. Keys are UUIDs, one file per key.
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Keys are generated by `save`, but guard against traversal anyway in
    /// case a hand-edited row reaches us.
    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() || key.contains('/') || key.contains("..") {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn load(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, bytes: &[u8]) -> Result<String, StoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let key = uuid::Uuid::new_v4().to_string();
        let path = self.root.join(&key);
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(key = %key, size = bytes.len(), "Image stored");
        Ok(key)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
