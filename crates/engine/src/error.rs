use facia_core::error::CoreError;
use facia_recognition::ProviderError;

use crate::store::StoreError;

/// Error type for all engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain-level error (not-found, validation, conflict, external).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A failure reading or writing the image store.
    #[error("Image store error: {0}")]
    Store(#[from] StoreError),

    /// A local image decode/encode failure (face-region cropping).
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),
}

impl EngineError {
    /// Whether the retry policy may re-attempt the failed operation.
    /// Only transient external-service failures qualify.
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::Core(core) if core.is_transient())
    }
}

impl From<ProviderError> for EngineError {
    fn from(err: ProviderError) -> Self {
        EngineError::Core(err.into())
    }
}
