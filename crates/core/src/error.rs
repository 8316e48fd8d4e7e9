use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A recoverable failure from the external recognition service
    /// (network, timeout, rate limit). Eligible for retry with backoff.
    #[error("Transient external failure: {0}")]
    TransientExternal(String),

    /// A permanent failure from the external recognition service
    /// (malformed image, quota exhausted). Never retried.
    #[error("Terminal external failure: {0}")]
    TerminalExternal(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the retry policy may re-attempt the failed operation.
    pub fn is_transient(&self) -> bool {
        matches!(self, CoreError::TransientExternal(_))
    }
}
