//! Provider error classification.
//!
//! The recognition service fails independently of the local store, so every
//! error must be classified as transient (retried with backoff) or terminal
//! (surfaced immediately). The split feeds [`facia_core::error::CoreError`]
//! so orchestrators never branch on HTTP details.

use facia_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Network-level failure: connect, DNS, timeout, broken stream.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered 429 or an equivalent throttling response.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The submitted image could not be processed (malformed bytes,
    /// unsupported format, no decodable content).
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// The collection's template quota is exhausted.
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Any other API-level rejection.
    #[error("Recognition service error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the documented shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Whether a retry with backoff may succeed.
    ///
    /// Server-side 5xx responses count as transient; everything the caller
    /// can't fix by waiting is terminal.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Transport(_) | ProviderError::RateLimited(_) => true,
            ProviderError::Api { status, .. } => *status >= 500,
            ProviderError::InvalidImage(_)
            | ProviderError::QuotaExceeded(_)
            | ProviderError::MalformedResponse(_) => false,
        }
    }
}

impl From<ProviderError> for CoreError {
    fn from(err: ProviderError) -> Self {
        if err.is_transient() {
            CoreError::TransientExternal(err.to_string())
        } else {
            CoreError::TerminalExternal(err.to_string())
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err.to_string())
    }
}
