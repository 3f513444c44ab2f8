//! Remote service error types.

use thiserror::Error;

/// Errors talking to the remote avatar service.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ProbeError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("failed to create HTTP client: {message}")]
    Client { message: String },
}

impl ProbeError {
    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::transport("failed to connect to avatar service")
        } else {
            Self::transport(e.to_string())
        }
    }
}
