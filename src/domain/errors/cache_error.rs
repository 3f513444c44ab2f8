//! Cache and store error types.

use thiserror::Error;

use super::GenerationError;

/// Result type for file cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors that can occur during file cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The generator failed; nothing was written.
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
    /// I/O error during a cache operation.
    #[error("IO error: {0}")]
    Io(String),
    /// The derived key would escape the cache root.
    #[error("invalid cache key: {0}")]
    InvalidKey(String),
}

impl CacheError {
    /// Creates an I/O error with context.
    #[must_use]
    pub fn io(context: &str, error: &std::io::Error) -> Self {
        Self::Io(format!("{context}: {error}"))
    }
}

/// Errors raised by persistent key/value stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error while reading or writing the store.
    #[error("store IO error: {0}")]
    Io(String),
    /// The stored data could not be (de)serialized.
    #[error("store serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
