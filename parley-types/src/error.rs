//! Error types shared across parley crates.

use thiserror::Error;

/// Persistence errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StateError {
    /// Key not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Reading from the backing medium failed.
    #[error("read failed: {0}")]
    ReadFailed(String),

    /// Writing to or deleting from the backing medium failed.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        StateError::Serialization(err.to_string())
    }
}
