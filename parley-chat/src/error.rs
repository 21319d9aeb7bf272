//! Chat store errors.

use parley_types::error::StateError;
use parley_types::id::{PromptId, ThreadId};
use thiserror::Error;

/// Errors returned by [`ChatStore`](crate::ChatStore) operations.
///
/// Generation failures are not here: they become a fallback assistant
/// message and are handed back inside [`Reply::Failed`](crate::Reply::Failed).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ChatError {
    /// The persistence port failed to read or write the snapshot.
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// The snapshot could not be converted to or from JSON.
    #[error("snapshot serialization failed: {0}")]
    Serialization(String),

    /// No thread with this ID.
    #[error("thread not found: {0}")]
    ThreadNotFound(ThreadId),

    /// No saved prompt with this ID.
    #[error("prompt not found: {0}")]
    PromptNotFound(PromptId),
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_errors_convert() {
        let err: ChatError = StateError::WriteFailed("disk full".into()).into();
        assert!(matches!(err, ChatError::State(StateError::WriteFailed(_))));
        assert_eq!(err.to_string(), "state error: write failed: disk full");
    }

    #[test]
    fn not_found_names_the_id() {
        let err = ChatError::ThreadNotFound(ThreadId::new("t-9"));
        assert_eq!(err.to_string(), "thread not found: t-9");
    }

    #[test]
    fn json_errors_become_serialization() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: ChatError = json_err.into();
        assert!(matches!(err, ChatError::Serialization(_)));
    }
}
