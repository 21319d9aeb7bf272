//! Typed ID wrappers for threads, messages, bots and saved prompts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed ID wrappers keep a thread ID from being passed where a message ID
/// is expected. They are plain strings underneath: IDs restored from an
/// older snapshot keep whatever format they were written with.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a typed ID from anything that converts to String.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh random (UUID v4) ID.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

typed_id!(ThreadId, "Unique identifier for a conversation thread.");
typed_id!(MessageId, "Unique identifier for a message within a thread.");
typed_id!(BotId, "Unique identifier for a bot persona.");
typed_id!(PromptId, "Unique identifier for a saved prompt.");
typed_id!(AttachmentId, "Unique identifier for a file attachment.");
