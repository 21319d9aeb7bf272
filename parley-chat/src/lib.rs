#![deny(missing_docs)]
//! Chat state container for parley.
//!
//! [`ChatStore`] holds the whole [`ChatState`](parley_types::ChatState):
//! threads and their messages, profile pins, bot personas, the prompt
//! library, preferences and the user profile. Every mutation writes the
//! snapshot through an injected [`StateStore`](parley_types::StateStore).
//!
//! Sending a user message streams the assistant reply from Ollama into the
//! thread delta by delta, recounting tokens and persisting as it goes.
//! Dropping the `add_message` future abandons the stream and closes the
//! connection.

mod config;
mod error;
mod prompts;
mod store;
mod summary;

pub use config::{ChatConfig, DEFAULT_STORAGE_KEY, DEFAULT_SUMMARY_THRESHOLD};
pub use error::ChatError;
pub use store::{ChatStore, FALLBACK_REPLY, Reply, compose_prompt};
pub use summary::SUMMARY_PREFIX;
