//! # parley-types — shared chat types and the persistence port
//!
//! | Module | What it holds |
//! |--------|---------------|
//! | [`chat`] | Threads, messages, bots, saved prompts, preferences, the [`ChatState`] snapshot |
//! | [`id`] | Typed string IDs |
//! | [`state`] | The [`StateStore`] persistence port |
//! | [`tokens`] | The [`TokenCounter`] trait and a default estimator |
//! | [`error`] | [`StateError`] |
//!
//! Nothing here performs I/O. Transport lives in `parley-ollama`, storage
//! backends in `parley-state-memory` / `parley-state-fs`, and the state
//! container that ties them together in `parley-chat`.
//!
//! Protocol traits use `async-trait` so they stay object safe behind
//! `Arc<dyn StateStore>`.

#![deny(missing_docs)]

pub mod chat;
pub mod error;
pub mod id;
pub mod state;
pub mod tokens;

pub use chat::{
    Bot, BotUpdate, ChatState, FileAttachment, Message, Preferences, PreferencesUpdate,
    PromptUpdate, Role, SavedPrompt, Theme, Thread, UserProfile,
};
pub use error::StateError;
pub use id::{AttachmentId, BotId, MessageId, PromptId, ThreadId};
pub use state::StateStore;
pub use tokens::{CharEstimate, TokenCounter};
