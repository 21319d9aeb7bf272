#![deny(missing_docs)]
//! # parley — umbrella crate
//!
//! Provides a single import surface for the parley chat core. Re-exports
//! the protocol types and the Ollama client unconditionally, the chat
//! store and state backends behind feature flags, plus a `prelude` for the
//! happy path.

pub use parley_ollama;
pub use parley_types;

#[cfg(feature = "chat")]
pub use parley_chat;
#[cfg(feature = "state-fs")]
pub use parley_state_fs;
#[cfg(feature = "state-memory")]
pub use parley_state_memory;

/// Happy-path imports for building a chat client.
pub mod prelude {
    pub use parley_types::{
        Bot, BotId, ChatState, Message, MessageId, Preferences, PromptId, Role, SavedPrompt,
        StateError, StateStore, Thread, ThreadId, TokenCounter,
    };

    pub use parley_ollama::{
        GenerateError, GenerateEvent, Generation, OllamaClient, OllamaConfig,
    };

    #[cfg(feature = "chat")]
    pub use parley_chat::{ChatConfig, ChatError, ChatStore, Reply};

    #[cfg(feature = "state-memory")]
    pub use parley_state_memory::MemoryStore;

    #[cfg(feature = "state-fs")]
    pub use parley_state_fs::FsStore;
}
