//! Chat store configuration.

use serde::{Deserialize, Serialize};

/// Key the chat snapshot is persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "chat_store_state";

/// Threads whose joined text is at most this many characters are kept
/// verbatim instead of summarized.
pub const DEFAULT_SUMMARY_THRESHOLD: usize = 300;

/// Static configuration for a [`ChatStore`](crate::ChatStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Persistence key for the whole-state snapshot.
    pub storage_key: String,
    /// Character count above which `summarize_thread` asks the model.
    pub summary_threshold: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.into(),
            summary_threshold: DEFAULT_SUMMARY_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ChatConfig::default();
        assert_eq!(config.storage_key, "chat_store_state");
        assert_eq!(config.summary_threshold, 300);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: ChatConfig = serde_json::from_str(r#"{"summary_threshold":50}"#).unwrap();
        assert_eq!(config.summary_threshold, 50);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    }
}
