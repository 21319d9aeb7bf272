//! The persistence port: how the chat snapshot survives restarts.

use crate::error::StateError;
use async_trait::async_trait;

/// Key-value persistence port.
///
/// The chat store writes its whole snapshot under one key after every
/// change; nothing above this trait knows whether the bytes land in a
/// `HashMap`, a directory of JSON files or a browser-style local cache.
///
/// Implementations:
/// - `MemoryStore`: HashMap (testing, ephemeral)
/// - `FsStore`: one JSON file per key
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read a value by key. Returns None if the key doesn't exist.
    async fn read(&self, key: &str) -> Result<Option<serde_json::Value>, StateError>;

    /// Write a value. Creates or overwrites.
    async fn write(&self, key: &str, value: serde_json::Value) -> Result<(), StateError>;

    /// Delete a value. No-op if key doesn't exist.
    async fn delete(&self, key: &str) -> Result<(), StateError>;

    /// List keys starting with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StateError>;
}
