//! Display token counting.

/// Counts tokens for display next to a message.
///
/// The count is informational only; nothing is truncated based on it.
pub trait TokenCounter: Send + Sync {
    /// Count tokens in `text`.
    fn count(&self, text: &str) -> usize;
}

/// Rough estimate: 4 bytes per token, rounded up.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharEstimate;

impl TokenCounter for CharEstimate {
    fn count(&self, text: &str) -> usize {
        text.len().div_ceil(4)
    }
}
