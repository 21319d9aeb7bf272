//! Thread summaries.

use parley_ollama::OllamaClient;
use parley_types::id::ThreadId;

use crate::error::ChatError;
use crate::store::ChatStore;

/// Prefix on summaries that were generated or truncated.
pub const SUMMARY_PREFIX: &str = "Summary of previous messages:\n";

impl ChatStore {
    /// Produce and store a summary of a thread's messages.
    ///
    /// Short threads are stored verbatim. Longer ones are summarized by the
    /// model; if that fails the text is truncated instead. Returns the
    /// stored summary.
    pub async fn summarize_thread(&mut self, thread_id: &ThreadId) -> Result<String, ChatError> {
        let text = self
            .thread_or_err(thread_id)?
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let summary = condense(&self.client, &text, self.config.summary_threshold).await;
        self.thread_mut_or_err(thread_id)?.summary = Some(summary.clone());
        self.persist().await?;
        Ok(summary)
    }
}

async fn condense(client: &OllamaClient, text: &str, threshold: usize) -> String {
    if text.chars().count() <= threshold {
        return text.to_string();
    }
    match client.generate_summary(text).await {
        Ok(summary) => format!("{SUMMARY_PREFIX}{summary}"),
        Err(err) => {
            tracing::warn!(error = %err, "summary generation failed, truncating");
            let head: String = text.chars().take(threshold.saturating_sub(3)).collect();
            format!("{SUMMARY_PREFIX}{head}...")
        }
    }
}
