//! Prompt library: saving messages as reusable prompts, searching and
//! replaying them.

use chrono::Utc;
use parley_types::chat::{Message, PromptUpdate, SavedPrompt};
use parley_types::id::{MessageId, PromptId, ThreadId};

use crate::error::ChatError;
use crate::store::{ChatStore, Reply};

impl ChatStore {
    /// Save the content of a message, from any thread, as a prompt.
    ///
    /// Returns `None` without changing anything when no thread holds the
    /// message.
    pub async fn save_prompt(
        &mut self,
        message_id: &MessageId,
        title: impl Into<String>,
        tags: Vec<String>,
    ) -> Result<Option<PromptId>, ChatError> {
        let Some(message) = self.state.find_message(message_id) else {
            return Ok(None);
        };
        let prompt = SavedPrompt {
            id: PromptId::generate(),
            title: title.into(),
            content: message.content.clone(),
            tags,
            timestamp: Utc::now(),
            last_used: None,
            use_count: 0,
        };
        let id = prompt.id.clone();
        self.state.saved_prompts.push(prompt);
        self.persist().await?;
        Ok(Some(id))
    }

    /// Apply a partial update to a saved prompt.
    pub async fn update_prompt(
        &mut self,
        id: &PromptId,
        update: PromptUpdate,
    ) -> Result<(), ChatError> {
        let prompt = self
            .state
            .saved_prompts
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| ChatError::PromptNotFound(id.clone()))?;
        update.apply(prompt);
        self.persist().await
    }

    /// Remove a saved prompt. Returns whether one was removed.
    pub async fn delete_prompt(&mut self, id: &PromptId) -> Result<bool, ChatError> {
        let before = self.state.saved_prompts.len();
        self.state.saved_prompts.retain(|p| &p.id != id);
        let removed = self.state.saved_prompts.len() != before;
        self.persist().await?;
        Ok(removed)
    }

    /// Start a new thread with the prompt's content as the user message.
    ///
    /// The prompt's use count and last-used time are bumped before the
    /// message is sent, so they are recorded even if generation fails.
    pub async fn use_prompt(&mut self, id: &PromptId) -> Result<(ThreadId, Reply), ChatError> {
        let (content, use_count) = self
            .state
            .saved_prompts
            .iter()
            .find(|p| &p.id == id)
            .map(|p| (p.content.clone(), p.use_count))
            .ok_or_else(|| ChatError::PromptNotFound(id.clone()))?;

        self.update_prompt(
            id,
            PromptUpdate {
                use_count: Some(use_count + 1),
                last_used: Some(Utc::now()),
                ..Default::default()
            },
        )
        .await?;

        let thread_id = self.create_thread().await?;
        let reply = self.add_message(&thread_id, Message::user(content)).await?;
        Ok((thread_id, reply))
    }

    /// Prompts whose title or content contains `query` (case-insensitive)
    /// and that carry every tag in `tags`.
    pub fn search_prompts(&self, query: &str, tags: &[String]) -> Vec<&SavedPrompt> {
        let query = query.to_lowercase();
        self.state
            .saved_prompts
            .iter()
            .filter(|p| {
                p.title.to_lowercase().contains(&query) || p.content.to_lowercase().contains(&query)
            })
            .filter(|p| tags.iter().all(|t| p.tags.contains(t)))
            .collect()
    }

    /// Distinct tags across all saved prompts, in first-seen order.
    pub fn prompt_tags(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for tag in self.state.saved_prompts.iter().flat_map(|p| &p.tags) {
            if !seen.contains(&tag.as_str()) {
                seen.push(tag);
            }
        }
        seen
    }
}
