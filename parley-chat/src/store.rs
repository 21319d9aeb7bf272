//! The chat state container and its thread, message, pin, bot and
//! preference operations.

use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use parley_ollama::{GenerateError, GenerateEvent, OllamaClient};
use parley_types::chat::{
    Bot, BotUpdate, ChatState, Message, Preferences, PreferencesUpdate, Role, Thread, UserProfile,
};
use parley_types::id::{BotId, MessageId, ThreadId};
use parley_types::state::StateStore;
use parley_types::tokens::{CharEstimate, TokenCounter};

use crate::config::ChatConfig;
use crate::error::ChatError;

/// Assistant message recorded in place of a reply when generation fails.
pub const FALLBACK_REPLY: &str = "Sorry, an error occurred while processing your message.";

/// Outcome of [`ChatStore::add_message`].
#[derive(Debug)]
pub enum Reply {
    /// The message was stored; no reply was requested (non-user role).
    Recorded,
    /// The assistant reply streamed to completion into this message.
    Completed(MessageId),
    /// Generation failed. [`FALLBACK_REPLY`] was appended to the thread.
    Failed(GenerateError),
}

impl Reply {
    /// Whether generation failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Reply::Failed(_))
    }

    /// ID of the streamed assistant message, if one completed.
    pub fn message_id(&self) -> Option<&MessageId> {
        match self {
            Reply::Completed(id) => Some(id),
            _ => None,
        }
    }
}

/// Prefix `content` with the preference instructions, if enabled.
pub fn compose_prompt(preferences: &Preferences, content: &str) -> String {
    match preferences.system_prompt() {
        Some(system) => format!("{system}\n\n{content}"),
        None => content.to_string(),
    }
}

/// Explicit chat state container.
///
/// Owns the [`ChatState`] snapshot and writes the whole of it through the
/// injected [`StateStore`] after every mutation. Methods take `&mut self`;
/// share a store between tasks by wrapping it in a lock.
pub struct ChatStore {
    pub(crate) state: ChatState,
    pub(crate) client: OllamaClient,
    pub(crate) store: Arc<dyn StateStore>,
    pub(crate) tokens: Arc<dyn TokenCounter>,
    pub(crate) config: ChatConfig,
}

impl ChatStore {
    /// Restore the snapshot from `store`, or start empty.
    pub async fn load(client: OllamaClient, store: Arc<dyn StateStore>) -> Result<Self, ChatError> {
        Self::load_with(client, store, ChatConfig::default()).await
    }

    /// Like [`load`](Self::load) with explicit configuration.
    pub async fn load_with(
        client: OllamaClient,
        store: Arc<dyn StateStore>,
        config: ChatConfig,
    ) -> Result<Self, ChatError> {
        let state = match store.read(&config.storage_key).await? {
            Some(value) => serde_json::from_value(value)?,
            None => ChatState::default(),
        };
        tracing::debug!(
            key = %config.storage_key,
            threads = state.threads.len(),
            "chat state loaded"
        );
        Ok(Self {
            state,
            client,
            store,
            tokens: Arc::new(CharEstimate),
            config,
        })
    }

    /// Replace the token counter used for message token counts.
    #[must_use]
    pub fn with_token_counter(mut self, counter: Arc<dyn TokenCounter>) -> Self {
        self.tokens = counter;
        self
    }

    /// The current snapshot.
    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// The transport client.
    pub fn client(&self) -> &OllamaClient {
        &self.client
    }

    /// The store configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Look up a thread.
    pub fn thread(&self, id: &ThreadId) -> Option<&Thread> {
        self.state.thread(id)
    }

    /// The thread marked current, if any.
    pub fn current_thread(&self) -> Option<&Thread> {
        self.state
            .current_thread_id
            .as_ref()
            .and_then(|id| self.state.thread(id))
    }

    /// Write the whole snapshot through the persistence port.
    pub async fn persist(&self) -> Result<(), ChatError> {
        let value = serde_json::to_value(&self.state)?;
        self.store.write(&self.config.storage_key, value).await?;
        Ok(())
    }

    pub(crate) fn thread_or_err(&self, id: &ThreadId) -> Result<&Thread, ChatError> {
        self.state
            .thread(id)
            .ok_or_else(|| ChatError::ThreadNotFound(id.clone()))
    }

    pub(crate) fn thread_mut_or_err(&mut self, id: &ThreadId) -> Result<&mut Thread, ChatError> {
        self.state
            .thread_mut(id)
            .ok_or_else(|| ChatError::ThreadNotFound(id.clone()))
    }

    // ━━━ Threads ━━━

    /// Create a thread when there are none.
    pub async fn initialize(&mut self) -> Result<(), ChatError> {
        if self.state.threads.is_empty() {
            self.create_thread().await?;
        }
        Ok(())
    }

    /// Append a new "New Thread" and make it current.
    pub async fn create_thread(&mut self) -> Result<ThreadId, ChatError> {
        let thread = Thread::new();
        let id = thread.id.clone();
        self.state.threads.push(thread);
        self.state.current_thread_id = Some(id.clone());
        self.persist().await?;
        Ok(id)
    }

    /// Remove a thread. Clears the current thread if it was this one.
    /// Returns whether a thread was removed.
    pub async fn delete_thread(&mut self, id: &ThreadId) -> Result<bool, ChatError> {
        let before = self.state.threads.len();
        self.state.threads.retain(|t| &t.id != id);
        if self.state.current_thread_id.as_ref() == Some(id) {
            self.state.current_thread_id = None;
        }
        let removed = self.state.threads.len() != before;
        self.persist().await?;
        Ok(removed)
    }

    /// Rename a thread.
    pub async fn set_thread_title(
        &mut self,
        id: &ThreadId,
        title: impl Into<String>,
    ) -> Result<(), ChatError> {
        self.thread_mut_or_err(id)?.title = title.into();
        self.persist().await
    }

    /// Make `id` the current thread.
    pub async fn set_current_thread(&mut self, id: &ThreadId) -> Result<(), ChatError> {
        self.thread_or_err(id)?;
        self.state.current_thread_id = Some(id.clone());
        self.persist().await
    }

    // ━━━ Messages ━━━

    /// Record `message` in a thread and, for user messages, stream the
    /// assistant reply into the same thread.
    ///
    /// Generation failures never surface as `Err`: they are logged, a
    /// [`FALLBACK_REPLY`] message is appended, and the error comes back as
    /// [`Reply::Failed`]. `Err` means the thread is missing or the snapshot
    /// could not be persisted.
    pub async fn add_message(
        &mut self,
        thread_id: &ThreadId,
        message: Message,
    ) -> Result<Reply, ChatError> {
        let is_user = message.role == Role::User;
        let content = message.content.clone();
        self.push_message(thread_id, message)?;
        self.persist().await?;

        if !is_user {
            return Ok(Reply::Recorded);
        }
        self.stream_reply(thread_id, &content).await
    }

    async fn stream_reply(&mut self, thread_id: &ThreadId, content: &str) -> Result<Reply, ChatError> {
        let prompt = compose_prompt(&self.state.preferences, content);
        let context = self.thread_or_err(thread_id)?.context.clone();

        let generation = match self.client.generate(&prompt, &context).await {
            Ok(generation) => generation,
            Err(err) => return self.fail(thread_id, err).await,
        };
        let mut events = match generation.events() {
            Ok(events) => events,
            Err(err) => return self.fail(thread_id, err).await,
        };

        let reply = Message::assistant(String::new());
        let reply_id = reply.id.clone();
        self.push_message(thread_id, reply)?;
        self.persist().await?;

        while let Some(event) = events.next().await {
            match event {
                Ok(GenerateEvent::Delta(text)) => {
                    self.append_delta(thread_id, &reply_id, &text)?;
                    self.persist().await?;
                }
                Ok(GenerateEvent::Done(summary)) => {
                    if !summary.context.is_empty() {
                        self.thread_mut_or_err(thread_id)?.context = summary.context;
                    }
                }
                Err(err) => return self.fail(thread_id, err).await,
            }
        }

        self.persist().await?;
        tracing::debug!(thread = %thread_id, message = %reply_id, "assistant reply complete");
        Ok(Reply::Completed(reply_id))
    }

    async fn fail(&mut self, thread_id: &ThreadId, err: GenerateError) -> Result<Reply, ChatError> {
        tracing::error!(thread = %thread_id, error = %err, "failed to get response from Ollama");
        self.push_message(thread_id, Message::assistant(FALLBACK_REPLY))?;
        self.persist().await?;
        Ok(Reply::Failed(err))
    }

    fn push_message(&mut self, thread_id: &ThreadId, mut message: Message) -> Result<(), ChatError> {
        message.tokens = self.tokens.count(&message.content);
        let thread = self.thread_mut_or_err(thread_id)?;
        thread.messages.push(message);
        touch(thread);
        Ok(())
    }

    fn append_delta(
        &mut self,
        thread_id: &ThreadId,
        message_id: &MessageId,
        delta: &str,
    ) -> Result<(), ChatError> {
        let thread = self
            .state
            .thread_mut(thread_id)
            .ok_or_else(|| ChatError::ThreadNotFound(thread_id.clone()))?;
        if let Some(message) = thread.message_mut(message_id) {
            message.content.push_str(delta);
            message.tokens = self.tokens.count(&message.content);
        }
        touch(thread);
        Ok(())
    }

    // ━━━ Pins ━━━

    /// Flip a message's pinned flag. Returns the new flag, or `None` when
    /// the message is not in the thread.
    pub async fn toggle_pin(
        &mut self,
        thread_id: &ThreadId,
        message_id: &MessageId,
    ) -> Result<Option<bool>, ChatError> {
        let thread = self.thread_mut_or_err(thread_id)?;
        let Some(message) = thread.message_mut(message_id) else {
            return Ok(None);
        };
        message.is_pinned = !message.is_pinned;
        let pinned = message.is_pinned;
        self.persist().await?;
        Ok(Some(pinned))
    }

    /// Copy a message into the profile pins, or remove it if it is already
    /// there. Returns whether the message is now a profile pin, or `None`
    /// when the message is not in the thread.
    pub async fn toggle_profile_pin(
        &mut self,
        thread_id: &ThreadId,
        message_id: &MessageId,
    ) -> Result<Option<bool>, ChatError> {
        let already = self.state.profile_pins.iter().any(|p| &p.id == message_id);
        let thread = self.thread_mut_or_err(thread_id)?;
        let Some(message) = thread.message_mut(message_id) else {
            return Ok(None);
        };
        message.is_profile_pin = !already;
        let copy = message.clone();

        if already {
            self.state.profile_pins.retain(|p| &p.id != message_id);
        } else {
            self.state.profile_pins.push(copy);
        }
        self.persist().await?;
        Ok(Some(!already))
    }

    /// Remove a profile pin. Returns whether one was removed.
    pub async fn delete_profile_pin(&mut self, pin_id: &MessageId) -> Result<bool, ChatError> {
        let before = self.state.profile_pins.len();
        self.state.profile_pins.retain(|p| &p.id != pin_id);
        let removed = self.state.profile_pins.len() != before;
        for thread in &mut self.state.threads {
            if let Some(message) = thread.message_mut(pin_id) {
                message.is_profile_pin = false;
            }
        }
        self.persist().await?;
        Ok(removed)
    }

    // ━━━ Bots ━━━

    /// Add a bot persona.
    pub async fn add_bot(&mut self, bot: Bot) -> Result<BotId, ChatError> {
        let id = bot.id.clone();
        self.state.bots.push(bot);
        self.persist().await?;
        Ok(id)
    }

    /// Flip a bot's favorite flag and adjust its favorite count. Returns the
    /// new flag, or `None` for an unknown bot.
    pub async fn toggle_bot_favorite(&mut self, id: &BotId) -> Result<Option<bool>, ChatError> {
        let Some(bot) = self.state.bots.iter_mut().find(|b| &b.id == id) else {
            return Ok(None);
        };
        if bot.is_favorited {
            bot.favorites = bot.favorites.saturating_sub(1);
        } else {
            bot.favorites += 1;
        }
        bot.is_favorited = !bot.is_favorited;
        let favorited = bot.is_favorited;
        self.persist().await?;
        Ok(Some(favorited))
    }

    /// Remove a bot. Returns whether one was removed.
    pub async fn delete_bot(&mut self, id: &BotId) -> Result<bool, ChatError> {
        let before = self.state.bots.len();
        self.state.bots.retain(|b| &b.id != id);
        let removed = self.state.bots.len() != before;
        self.persist().await?;
        Ok(removed)
    }

    /// Apply a partial update to a bot. Returns whether the bot exists.
    pub async fn update_bot(&mut self, id: &BotId, update: BotUpdate) -> Result<bool, ChatError> {
        let Some(bot) = self.state.bots.iter_mut().find(|b| &b.id == id) else {
            return Ok(false);
        };
        update.apply(bot);
        self.persist().await?;
        Ok(true)
    }

    // ━━━ Preferences and profile ━━━

    /// Apply a partial preferences update.
    pub async fn update_preferences(&mut self, update: PreferencesUpdate) -> Result<(), ChatError> {
        update.apply(&mut self.state.preferences);
        self.persist().await
    }

    /// Replace the user profile.
    pub async fn update_user_profile(&mut self, profile: UserProfile) -> Result<(), ChatError> {
        self.state.user_profile = profile;
        self.persist().await
    }
}

/// Refresh the derived thread fields after its messages changed.
fn touch(thread: &mut Thread) {
    thread.context_size = thread.messages.iter().map(|m| m.tokens).sum();
    thread.last_active = Utc::now();
}
