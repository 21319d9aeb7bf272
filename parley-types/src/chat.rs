//! Chat domain types: threads, messages, bots, saved prompts and preferences.
//!
//! Everything here serializes in camelCase so a persisted [`ChatState`]
//! snapshot keeps the field names the chat UI has always written.

use crate::id::{AttachmentId, BotId, MessageId, PromptId, ThreadId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// The human user.
    User,
    /// The model.
    Assistant,
}

/// A file attached to a message. Only metadata is tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachment {
    /// Attachment identifier.
    pub id: AttachmentId,
    /// Original file name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Where the file can be fetched from, if anywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A single message in a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message identifier.
    pub id: MessageId,
    /// Author role.
    pub role: Role,
    /// Text content. Grows while a reply is streaming.
    pub content: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Pinned within its thread.
    #[serde(default)]
    pub is_pinned: bool,
    /// Pinned to the user's profile.
    #[serde(default)]
    pub is_profile_pin: bool,
    /// Display token count of `content`.
    #[serde(default)]
    pub tokens: usize,
    /// Attached files.
    #[serde(default)]
    pub attachments: Vec<FileAttachment>,
}

impl Message {
    /// Create a message with a fresh ID and the current timestamp.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            is_pinned: false,
            is_profile_pin: false,
            tokens: 0,
            attachments: Vec::new(),
        }
    }

    /// Shorthand for a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Shorthand for an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    /// Thread identifier.
    pub id: ThreadId,
    /// Title shown in the sidebar.
    pub title: String,
    /// Free-form thread content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Ordered messages.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Size of the context window in use.
    #[serde(default)]
    pub context_size: usize,
    /// Last time the thread was touched.
    pub last_active: DateTime<Utc>,
    /// Summary of earlier messages, if one was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Bot persona the thread was started with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<BotId>,
    /// Continuation tokens returned by the last completed generation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<i64>,
}

impl Thread {
    /// Create an empty thread titled "New Thread".
    pub fn new() -> Self {
        Self {
            id: ThreadId::generate(),
            title: "New Thread".into(),
            content: None,
            messages: Vec::new(),
            context_size: 0,
            last_active: Utc::now(),
            summary: None,
            bot_id: None,
            context: Vec::new(),
        }
    }

    /// Find a message by ID.
    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// Find a message by ID, mutably.
    pub fn message_mut(&mut self, id: &MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| &m.id == id)
    }
}

impl Default for Thread {
    fn default() -> Self {
        Self::new()
    }
}

/// A bot persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bot {
    /// Bot identifier.
    pub id: BotId,
    /// Display name.
    pub name: String,
    /// Icon name or emoji.
    pub icon: String,
    /// Short description.
    pub description: String,
    /// Capabilities the bot advertises.
    #[serde(default)]
    pub abilities: Vec<String>,
    /// Data sources the bot draws on.
    #[serde(default)]
    pub data_sources: Vec<String>,
    /// Tags for filtering.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Created by the user rather than shipped.
    #[serde(default)]
    pub is_custom: bool,
    /// Author name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Favourite count.
    #[serde(default)]
    pub favorites: u32,
    /// Whether the current user favourited it.
    #[serde(default)]
    pub is_favorited: bool,
    /// Visible to other users.
    #[serde(default)]
    pub is_public: bool,
}

impl Bot {
    /// Create a custom bot with a fresh ID.
    pub fn new(
        name: impl Into<String>,
        icon: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: BotId::generate(),
            name: name.into(),
            icon: icon.into(),
            description: description.into(),
            abilities: Vec::new(),
            data_sources: Vec::new(),
            tags: Vec::new(),
            is_custom: true,
            created_by: None,
            created_at: Utc::now(),
            favorites: 0,
            is_favorited: false,
            is_public: false,
        }
    }
}

/// Partial update for a [`Bot`]. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotUpdate {
    /// New `name`, if changing.
    pub name: Option<String>,
    /// New `icon`, if changing.
    pub icon: Option<String>,
    /// New `description`, if changing.
    pub description: Option<String>,
    /// New `abilities`, if changing.
    pub abilities: Option<Vec<String>>,
    /// New `data_sources`, if changing.
    pub data_sources: Option<Vec<String>>,
    /// New `tags`, if changing.
    pub tags: Option<Vec<String>>,
    /// New `is_public`, if changing.
    pub is_public: Option<bool>,
}

impl BotUpdate {
    /// Apply the set fields to `bot`.
    pub fn apply(self, bot: &mut Bot) {
        if let Some(v) = self.name {
            bot.name = v;
        }
        if let Some(v) = self.icon {
            bot.icon = v;
        }
        if let Some(v) = self.description {
            bot.description = v;
        }
        if let Some(v) = self.abilities {
            bot.abilities = v;
        }
        if let Some(v) = self.data_sources {
            bot.data_sources = v;
        }
        if let Some(v) = self.tags {
            bot.tags = v;
        }
        if let Some(v) = self.is_public {
            bot.is_public = v;
        }
    }
}

/// An entry in the prompt library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPrompt {
    /// Prompt identifier.
    pub id: PromptId,
    /// Title.
    pub title: String,
    /// Prompt text.
    pub content: String,
    /// Tags for filtering.
    #[serde(default)]
    pub tags: Vec<String>,
    /// When it was saved.
    pub timestamp: DateTime<Utc>,
    /// When it was last sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
    /// How many times it was sent.
    #[serde(default)]
    pub use_count: u32,
}

/// Partial update for a [`SavedPrompt`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptUpdate {
    /// New `title`, if changing.
    pub title: Option<String>,
    /// New `content`, if changing.
    pub content: Option<String>,
    /// New `tags`, if changing.
    pub tags: Option<Vec<String>>,
    /// New `last_used`, if changing.
    pub last_used: Option<DateTime<Utc>>,
    /// New `use_count`, if changing.
    pub use_count: Option<u32>,
}

impl PromptUpdate {
    /// Apply the set fields to `prompt`.
    pub fn apply(self, prompt: &mut SavedPrompt) {
        if let Some(v) = self.title {
            prompt.title = v;
        }
        if let Some(v) = self.content {
            prompt.content = v;
        }
        if let Some(v) = self.tags {
            prompt.tags = v;
        }
        if let Some(v) = self.last_used {
            prompt.last_used = Some(v);
        }
        if let Some(v) = self.use_count {
            prompt.use_count = v;
        }
    }
}

/// Colour theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme.
    Light,
    /// Dark theme.
    Dark,
}

/// User chat preferences. Some of them shape the prompt sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Response language, lowercase (e.g. "english").
    pub language: String,
    /// Colour theme.
    pub theme: Theme,
    /// Stream replies as they are generated.
    pub stream_responses: bool,
    /// Prefix prompts with the preference instructions below.
    pub chat_preferences_enabled: bool,
    /// Ask for emojis.
    pub use_emojis: bool,
    /// Ask for a formal tone.
    pub formal_tone: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: "english".into(),
            theme: Theme::Dark,
            stream_responses: true,
            chat_preferences_enabled: true,
            use_emojis: false,
            formal_tone: true,
        }
    }
}

impl Preferences {
    /// Build the instruction block prepended to user prompts.
    ///
    /// Returns `None` when preference instructions are disabled.
    pub fn system_prompt(&self) -> Option<String> {
        if !self.chat_preferences_enabled {
            return None;
        }
        let mut prompt = String::from("Please follow these preferences:\n");
        if self.language != "english" {
            prompt.push_str(&format!("- Respond in {}\n", self.language));
        }
        if self.use_emojis {
            prompt.push_str("- Use appropriate emojis in responses\n");
        }
        if self.formal_tone {
            prompt.push_str("- Use formal language and tone\n");
        }
        Some(prompt)
    }
}

/// Partial update for [`Preferences`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    /// New `language`, if changing.
    pub language: Option<String>,
    /// New `theme`, if changing.
    pub theme: Option<Theme>,
    /// New `stream_responses`, if changing.
    pub stream_responses: Option<bool>,
    /// New `chat_preferences_enabled`, if changing.
    pub chat_preferences_enabled: Option<bool>,
    /// New `use_emojis`, if changing.
    pub use_emojis: Option<bool>,
    /// New `formal_tone`, if changing.
    pub formal_tone: Option<bool>,
}

impl PreferencesUpdate {
    /// Apply the set fields to `prefs`.
    pub fn apply(self, prefs: &mut Preferences) {
        if let Some(v) = self.language {
            prefs.language = v;
        }
        if let Some(v) = self.theme {
            prefs.theme = v;
        }
        if let Some(v) = self.stream_responses {
            prefs.stream_responses = v;
        }
        if let Some(v) = self.chat_preferences_enabled {
            prefs.chat_preferences_enabled = v;
        }
        if let Some(v) = self.use_emojis {
            prefs.use_emojis = v;
        }
        if let Some(v) = self.formal_tone {
            prefs.formal_tone = v;
        }
    }
}

/// The local user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Organisational unit.
    pub unit: String,
    /// Team name.
    pub team: String,
    /// Listed skills.
    #[serde(default)]
    pub competencies: Vec<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "John Doe".into(),
            email: "john.doe@company.com".into(),
            unit: "Engineering".into(),
            team: "Frontend".into(),
            competencies: vec!["React".into(), "TypeScript".into(), "UI/UX".into()],
        }
    }
}

/// Complete chat state. This is the snapshot written through the
/// persistence port after every change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatState {
    /// All threads, oldest first.
    pub threads: Vec<Thread>,
    /// The thread shown in the transcript.
    pub current_thread_id: Option<ThreadId>,
    /// Bot personas.
    pub bots: Vec<Bot>,
    /// Messages pinned to the profile (copies).
    pub profile_pins: Vec<Message>,
    /// The user's profile.
    pub user_profile: UserProfile,
    /// Prompt library.
    pub saved_prompts: Vec<SavedPrompt>,
    /// Chat preferences.
    pub preferences: Preferences,
}

impl ChatState {
    /// Find a thread by ID.
    pub fn thread(&self, id: &ThreadId) -> Option<&Thread> {
        self.threads.iter().find(|t| &t.id == id)
    }

    /// Find a thread by ID, mutably.
    pub fn thread_mut(&mut self, id: &ThreadId) -> Option<&mut Thread> {
        self.threads.iter_mut().find(|t| &t.id == id)
    }

    /// Find a message in any thread.
    pub fn find_message(&self, id: &MessageId) -> Option<&Message> {
        self.threads.iter().find_map(|t| t.message(id))
    }
}
