//! Persisted snapshot layout.

use parley_types::{ChatState, Role, Theme, ThreadId};

/// A snapshot as the chat UI writes it: millisecond-string IDs, camelCase
/// fields, no continuation context yet, and fields this crate ignores.
const LEGACY_SNAPSHOT: &str = r#"{
  "threads": [
    {
      "id": "1717171717171",
      "title": "New Thread",
      "messages": [
        {
          "id": "1717171717200",
          "role": "user",
          "content": "Hello",
          "timestamp": "2024-05-31T16:08:37.200Z",
          "isPinned": false,
          "tokens": 1
        },
        {
          "id": "1717171717300",
          "role": "assistant",
          "content": "Hi! How can I help?",
          "timestamp": "2024-05-31T16:08:37.300Z",
          "isPinned": true,
          "tokens": 6,
          "attachments": []
        }
      ],
      "contextSize": 0,
      "lastActive": "2024-05-31T16:08:37.171Z"
    }
  ],
  "currentThreadId": "1717171717171",
  "bots": [],
  "profilePins": [],
  "userProfile": {
    "name": "John Doe",
    "email": "john.doe@company.com",
    "unit": "Engineering",
    "team": "Frontend",
    "competencies": ["React", "TypeScript", "UI/UX"],
    "personalHive": []
  },
  "savedPrompts": [],
  "preferences": {
    "language": "english",
    "theme": "dark",
    "streamResponses": true,
    "chatPreferencesEnabled": true,
    "useEmojis": false,
    "formalTone": true
  }
}"#;

#[test]
fn legacy_snapshot_loads() {
    let state: ChatState = serde_json::from_str(LEGACY_SNAPSHOT).unwrap();

    assert_eq!(state.current_thread_id, Some(ThreadId::new("1717171717171")));
    let thread = &state.threads[0];
    assert!(thread.context.is_empty());
    assert_eq!(thread.messages.len(), 2);
    assert_eq!(thread.messages[1].role, Role::Assistant);
    assert!(thread.messages[1].is_pinned);
    assert!(!thread.messages[1].is_profile_pin);
    assert_eq!(state.preferences.theme, Theme::Dark);
    assert_eq!(state.user_profile.competencies.len(), 3);
}

#[test]
fn snapshot_roundtrips_through_json() {
    let state: ChatState = serde_json::from_str(LEGACY_SNAPSHOT).unwrap();
    let value = serde_json::to_value(&state).unwrap();

    assert!(value["threads"][0].get("lastActive").is_some());
    assert!(value["threads"][0].get("context").is_none());
    assert_eq!(value["preferences"]["formalTone"], true);

    let back: ChatState = serde_json::from_value(value).unwrap();
    assert_eq!(back, state);
}

#[test]
fn empty_object_is_default_state() {
    let state: ChatState = serde_json::from_str("{}").unwrap();
    assert_eq!(state, ChatState::default());
}
