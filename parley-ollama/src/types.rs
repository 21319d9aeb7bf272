//! Ollama `/api/generate` request/response types.
//!
//! Key differences from the `/api/chat` endpoint:
//! - A single `prompt` string instead of a message list
//! - Conversation continuity comes from the opaque `context` token array
//!   returned on the final chunk and sent back with the next request
//! - Streamed chunks carry the text delta in `response`, not `message.content`

use serde::{Deserialize, Serialize};

/// Ollama `/api/generate` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "deepseek-r1:8b").
    pub model: String,
    /// Prompt text.
    pub prompt: String,
    /// Continuation tokens from the previous generation. Omitted entirely
    /// for one-off requests such as summaries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<i64>>,
    /// Whether to stream the response as NDJSON.
    pub stream: bool,
    /// How long to keep the model loaded in memory (e.g. "5m", "0").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
    /// Generation options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>,
}

/// Sampling and runtime options for Ollama.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Sampling temperature (0.0 - 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum number of tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
    /// Context window size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
    /// Top-p (nucleus sampling).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Top-k sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Random seed for reproducibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

/// One line of a streamed `/api/generate` response.
///
/// Every field is optional on decode: the decoder only relies on
/// `response`, and on `done`/`context` for the final line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerateChunk {
    /// Model that generated the chunk.
    pub model: Option<String>,
    /// Server timestamp, RFC 3339.
    pub created_at: Option<String>,
    /// Incremental text.
    pub response: Option<String>,
    /// Set on the final chunk.
    pub done: bool,
    /// Why generation stopped (e.g. "stop").
    pub done_reason: Option<String>,
    /// Updated continuation tokens (final chunk only).
    pub context: Option<Vec<i64>>,
    /// Total time spent generating the response in nanoseconds.
    pub total_duration: Option<u64>,
    /// Time spent loading the model in nanoseconds.
    pub load_duration: Option<u64>,
    /// Number of tokens in the prompt.
    pub prompt_eval_count: Option<u64>,
    /// Time spent evaluating the prompt in nanoseconds.
    pub prompt_eval_duration: Option<u64>,
    /// Number of tokens generated.
    pub eval_count: Option<u64>,
    /// Time spent generating the response in nanoseconds.
    pub eval_duration: Option<u64>,
}

/// Body of a non-streaming (`stream: false`) response. Same shape as the
/// final streamed chunk, with the complete text in `response`.
pub type GenerateResponse = GenerateChunk;

/// Something the stream decoder produced.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateEvent {
    /// Incremental text.
    Delta(String),
    /// The server marked the generation complete.
    Done(GenerationSummary),
}

/// Metadata from the final `done: true` chunk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationSummary {
    /// Continuation tokens to send with the next request.
    pub context: Vec<i64>,
    /// Why generation stopped.
    pub done_reason: Option<String>,
    /// Prompt tokens evaluated.
    pub prompt_eval_count: Option<u64>,
    /// Tokens generated.
    pub eval_count: Option<u64>,
    /// Total generation time in nanoseconds.
    pub total_duration: Option<u64>,
}

impl GenerateChunk {
    /// The text delta carried by this chunk, if any. Empty strings count
    /// as no delta.
    pub fn delta(&self) -> Option<&str> {
        self.response.as_deref().filter(|s| !s.is_empty())
    }

    /// Split the chunk into the events it represents: a delta first, then
    /// the completion marker.
    pub fn into_events(mut self) -> Vec<GenerateEvent> {
        let mut events = Vec::with_capacity(2);
        if let Some(text) = self.response.take().filter(|s| !s.is_empty()) {
            events.push(GenerateEvent::Delta(text));
        }
        if self.done {
            events.push(GenerateEvent::Done(GenerationSummary {
                context: self.context.unwrap_or_default(),
                done_reason: self.done_reason,
                prompt_eval_count: self.prompt_eval_count,
                eval_count: self.eval_count,
                total_duration: self.total_duration,
            }));
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn streaming_request_always_carries_context() {
        let req = GenerateRequest {
            model: "deepseek-r1:8b".into(),
            prompt: "hi".into(),
            context: Some(vec![]),
            stream: true,
            keep_alive: None,
            options: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"model": "deepseek-r1:8b", "prompt": "hi", "context": [], "stream": true})
        );
    }

    #[test]
    fn one_off_request_omits_context() {
        let req = GenerateRequest {
            model: "m".into(),
            prompt: "p".into(),
            context: None,
            stream: false,
            keep_alive: Some("5m".into()),
            options: Some(GenerateOptions {
                temperature: Some(0.2),
                ..Default::default()
            }),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("context").is_none());
        assert_eq!(value["keep_alive"], "5m");
        assert_eq!(value["options"], json!({"temperature": 0.2}));
    }

    #[test]
    fn final_chunk_decodes_with_context() {
        let chunk: GenerateChunk = serde_json::from_value(json!({
            "model": "deepseek-r1:8b",
            "created_at": "2024-01-01T00:00:00Z",
            "response": "",
            "done": true,
            "done_reason": "stop",
            "context": [1, 2, 3],
            "eval_count": 10,
            "prompt_eval_count": 20
        }))
        .unwrap();

        let events = chunk.into_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            GenerateEvent::Done(summary) => {
                assert_eq!(summary.context, vec![1, 2, 3]);
                assert_eq!(summary.done_reason.as_deref(), Some("stop"));
                assert_eq!(summary.eval_count, Some(10));
            }
            other => panic!("expected Done, got {other:?}"),
        }
    }

    #[test]
    fn delta_then_done_in_one_chunk() {
        let chunk: GenerateChunk =
            serde_json::from_value(json!({"response": "bye", "done": true})).unwrap();
        let events = chunk.into_events();
        assert_eq!(events[0], GenerateEvent::Delta("bye".into()));
        assert!(matches!(events[1], GenerateEvent::Done(_)));
    }

    #[test]
    fn chunk_without_response_has_no_delta() {
        let chunk: GenerateChunk = serde_json::from_value(json!({"done": false})).unwrap();
        assert!(chunk.delta().is_none());
        assert!(chunk.into_events().is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let chunk: GenerateChunk =
            serde_json::from_value(json!({"response": "x", "thinking": "hmm"})).unwrap();
        assert_eq!(chunk.delta(), Some("x"));
    }
}
