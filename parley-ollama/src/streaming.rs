//! NDJSON streaming support for the Ollama Generate API.
//!
//! Ollama emits one JSON object per line:
//! ```text
//! {"model":"deepseek-r1:8b","response":"Hello","done":false}
//! {"model":"deepseek-r1:8b","response":" world","done":false}
//! {"model":"deepseek-r1:8b","response":"","done":true,"done_reason":"stop","context":[1,2,3]}
//! ```
//!
//! Framing is strictly one object per line. A pretty-printed object spread
//! over several lines is not reassembled: each of its lines fails to parse
//! and is dropped.
//!
//! Reference: <https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-completion>

use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::StatusCode;

use crate::error::GenerateError;
use crate::types::{GenerateChunk, GenerateEvent};

/// Boxed error carried by a [`ByteStream`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A single-pass response body.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send>>;

/// Decoded events, in arrival order.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<GenerateEvent, GenerateError>> + Send>>;

/// Decoded text deltas, in arrival order.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String, GenerateError>> + Send>>;

/// An in-flight generation: the response status plus its unread body.
///
/// Returned by [`OllamaClient::generate`](crate::OllamaClient::generate)
/// once the server has answered 2xx. The body can be consumed once, either
/// as [`events`](Self::events) or as plain [`deltas`](Self::deltas).
/// Dropping the resulting stream closes the connection.
pub struct Generation {
    status: StatusCode,
    body: Option<ByteStream>,
}

impl Generation {
    /// Wrap a status and an optional body.
    pub fn new(status: StatusCode, body: Option<ByteStream>) -> Self {
        Self { status, body }
    }

    /// Wrap a reqwest response. Null-body statuses (204, 205, 304) carry
    /// no body.
    pub(crate) fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let body = if is_null_body_status(status) {
            None
        } else {
            let stream = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| Box::new(e) as BoxError));
            Some(Box::pin(stream) as ByteStream)
        };
        Self { status, body }
    }

    /// HTTP status of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the body is still available to read.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Take the raw body, leaving the generation without one.
    pub fn take_body(&mut self) -> Option<ByteStream> {
        self.body.take()
    }

    /// Decode the body into [`GenerateEvent`]s.
    pub fn events(mut self) -> Result<EventStream, GenerateError> {
        let body = self.body.take().ok_or(GenerateError::BodyUnavailable)?;
        Ok(Box::pin(decode_events(body)))
    }

    /// Decode the body into text deltas, dropping the completion marker.
    pub fn deltas(mut self) -> Result<DeltaStream, GenerateError> {
        let body = self.body.take().ok_or(GenerateError::BodyUnavailable)?;
        Ok(Box::pin(decode_deltas(body)))
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generation")
            .field("status", &self.status)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

fn is_null_body_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT | StatusCode::NOT_MODIFIED
    )
}

/// Decode a byte stream into text deltas.
///
/// See [`decode_events`] for the framing and error rules.
pub fn decode_deltas<S, E>(bytes: S) -> impl Stream<Item = Result<String, GenerateError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    decode_events(bytes).filter_map(|event| async move {
        match event {
            Ok(GenerateEvent::Delta(text)) => Some(Ok(text)),
            Ok(GenerateEvent::Done(_)) => None,
            Err(e) => Some(Err(e)),
        }
    })
}

/// Decode a raw NDJSON byte stream into [`GenerateEvent`]s.
///
/// Partial lines and partial UTF-8 sequences are carried across chunks, so
/// the output does not depend on where chunk boundaries fall. Lines that
/// are not valid JSON are logged and skipped. A read error from the source
/// ends the stream after one `Err(GenerateError::Connectivity)` item.
///
/// The source is owned by the returned stream and dropped exactly once:
/// when the stream finishes, fails, or is itself dropped.
pub fn decode_events<S, E>(
    bytes: S,
) -> impl Stream<Item = Result<GenerateEvent, GenerateError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    async_stream::stream! {
        let mut decoder = NdjsonDecoder::new();
        let mut source = Box::pin(bytes);
        let mut failed = false;

        while let Some(chunk_result) = source.next().await {
            let chunk = match chunk_result {
                Ok(b) => b,
                Err(e) => {
                    failed = true;
                    yield Err(GenerateError::Connectivity(format!("stream read error: {e}")));
                    break;
                }
            };

            for chunk in decoder.push(&chunk) {
                for event in chunk.into_events() {
                    yield Ok(event);
                }
            }
        }
        drop(source);

        if !failed {
            for chunk in decoder.finish() {
                for event in chunk.into_events() {
                    yield Ok(event);
                }
            }
            tracing::debug!("generation stream drained");
        }
    }
}

/// Incremental NDJSON line decoder.
///
/// Bytes go in through [`push`](Self::push); every line completed by those
/// bytes comes out parsed. Invalid UTF-8 is replaced with U+FFFD rather
/// than failing the line.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    /// Trailing bytes of an incomplete UTF-8 sequence.
    pending: Vec<u8>,
    /// Decoded text not yet terminated by `\n`.
    line_buf: String,
}

impl NdjsonDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning every chunk completed by it.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<GenerateChunk> {
        self.decode_utf8(bytes);

        let mut out = Vec::new();
        while let Some(newline_pos) = self.line_buf.find('\n') {
            let line: String = self.line_buf.drain(..=newline_pos).collect();
            if let Some(chunk) = parse_line(&line) {
                out.push(chunk);
            }
        }
        out
    }

    /// Flush at end of input: an unterminated final line is parsed if it is
    /// complete JSON, and leftover partial UTF-8 becomes U+FFFD.
    pub fn finish(&mut self) -> Vec<GenerateChunk> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.line_buf.push_str(&String::from_utf8_lossy(&rest));
        }
        let remaining = std::mem::take(&mut self.line_buf);
        parse_line(&remaining).into_iter().collect()
    }

    /// Text buffered but not yet terminated by a newline.
    pub fn buffered(&self) -> &str {
        &self.line_buf
    }

    fn decode_utf8(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);

        let mut start = 0;
        loop {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(text) => {
                    self.line_buf.push_str(text);
                    start = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid_end = start + e.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&self.pending[start..valid_end]) {
                        self.line_buf.push_str(text);
                    }
                    match e.error_len() {
                        Some(len) => {
                            self.line_buf.push(char::REPLACEMENT_CHARACTER);
                            start = valid_end + len;
                        }
                        // Incomplete sequence at the end; wait for more bytes.
                        None => {
                            start = valid_end;
                            break;
                        }
                    }
                }
            }
        }
        self.pending.drain(..start);
    }
}

/// Parse one line. Blank lines and lines that are not a JSON object of the
/// chunk shape yield `None`; the latter are logged.
fn parse_line(line: &str) -> Option<GenerateChunk> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<GenerateChunk>(line) {
        Ok(chunk) => Some(chunk),
        Err(e) => {
            tracing::warn!(error = %e, line_len = line.len(), "skipping malformed NDJSON line");
            None
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Poll};

    fn chunks(parts: &[&[u8]]) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
        let owned: Vec<Result<Bytes, std::io::Error>> = parts
            .iter()
            .map(|p| Ok(Bytes::copy_from_slice(p)))
            .collect();
        stream::iter(owned)
    }

    async fn collect_deltas(parts: &[&[u8]]) -> Vec<String> {
        decode_deltas(chunks(parts))
            .map(|r| r.expect("no transport errors"))
            .collect()
            .await
    }

    /// A byte source that counts how many times it is dropped.
    struct CountingSource<S> {
        inner: S,
        drops: Arc<AtomicUsize>,
    }

    impl<S: Stream + Unpin> Stream for CountingSource<S> {
        type Item = S::Item;

        fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            Pin::new(&mut self.inner).poll_next(cx)
        }
    }

    impl<S> Drop for CountingSource<S> {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn split_object_across_chunks() {
        let deltas = collect_deltas(&[
            b"{\"respo",
            b"nse\":\"Hi\"}\n{\"response\":\" there\"}\n",
        ])
        .await;
        assert_eq!(deltas, vec!["Hi", " there"]);
    }

    #[tokio::test]
    async fn chunk_boundaries_do_not_change_output() {
        let body = "{\"response\":\"Hej \"}\n{\"response\":\"värld 🌍\"}\n\n{\"response\":\"!\",\"done\":true}\n";
        let bytes = body.as_bytes();
        let whole = collect_deltas(&[bytes]).await;
        assert_eq!(whole, vec!["Hej ", "värld 🌍", "!"]);

        for split in 1..bytes.len() {
            let (a, b) = bytes.split_at(split);
            assert_eq!(collect_deltas(&[a, b]).await, whole, "split at byte {split}");
        }

        let singles: Vec<&[u8]> = bytes.chunks(1).collect();
        assert_eq!(collect_deltas(&singles).await, whole);
    }

    #[tokio::test]
    async fn invalid_line_is_skipped() {
        let deltas = collect_deltas(&[
            b"{\"response\":\"a\"}\nnot json at all\n{\"response\":\"b\"}\n",
        ])
        .await;
        assert_eq!(deltas, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn object_without_response_yields_nothing() {
        let deltas = collect_deltas(&[
            b"{\"model\":\"m\",\"done\":false}\n{\"response\":\"x\"}\n",
        ])
        .await;
        assert_eq!(deltas, vec!["x"]);
    }

    #[tokio::test]
    async fn non_object_json_is_skipped() {
        let deltas = collect_deltas(&[b"[1,2]\n42\n\"s\"\n{\"response\":\"ok\"}\n"]).await;
        assert_eq!(deltas, vec!["ok"]);
    }

    #[tokio::test]
    async fn crlf_line_endings() {
        let deltas = collect_deltas(&[b"{\"response\":\"a\"}\r\n{\"response\":\"b\"}\r\n"]).await;
        assert_eq!(deltas, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn unterminated_final_line_is_flushed() {
        let deltas = collect_deltas(&[b"{\"response\":\"a\"}\n{\"response\":\"b\"}"]).await;
        assert_eq!(deltas, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn pretty_printed_json_is_dropped() {
        let body = b"{\n  \"response\": \"lost\"\n}\n{\"response\":\"kept\"}\n";
        let deltas = collect_deltas(&[body]).await;
        assert_eq!(deltas, vec!["kept"]);
    }

    #[tokio::test]
    async fn done_event_carries_context() {
        let events: Vec<_> = decode_events(chunks(&[
            b"{\"response\":\"hi\"}\n{\"response\":\"\",\"done\":true,\"context\":[7,8]}\n",
        ]))
        .collect()
        .await;
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Ok(GenerateEvent::Delta(t)) if t == "hi"));
        match &events[1] {
            Ok(GenerateEvent::Done(summary)) => assert_eq!(summary.context, vec![7, 8]),
            other => panic!("expected Done, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn read_error_ends_stream_after_earlier_deltas() {
        let parts: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"{\"response\":\"a\"}\n")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
            Ok(Bytes::from_static(b"{\"response\":\"never\"}\n")),
        ];
        let items: Vec<_> = decode_deltas(stream::iter(parts)).collect().await;
        assert_eq!(items.len(), 2);
        assert!(matches!(&items[0], Ok(t) if t == "a"));
        assert!(matches!(&items[1], Err(GenerateError::Connectivity(msg)) if msg.contains("reset")));
    }

    #[tokio::test]
    async fn source_released_once_on_completion() {
        let drops = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            inner: chunks(&[b"{\"response\":\"a\"}\n"]).boxed(),
            drops: Arc::clone(&drops),
        };
        let out: Vec<_> = decode_deltas(source).collect().await;
        assert_eq!(out.len(), 1);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn source_released_once_on_read_error() {
        let drops = Arc::new(AtomicUsize::new(0));
        let parts: Vec<Result<Bytes, std::io::Error>> =
            vec![Err(std::io::Error::other("boom"))];
        let source = CountingSource {
            inner: stream::iter(parts).boxed(),
            drops: Arc::clone(&drops),
        };
        let out: Vec<_> = decode_deltas(source).collect().await;
        assert!(out[0].is_err());
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn source_released_once_when_consumer_abandons() {
        let drops = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            inner: chunks(&[b"{\"response\":\"a\"}\n{\"response\":\"b\"}\n", b"{\"response\":\"c\"}\n"])
                .boxed(),
            drops: Arc::clone(&drops),
        };
        let mut deltas = Box::pin(decode_deltas(source));
        let first = deltas.next().await;
        assert!(matches!(first, Some(Ok(t)) if t == "a"));
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        drop(deltas);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn decoder_keeps_partial_line_buffered() {
        let mut decoder = NdjsonDecoder::new();
        assert_eq!(decoder.push(b"{\"response\":\"a\"}\n{\"resp").len(), 1);
        assert_eq!(decoder.buffered(), "{\"resp");
    }

    #[test]
    fn decoder_carries_split_multibyte_char() {
        let mut decoder = NdjsonDecoder::new();
        let text = "{\"response\":\"é\"}\n".as_bytes();
        let split = text.iter().position(|&b| b == 0xC3).unwrap() + 1;
        assert!(decoder.push(&text[..split]).is_empty());
        let out = decoder.push(&text[split..]);
        assert_eq!(out[0].response.as_deref(), Some("é"));
    }

    #[test]
    fn decoder_replaces_invalid_utf8() {
        let mut decoder = NdjsonDecoder::new();
        let out = decoder.push(b"{\"response\":\"a\xFFb\"}\n");
        assert_eq!(out[0].response.as_deref(), Some("a\u{FFFD}b"));
    }

    #[test]
    fn finish_on_empty_decoder_yields_nothing() {
        let mut decoder = NdjsonDecoder::new();
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn generation_without_body_is_unavailable() {
        let generation = Generation::new(StatusCode::NO_CONTENT, None);
        assert!(!generation.has_body());
        assert!(matches!(generation.deltas(), Err(GenerateError::BodyUnavailable)));
    }

    #[test]
    fn taken_body_is_unavailable() {
        let body: ByteStream = Box::pin(stream::empty());
        let mut generation = Generation::new(StatusCode::OK, Some(body));
        assert!(generation.take_body().is_some());
        assert!(matches!(generation.events(), Err(GenerateError::BodyUnavailable)));
    }

    #[test]
    fn null_body_statuses() {
        assert!(is_null_body_status(StatusCode::NO_CONTENT));
        assert!(is_null_body_status(StatusCode::NOT_MODIFIED));
        assert!(!is_null_body_status(StatusCode::OK));
    }
}
