#![deny(missing_docs)]
//! Ollama client for parley.
//!
//! Talks to a locally running Ollama server through `/api/generate`:
//! a reachability check against `/api/tags`, a streaming generation whose
//! NDJSON body is decoded incrementally into text deltas, and a
//! non-streaming variant used for summaries. Ollama runs locally, so there
//! are no auth headers.

mod client;
mod config;
mod error;
pub mod streaming;
pub mod types;

pub use client::{EMPTY_SUMMARY, OllamaClient};
pub use config::{DEFAULT_BASE_URL, DEFAULT_MODEL, OllamaConfig};
pub use error::GenerateError;
pub use streaming::{
    ByteStream, DeltaStream, EventStream, Generation, NdjsonDecoder, decode_deltas, decode_events,
};
pub use types::{
    GenerateChunk, GenerateEvent, GenerateOptions, GenerateRequest, GenerateResponse,
    GenerationSummary,
};
