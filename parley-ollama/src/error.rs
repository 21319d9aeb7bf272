//! Generation errors and helpers for mapping HTTP/reqwest failures onto them.

use thiserror::Error;

/// Everything that can go wrong with a single generation request.
///
/// `Connectivity` and `Http` abort the request and reach the caller.
/// `Decode` describes a malformed line or body; inside a stream the
/// decoder only logs it and keeps going.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The server could not be reached: failed reachability check, DNS,
    /// connection refused, timeout, or the connection dropped mid-stream.
    #[error("server unreachable: {0}")]
    Connectivity(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code.
        status: u16,
        /// Response body text, possibly empty.
        body: String,
    },

    /// The response carried no readable body.
    #[error("response has no readable body")]
    BodyUnavailable,

    /// A line or body was not valid JSON of the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// The client could not be built from its configuration.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl GenerateError {
    /// Whether the failure was reaching the server at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, GenerateError::Connectivity(_))
    }

    /// HTTP status for [`GenerateError::Http`].
    pub fn status(&self) -> Option<u16> {
        match self {
            GenerateError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Map a non-success HTTP status (from the Ollama API) to a [`GenerateError`].
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> GenerateError {
    GenerateError::Http {
        status: status.as_u16(),
        body: body.to_string(),
    }
}

/// Map a [`reqwest::Error`] raised while talking to the server.
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> GenerateError {
    if err.is_timeout() {
        GenerateError::Connectivity(format!("request timed out: {err}"))
    } else if err.is_decode() {
        GenerateError::Decode(err.to_string())
    } else {
        GenerateError::Connectivity(err.to_string())
    }
}
