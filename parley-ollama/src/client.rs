//! Ollama API client struct and builder.

use std::time::Duration;

use crate::config::{DEFAULT_BASE_URL, DEFAULT_MODEL, OllamaConfig, normalize_base_url};
use crate::error::{GenerateError, map_http_status, map_reqwest_error};
use crate::streaming::Generation;
use crate::types::{GenerateOptions, GenerateRequest, GenerateResponse};

/// Text returned by [`OllamaClient::generate_summary`] when the model
/// produced nothing.
pub const EMPTY_SUMMARY: &str = "No summary generated.";

/// Client for the Ollama Generate API.
///
/// # Example
///
/// ```no_run
/// use futures::StreamExt;
/// use parley_ollama::OllamaClient;
///
/// # async fn run() -> Result<(), parley_ollama::GenerateError> {
/// let client = OllamaClient::new()
///     .model("llama3.2")
///     .base_url("http://localhost:11434");
///
/// let mut deltas = client.generate("Say hi", &[]).await?.deltas()?;
/// while let Some(delta) = deltas.next().await {
///     print!("{}", delta?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OllamaClient {
    /// Model identifier sent with every request.
    pub(crate) model: String,
    /// API base URL (override for testing or remote Ollama instances).
    pub(crate) base_url: String,
    /// Optional keep_alive duration string (e.g. "5m", "0" to unload).
    pub(crate) keep_alive: Option<String>,
    /// Optional sampling options.
    pub(crate) options: Option<GenerateOptions>,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new client with sensible defaults.
    ///
    /// Default model: `deepseek-r1:8b`.
    /// Default base URL: `http://localhost:11434`.
    /// No authentication, no timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            keep_alive: None,
            options: None,
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from an [`OllamaConfig`].
    pub fn from_config(config: &OllamaConfig) -> Result<Self, GenerateError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| GenerateError::Config(e.to_string()))?;

        Ok(Self {
            model: config.model.clone(),
            base_url: normalize_base_url(&config.base_url),
            keep_alive: config.keep_alive.clone(),
            options: None,
            client,
        })
    }

    /// Override the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL.
    ///
    /// Useful for testing with a local mock server or a remote Ollama instance.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(&url.into());
        self
    }

    /// Set the keep_alive duration for model memory residency.
    ///
    /// Examples: `"5m"` (keep for 5 minutes), `"0"` (unload immediately after request).
    /// When not set, Ollama uses its server default.
    #[must_use]
    pub fn keep_alive(mut self, duration: impl Into<String>) -> Self {
        self.keep_alive = Some(duration.into());
        self
    }

    /// Set sampling options sent with every request.
    #[must_use]
    pub fn options(mut self, options: GenerateOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Use a preconfigured HTTP client (proxies, timeouts, TLS roots).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// The configured model.
    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Build the generate endpoint URL.
    pub(crate) fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    /// Build the reachability endpoint URL.
    pub(crate) fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url)
    }

    /// Build the request body for `prompt`.
    pub fn request(&self, prompt: &str, context: Option<&[i64]>, stream: bool) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            context: context.map(<[i64]>::to_vec),
            stream,
            keep_alive: self.keep_alive.clone(),
            options: self.options.clone(),
        }
    }

    /// Reachability check: GET `/api/tags`. Any 2xx means available; a
    /// non-2xx status or a network failure means unavailable.
    pub async fn check_connection(&self) -> bool {
        let url = self.tags_url();
        match self.client.get(&url).send().await {
            Ok(response) => {
                let ok = response.status().is_success();
                tracing::debug!(url = %url, status = %response.status(), ok, "reachability check");
                ok
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "reachability check failed");
                false
            }
        }
    }

    /// Start a streaming generation.
    ///
    /// Runs the reachability check first and fails with
    /// [`GenerateError::Connectivity`] without sending the POST when the
    /// server is not available. On a 2xx answer returns the in-flight
    /// [`Generation`]; read it with [`Generation::deltas`] or
    /// [`Generation::events`]. Nothing is retried.
    pub async fn generate(
        &self,
        prompt: &str,
        context: &[i64],
    ) -> Result<Generation, GenerateError> {
        if !self.check_connection().await {
            return Err(GenerateError::Connectivity(format!(
                "Ollama is not reachable at {}",
                self.base_url
            )));
        }

        let url = self.generate_url();
        let body = self.request(prompt, Some(context), true);

        tracing::debug!(url = %url, model = %body.model, context_len = context.len(), "sending streaming generate request to Ollama");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body_text, "Ollama rejected generate request");
            return Err(map_http_status(status, &body_text));
        }

        Ok(Generation::from_response(response))
    }

    /// Non-streaming generation (`stream: false`): one JSON object with the
    /// complete `response`.
    pub async fn generate_complete(
        &self,
        prompt: &str,
        context: Option<&[i64]>,
    ) -> Result<GenerateResponse, GenerateError> {
        let url = self.generate_url();
        let body = self.request(prompt, context, false);

        tracing::debug!(url = %url, model = %body.model, "sending generate request to Ollama");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let response_text = response.text().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %response_text, "Ollama rejected generate request");
            return Err(map_http_status(status, &response_text));
        }

        serde_json::from_str(&response_text)
            .map_err(|e| GenerateError::Decode(format!("invalid JSON response: {e}")))
    }

    /// Summarize `text` with a one-off non-streaming request.
    ///
    /// Returns [`EMPTY_SUMMARY`] when the model answered with no text.
    pub async fn generate_summary(&self, text: &str) -> Result<String, GenerateError> {
        let prompt = format!("Summarize the following conversation briefly:\n\n{text}");
        let response = self.generate_complete(&prompt, None).await?;
        Ok(response
            .response
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| EMPTY_SUMMARY.to_string()))
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}
