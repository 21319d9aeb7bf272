//! Client configuration, with defaults and environment overrides.

use serde::{Deserialize, Serialize};

/// Default model used when none is configured.
pub const DEFAULT_MODEL: &str = "deepseek-r1:8b";

/// Default Ollama API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Connection settings for [`OllamaClient`](crate::OllamaClient).
///
/// Deserializable so it can be embedded in a larger config file; missing
/// fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// How long Ollama keeps the model loaded (e.g. "5m", "0", "-1").
    pub keep_alive: Option<String>,
    /// Whole-request timeout in seconds. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            keep_alive: None,
            timeout_secs: None,
        }
    }
}

impl OllamaConfig {
    /// Read overrides from the process environment.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `OLLAMA_HOST` | `base_url` (scheme optional) |
    /// | `PARLEY_MODEL` | `model` |
    /// | `PARLEY_KEEP_ALIVE` | `keep_alive` |
    /// | `PARLEY_TIMEOUT_SECS` | `timeout_secs` |
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) but reading through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(host) = lookup("OLLAMA_HOST").filter(|v| !v.trim().is_empty()) {
            config.base_url = normalize_base_url(&host);
        }
        if let Some(model) = lookup("PARLEY_MODEL").filter(|v| !v.trim().is_empty()) {
            config.model = model;
        }
        if let Some(keep_alive) = lookup("PARLEY_KEEP_ALIVE").filter(|v| !v.trim().is_empty()) {
            config.keep_alive = Some(keep_alive);
        }
        if let Some(raw) = lookup("PARLEY_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.timeout_secs = Some(secs),
                Err(e) => tracing::warn!(value = %raw, error = %e, "ignoring PARLEY_TIMEOUT_SECS"),
            }
        }
        config
    }
}

/// Add a scheme when missing and strip trailing slashes.
///
/// `OLLAMA_HOST` is commonly set to a bare `host:port`.
pub(crate) fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_point_at_local_server() {
        let config = OllamaConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn empty_environment_keeps_defaults() {
        assert_eq!(OllamaConfig::from_lookup(|_| None), OllamaConfig::default());
    }

    #[test]
    fn bare_host_gets_scheme() {
        let config = OllamaConfig::from_lookup(lookup_from(&[("OLLAMA_HOST", "10.0.0.5:11434")]));
        assert_eq!(config.base_url, "http://10.0.0.5:11434");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        assert_eq!(normalize_base_url("https://gpu-box:443/"), "https://gpu-box:443");
    }

    #[test]
    fn model_keep_alive_and_timeout_overrides() {
        let config = OllamaConfig::from_lookup(lookup_from(&[
            ("PARLEY_MODEL", "llama3.2"),
            ("PARLEY_KEEP_ALIVE", "5m"),
            ("PARLEY_TIMEOUT_SECS", "90"),
        ]));
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.keep_alive.as_deref(), Some("5m"));
        assert_eq!(config.timeout_secs, Some(90));
    }

    #[test]
    fn unparsable_timeout_is_ignored() {
        let config =
            OllamaConfig::from_lookup(lookup_from(&[("PARLEY_TIMEOUT_SECS", "soon")]));
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn partial_config_deserializes_with_defaults() {
        let config: OllamaConfig = serde_json::from_str(r#"{"model":"mistral"}"#).unwrap();
        assert_eq!(config.model, "mistral");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
