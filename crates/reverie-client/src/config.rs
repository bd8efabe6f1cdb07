//! Client configuration loaded from environment variables.
//!
//! Everything except the API key has a default, so an embedding app can start
//! with `REVERIE_API_KEY` (or `OPENAI_API_KEY`) alone.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use reverie_ai::completion::{CompletionConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use reverie_ai::ContentMode;

/// Client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the OpenAI-compatible endpoint.
    /// Env: `REVERIE_API_BASE_URL`
    /// Default: `https://api.openai.com/v1`
    pub api_base_url: String,

    /// Bearer token.
    /// Env: `REVERIE_API_KEY`, falling back to `OPENAI_API_KEY`
    /// Default: none (requests go out unauthenticated).
    pub api_key: Option<String>,

    /// Env: `REVERIE_MODEL`
    /// Default: `gpt-4o-mini`
    pub model: String,

    /// Env: `REVERIE_TEMPERATURE` (0.0 - 2.0)
    /// Default: `0.7`
    pub interpretation_temperature: f32,

    /// Env: `REVERIE_CONTENT_TEMPERATURE` (0.0 - 2.0)
    /// Default: `0.8`
    pub content_temperature: f32,

    /// Upper bound for one network command.
    /// Env: `REVERIE_TIMEOUT_SECS`
    /// Default: 60 seconds
    pub request_timeout: Duration,

    /// Env: `REVERIE_DB_PATH`
    /// Default: none (platform data directory).
    pub database_path: Option<PathBuf>,

    /// Env: `REVERIE_CONTENT_MODE` (`strict` / `freeform`)
    /// Default: `strict`
    pub content_mode: ContentMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            interpretation_temperature: reverie_ai::interpret::DEFAULT_TEMPERATURE,
            content_temperature: reverie_ai::content::DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(60),
            database_path: None,
            content_mode: ContentMode::Strict,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("interpretation_temperature", &self.interpretation_temperature)
            .field("content_temperature", &self.content_temperature)
            .field("request_timeout", &self.request_timeout)
            .field("database_path", &self.database_path)
            .field("content_mode", &self.content_mode)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = var("REVERIE_API_BASE_URL") {
            config.api_base_url = url.trim().trim_end_matches('/').to_string();
        }

        config.api_key = var("REVERIE_API_KEY").or_else(|| var("OPENAI_API_KEY"));

        if let Some(model) = var("REVERIE_MODEL") {
            config.model = model.trim().to_string();
        }

        if let Some(value) = var("REVERIE_TEMPERATURE") {
            match parse_temperature(&value) {
                Some(t) => config.interpretation_temperature = t,
                None => tracing::warn!(%value, "Invalid REVERIE_TEMPERATURE, using default"),
            }
        }

        if let Some(value) = var("REVERIE_CONTENT_TEMPERATURE") {
            match parse_temperature(&value) {
                Some(t) => config.content_temperature = t,
                None => {
                    tracing::warn!(%value, "Invalid REVERIE_CONTENT_TEMPERATURE, using default")
                }
            }
        }

        if let Some(value) = var("REVERIE_TIMEOUT_SECS") {
            match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(%value, "Invalid REVERIE_TIMEOUT_SECS, using default"),
            }
        }

        if let Some(path) = var("REVERIE_DB_PATH") {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Some(value) = var("REVERIE_CONTENT_MODE") {
            match value.parse::<ContentMode>() {
                Ok(mode) => config.content_mode = mode,
                Err(e) => tracing::warn!(error = %e, "Invalid REVERIE_CONTENT_MODE, using default"),
            }
        }

        config
    }

    /// Endpoint settings for the completion transport.
    pub fn completion_config(&self) -> CompletionConfig {
        CompletionConfig {
            base_url: self.api_base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
        }
    }
}

fn parse_temperature(value: &str) -> Option<f32> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|t| (0.0..=2.0).contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> ClientConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = load(&[]);
        assert_eq!(config.api_base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.api_key, None);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.content_mode, ContentMode::Strict);
        assert_eq!(config.interpretation_temperature, 0.7);
        assert_eq!(config.content_temperature, 0.8);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("REVERIE_API_BASE_URL", "http://localhost:8080/v1/"),
            ("REVERIE_API_KEY", "sk-a"),
            ("OPENAI_API_KEY", "sk-b"),
            ("REVERIE_MODEL", "local-model"),
            ("REVERIE_TEMPERATURE", "0.2"),
            ("REVERIE_TIMEOUT_SECS", "5"),
            ("REVERIE_DB_PATH", "/tmp/dreams.db"),
            ("REVERIE_CONTENT_MODE", "freeform"),
        ]);
        assert_eq!(config.api_base_url, "http://localhost:8080/v1");
        assert_eq!(config.api_key.as_deref(), Some("sk-a"));
        assert_eq!(config.model, "local-model");
        assert_eq!(config.interpretation_temperature, 0.2);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/dreams.db")));
        assert_eq!(config.content_mode, ContentMode::Freeform);
    }

    #[test]
    fn test_openai_key_fallback() {
        let config = load(&[("REVERIE_API_KEY", "  "), ("OPENAI_API_KEY", "sk-b")]);
        assert_eq!(config.api_key.as_deref(), Some("sk-b"));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = load(&[
            ("REVERIE_TEMPERATURE", "hot"),
            ("REVERIE_CONTENT_TEMPERATURE", "3.5"),
            ("REVERIE_TIMEOUT_SECS", "0"),
            ("REVERIE_CONTENT_MODE", "poetry"),
        ]);
        assert_eq!(config.interpretation_temperature, 0.7);
        assert_eq!(config.content_temperature, 0.8);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.content_mode, ContentMode::Strict);
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = load(&[("REVERIE_API_KEY", "sk-secret")]);
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
