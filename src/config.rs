//! Configuration for the stream consumer and the provider client.

use crate::error::ConfigError;
use crate::stream::DEFAULT_READ_CHUNK;
use std::time::Duration;

/// Default model when `OPENAI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default user-visible notice for a failed reply.
pub const DEFAULT_ERROR_NOTICE: &str =
    "Something went wrong while streaming the reply. Please try again.";

/// When a transport failure replaces the reply with the error notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoticePolicy {
    /// Always replace the content.
    #[default]
    Always,
    /// Only replace when no delta was received.
    WhenEmpty,
}

/// Configuration for the stream consumer.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Bytes per read for reader-backed transports.
    pub read_chunk_size: usize,
    /// Capacity of the snapshot channel.
    pub snapshot_capacity: usize,
    /// Notice shown when the transport fails.
    pub error_notice: String,
    /// When the notice replaces the content.
    pub notice_policy: NoticePolicy,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK,
            snapshot_capacity: 64,
            error_notice: DEFAULT_ERROR_NOTICE.to_string(),
            notice_policy: NoticePolicy::Always,
        }
    }
}

/// Connection settings for an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Bearer token.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// API root, without the trailing `/chat/completions`.
    pub base_url: String,
    /// Whole-request timeout. `None` leaves streaming unbounded.
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderConfig {
    /// Config with the given key and default model and endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    /// Read `OPENAI_API_KEY`, `OPENAI_MODEL` and `OPENAI_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Some(model) = lookup("OPENAI_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model;
        }
        if let Some(base_url) = lookup("OPENAI_BASE_URL").filter(|u| !u.trim().is_empty()) {
            config.base_url = base_url;
        }
        config.validate()?;
        Ok(config)
    }

    /// Set the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set a whole-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Check the values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "model",
                message: "must not be empty".to_string(),
            });
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "base_url",
                message: format!("expected an http(s) URL, got '{}'", self.base_url),
            });
        }
        Ok(())
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_consumer_config_default() {
        let config = ConsumerConfig::default();
        assert_eq!(config.read_chunk_size, DEFAULT_READ_CHUNK);
        assert_eq!(config.notice_policy, NoticePolicy::Always);
        assert_eq!(config.error_notice, DEFAULT_ERROR_NOTICE);
    }

    #[test]
    fn test_provider_from_lookup_defaults() {
        let config = ProviderConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.completions_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_provider_from_lookup_overrides() {
        let config = ProviderConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1/"),
        ]))
        .unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.completions_url(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_provider_missing_key() {
        assert_eq!(
            ProviderConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::MissingApiKey
        );
        assert_eq!(
            ProviderConfig::from_lookup(lookup(&[("OPENAI_API_KEY", " ")])).unwrap_err(),
            ConfigError::MissingApiKey
        );
    }

    #[test]
    fn test_provider_rejects_bad_url() {
        let err = ProviderConfig::new("sk").with_base_url("ftp://x").validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "base_url", .. }));
    }

    #[test]
    fn test_provider_debug_redacts_key() {
        let rendered = format!("{:?}", ProviderConfig::new("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
    }
}
