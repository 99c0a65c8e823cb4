//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Answer endpoint used when `NUTRI_CHAT_ENDPOINT` is not set.
pub const DEFAULT_ENDPOINT: &str = "https://longevity-backend-07su.onrender.com/ask";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// URL the requests are POSTed to.
    pub endpoint: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Pause between an answer and the next question.
    pub question_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(60),
            question_delay: Duration::from_millis(500),
        }
    }
}

impl ClientConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let endpoint = match lookup("NUTRI_CHAT_ENDPOINT") {
            Some(raw) => validate_endpoint(raw.trim())?,
            None => defaults.endpoint,
        };

        let request_timeout = match lookup("NUTRI_CHAT_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number("NUTRI_CHAT_TIMEOUT_SECS", &raw)?),
            None => defaults.request_timeout,
        };

        let question_delay = match lookup("NUTRI_CHAT_QUESTION_DELAY_MS") {
            Some(raw) => {
                Duration::from_millis(parse_number("NUTRI_CHAT_QUESTION_DELAY_MS", &raw)?)
            }
            None => defaults.question_delay,
        };

        Ok(Self {
            endpoint,
            request_timeout,
            question_delay,
        })
    }
}

fn validate_endpoint(raw: &str) -> Result<String, ConfigError> {
    let url = reqwest::Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        key: "NUTRI_CHAT_ENDPOINT".to_string(),
        message: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            key: "NUTRI_CHAT_ENDPOINT".to_string(),
            message: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(raw.to_string())
}

fn parse_number(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("expected a non-negative integer, got {raw:?}"),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.question_delay, Duration::from_millis(500));
    }

    #[test]
    fn overrides_from_lookup() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("NUTRI_CHAT_ENDPOINT", "http://127.0.0.1:9000/ask"),
            ("NUTRI_CHAT_TIMEOUT_SECS", "5"),
            ("NUTRI_CHAT_QUESTION_DELAY_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:9000/ask");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.question_delay, Duration::ZERO);
    }

    #[test]
    fn rejects_bad_values() {
        let err = ClientConfig::from_lookup(lookup(&[("NUTRI_CHAT_ENDPOINT", "ftp://x/ask")]))
            .unwrap_err();
        assert!(err.to_string().contains("NUTRI_CHAT_ENDPOINT"));

        assert!(ClientConfig::from_lookup(lookup(&[("NUTRI_CHAT_ENDPOINT", "not a url")])).is_err());
        assert!(
            ClientConfig::from_lookup(lookup(&[("NUTRI_CHAT_TIMEOUT_SECS", "soon")])).is_err()
        );
    }
}
