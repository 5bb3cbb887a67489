//! Configuration types.

use std::time::Duration;

use reqwest::Url;
use secrecy::SecretString;

use crate::error::ConfigError;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_WINDOW_MINUTES: u32 = 2;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MESSAGE_KIND: &str = "imageMessage";

/// Watcher configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Message listing endpoint.
    pub endpoint: Url,
    /// Optional bearer token for the endpoint.
    pub api_token: Option<SecretString>,
    /// Delay between the end of one cycle and the start of the next.
    pub poll_interval: Duration,
    /// Trailing window of history considered recent, in minutes.
    pub window_minutes: u32,
    /// Only messages from this conversation are kept.
    pub conversation_id: String,
    /// Only messages of this kind are kept (e.g. `imageMessage`).
    pub message_kind: String,
    /// Upper bound on a single fetch.
    pub fetch_timeout: Duration,
}

impl WatchConfig {
    /// Build config from `CHATWATCH_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_endpoint = required(&lookup, "CHATWATCH_ENDPOINT")?;
        let endpoint = Url::parse(&raw_endpoint).map_err(|e| ConfigError::InvalidValue {
            key: "CHATWATCH_ENDPOINT".to_string(),
            message: e.to_string(),
        })?;

        let api_token = lookup("CHATWATCH_API_TOKEN")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(SecretString::from);

        let poll_interval = Duration::from_secs(parse_or(
            &lookup,
            "CHATWATCH_POLL_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL_SECS,
        )?);
        let window_minutes = parse_or(&lookup, "CHATWATCH_WINDOW_MINUTES", DEFAULT_WINDOW_MINUTES)?;
        let fetch_timeout = Duration::from_secs(parse_or(
            &lookup,
            "CHATWATCH_FETCH_TIMEOUT_SECS",
            DEFAULT_FETCH_TIMEOUT_SECS,
        )?);

        let conversation_id = required(&lookup, "CHATWATCH_CONVERSATION_ID")?;
        let message_kind = lookup("CHATWATCH_MESSAGE_KIND")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_MESSAGE_KIND.to_string());

        let config = Self {
            endpoint,
            api_token,
            poll_interval,
            window_minutes,
            conversation_id,
            message_kind,
            fetch_timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that the types alone don't enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.endpoint.scheme(), "http" | "https") {
            return Err(invalid(
                "CHATWATCH_ENDPOINT",
                format!("unsupported scheme '{}'", self.endpoint.scheme()),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(invalid("CHATWATCH_POLL_INTERVAL_SECS", "must be greater than 0"));
        }
        if self.window_minutes == 0 {
            return Err(invalid("CHATWATCH_WINDOW_MINUTES", "must be greater than 0"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(invalid("CHATWATCH_FETCH_TIMEOUT_SECS", "must be greater than 0"));
        }
        if self.conversation_id.is_empty() {
            return Err(invalid("CHATWATCH_CONVERSATION_ID", "must not be empty"));
        }
        if self.message_kind.is_empty() {
            return Err(invalid("CHATWATCH_MESSAGE_KIND", "must not be empty"));
        }
        Ok(())
    }

    /// Window size in seconds.
    pub fn window_secs(&self) -> i64 {
        i64::from(self.window_minutes) * 60
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| invalid(key, e.to_string())),
        None => Ok(default),
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("CHATWATCH_ENDPOINT", "https://api.example.com/lastOutgoingMessages"),
            ("CHATWATCH_CONVERSATION_ID", "15550001111@c.us"),
        ]
    }

    #[test]
    fn defaults_applied() {
        let config = WatchConfig::from_lookup(lookup_from(&minimal())).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.window_minutes, 2);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.message_kind, "imageMessage");
        assert!(config.api_token.is_none());
        assert_eq!(config.window_secs(), 120);
    }

    #[test]
    fn overrides_parsed() {
        let mut pairs = minimal();
        pairs.extend([
            ("CHATWATCH_POLL_INTERVAL_SECS", "30"),
            ("CHATWATCH_WINDOW_MINUTES", " 15 "),
            ("CHATWATCH_MESSAGE_KIND", "textMessage"),
            ("CHATWATCH_FETCH_TIMEOUT_SECS", "3"),
            ("CHATWATCH_API_TOKEN", "secret-token"),
        ]);
        let config = WatchConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.window_minutes, 15);
        assert_eq!(config.message_kind, "textMessage");
        assert_eq!(config.fetch_timeout, Duration::from_secs(3));
        assert_eq!(
            config.api_token.as_ref().map(|t| t.expose_secret().to_string()),
            Some("secret-token".to_string())
        );
    }

    #[test]
    fn missing_endpoint() {
        let err = WatchConfig::from_lookup(lookup_from(&[(
            "CHATWATCH_CONVERSATION_ID",
            "15550001111@c.us",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "CHATWATCH_ENDPOINT"));
    }

    #[test]
    fn blank_conversation_is_missing() {
        let err = WatchConfig::from_lookup(lookup_from(&[
            ("CHATWATCH_ENDPOINT", "https://api.example.com/"),
            ("CHATWATCH_CONVERSATION_ID", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn zero_window_rejected() {
        let mut pairs = minimal();
        pairs.push(("CHATWATCH_WINDOW_MINUTES", "0"));
        let err = WatchConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "CHATWATCH_WINDOW_MINUTES")
        );
    }

    #[test]
    fn zero_interval_rejected() {
        let mut pairs = minimal();
        pairs.push(("CHATWATCH_POLL_INTERVAL_SECS", "0"));
        assert!(WatchConfig::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn garbage_number_is_an_error_not_a_default() {
        let mut pairs = minimal();
        pairs.push(("CHATWATCH_POLL_INTERVAL_SECS", "five"));
        let err = WatchConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "CHATWATCH_POLL_INTERVAL_SECS")
        );
    }

    #[test]
    fn non_http_endpoint_rejected() {
        let err = WatchConfig::from_lookup(lookup_from(&[
            ("CHATWATCH_ENDPOINT", "ftp://files.example.com/"),
            ("CHATWATCH_CONVERSATION_ID", "c1"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn relative_endpoint_rejected() {
        let err = WatchConfig::from_lookup(lookup_from(&[
            ("CHATWATCH_ENDPOINT", "/messages"),
            ("CHATWATCH_CONVERSATION_ID", "c1"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
