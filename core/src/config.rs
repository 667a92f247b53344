//! Client configuration.
//!
//! No request timeout is set by default: a hung server holds a fetch (and
//! the cache key waiting on it) until the transport gives up on its own.
//! Set `timeout` to bound it.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "TABAS_API_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix every request path is appended to, e.g. `http://host:5000/api`.
    pub base_url: String,
    pub timeout: Option<Duration>,
    /// How often a subscribed health probe refetches.
    pub health_poll_interval: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Defaults, with the base URL taken from `TABAS_API_URL` when set.
    pub fn from_env() -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_health_poll_interval(mut self, interval: Duration) -> Self {
        self.health_poll_interval = interval;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            health_poll_interval: DEFAULT_HEALTH_POLL_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000/api");
        assert_eq!(config.timeout, None);
        assert_eq!(config.health_poll_interval, Duration::from_secs(30));
    }

    #[test]
    fn builders_override_fields() {
        let config = ClientConfig::new("http://api.test/api")
            .with_timeout(Duration::from_secs(5))
            .with_health_poll_interval(Duration::from_secs(1));
        assert_eq!(config.base_url, "http://api.test/api");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.health_poll_interval, Duration::from_secs(1));
    }
}
