//! Client configuration

use std::time::Duration;

/// Default gateway address
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Environment variable naming the gateway address
pub const BASE_URL_VAR: &str = "MARKET_API_URL";

/// Client configuration for connecting to the marketplace gateway
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Gateway base URL (e.g., "http://localhost:3000")
    pub base_url: String,

    /// Period of request and listing feeds
    pub refresh_interval: Duration,

    /// How long a success notice stays visible
    pub notice_ttl: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            refresh_interval: Duration::from_secs(30),
            notice_ttl: Duration::from_secs(5),
        }
    }

    /// Read `MARKET_API_URL`, falling back to the local gateway
    pub fn from_env() -> Self {
        Self::new(std::env::var(BASE_URL_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()))
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
