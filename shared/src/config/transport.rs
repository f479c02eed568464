//! Message delivery transport configuration

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Which provider delivers messages for a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportProvider {
    /// Log messages instead of sending them
    #[default]
    Mock,
    /// JSON-over-HTTP provider API
    Http,
}

impl std::str::FromStr for TransportProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(TransportProvider::Mock),
            "http" => Ok(TransportProvider::Http),
            other => Err(format!("Unknown transport provider: {}", other)),
        }
    }
}

/// Transport settings for one delivery channel
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Provider implementation
    pub provider: TransportProvider,

    /// Provider API endpoint (required for `http`)
    pub endpoint: Option<String>,

    /// Bearer token sent to the provider
    pub api_key: Option<String>,

    /// Sender address or number
    pub from_address: String,

    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            provider: TransportProvider::Mock,
            endpoint: None,
            api_key: None,
            from_address: String::from("no-reply@posters.local"),
            request_timeout_seconds: 30,
        }
    }
}

impl TransportConfig {
    /// Create from `<PREFIX>_PROVIDER`, `<PREFIX>_ENDPOINT`, `<PREFIX>_API_KEY`,
    /// `<PREFIX>_FROM` and `<PREFIX>_TIMEOUT_SECONDS`
    pub fn from_env(prefix: &str) -> Self {
        let var = |suffix: &str| std::env::var(format!("{}_{}", prefix, suffix)).ok();
        let defaults = Self::default();

        Self {
            provider: var("PROVIDER")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.provider),
            endpoint: var("ENDPOINT"),
            api_key: var("API_KEY"),
            from_address: var("FROM").unwrap_or(defaults.from_address),
            request_timeout_seconds: var("TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_seconds),
        }
    }

    pub fn validate(&self, channel: &str) -> Result<(), ConfigError> {
        if self.provider == TransportProvider::Http && self.endpoint.is_none() {
            return Err(ConfigError::Invalid(format!(
                "{}.endpoint is required for the http provider",
                channel
            )));
        }
        Ok(())
    }
}
