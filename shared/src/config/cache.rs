//! Cache configuration module

use serde::{Deserialize, Serialize};

/// Redis cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Redis connection URL (may carry the database number, e.g. `redis://localhost:6379/2`)
    pub url: String,

    /// Optional prefix prepended to every key
    pub key_prefix: Option<String>,

    /// Attempts made when opening the connection
    pub connect_retries: u32,

    /// Base delay between connection attempts in milliseconds (doubles per attempt)
    pub retry_delay_ms: u64,

    /// Attempts made for each individual command
    pub command_retries: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379/2"),
            key_prefix: None,
            connect_retries: 3,
            retry_delay_ms: 100,
            command_retries: 2,
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let url = std::env::var("REDIS_URL").unwrap_or(defaults.url);
        let key_prefix = std::env::var("REDIS_KEY_PREFIX").ok();
        let connect_retries = std::env::var("REDIS_CONNECT_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.connect_retries);

        Self {
            url,
            key_prefix,
            connect_retries,
            ..defaults
        }
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for all cache keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}
