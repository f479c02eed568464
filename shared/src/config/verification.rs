//! Verification code policy configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ConfigError;
use crate::utils::validation::{MAX_CODE_LENGTH, MIN_CODE_LENGTH};

/// Longest accepted code lifetime, one day
pub const MAX_CODE_TTL_SECONDS: u64 = 86_400;

/// Code length, entry lifetime and delivery retry budget
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Number of digits in a generated code
    pub code_length: usize,

    /// Seconds a stored code stays verifiable
    pub code_ttl_seconds: u64,

    /// Delivery attempts before a message is given up on
    pub delivery_max_attempts: u32,

    /// Fixed pause between delivery attempts in seconds
    pub delivery_retry_delay_seconds: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            code_ttl_seconds: 240,
            delivery_max_attempts: 3,
            delivery_retry_delay_seconds: 30,
        }
    }
}

impl VerificationConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        fn var<T: std::str::FromStr>(name: &str, fallback: T) -> T {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(fallback)
        }

        let defaults = Self::default();
        Self {
            code_length: var("VERIFICATION_CODE_LENGTH", defaults.code_length),
            code_ttl_seconds: var("VERIFICATION_CODE_TTL_SECONDS", defaults.code_ttl_seconds),
            delivery_max_attempts: var(
                "VERIFICATION_DELIVERY_MAX_ATTEMPTS",
                defaults.delivery_max_attempts,
            ),
            delivery_retry_delay_seconds: var(
                "VERIFICATION_DELIVERY_RETRY_DELAY_SECONDS",
                defaults.delivery_retry_delay_seconds,
            ),
        }
    }

    /// Entry time-to-live
    pub fn code_ttl(&self) -> Duration {
        Duration::from_secs(self.code_ttl_seconds)
    }

    /// Pause between delivery attempts
    pub fn delivery_retry_delay(&self) -> Duration {
        Duration::from_secs(self.delivery_retry_delay_seconds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&self.code_length) {
            return Err(ConfigError::Invalid(format!(
                "verification.code_length must be between {} and {}, got {}",
                MIN_CODE_LENGTH, MAX_CODE_LENGTH, self.code_length
            )));
        }
        if !(1..=MAX_CODE_TTL_SECONDS).contains(&self.code_ttl_seconds) {
            return Err(ConfigError::Invalid(format!(
                "verification.code_ttl_seconds must be between 1 and {}, got {}",
                MAX_CODE_TTL_SECONDS, self.code_ttl_seconds
            )));
        }
        if self.delivery_max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "verification.delivery_max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
