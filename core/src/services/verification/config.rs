//! Configuration for the verification service

use std::time::Duration;

use posters_shared::config::VerificationConfig;

use crate::domain::entities::verification_entry::{DEFAULT_CODE_LENGTH, DEFAULT_ENTRY_TTL_SECONDS};

/// Configuration for the verification service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationServiceConfig {
    /// Number of digits in each generated code
    pub code_length: usize,
    /// How long a stored code stays verifiable
    pub entry_ttl: Duration,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            entry_ttl: Duration::from_secs(DEFAULT_ENTRY_TTL_SECONDS),
        }
    }
}

impl From<&VerificationConfig> for VerificationServiceConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            code_length: config.code_length,
            entry_ttl: config.code_ttl(),
        }
    }
}
