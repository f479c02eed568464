//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Redis connection and key layout for verification entries
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server binding
//! - `transport` - Message delivery providers (email, SMS)
//! - `verification` - Code length, entry TTL and delivery retry budget

pub mod cache;
pub mod environment;
pub mod server;
pub mod transport;
pub mod verification;

use serde::{Deserialize, Serialize};

pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::ServerConfig;
pub use transport::{TransportConfig, TransportProvider};
pub use verification::VerificationConfig;

/// Prefix for environment variables read by [`AppConfig::load`]
pub const ENV_PREFIX: &str = "POSTERS";

/// Errors raised while assembling the application configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Redis cache configuration
    pub cache: CacheConfig,

    /// Verification code policy
    pub verification: VerificationConfig,

    /// Email delivery transport
    pub email: TransportConfig,

    /// SMS delivery transport; the channel stays unregistered when absent
    pub sms: Option<TransportConfig>,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            verification: VerificationConfig::default(),
            email: TransportConfig::default(),
            sms: None,
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from layered sources
    ///
    /// Sources, lowest priority first:
    /// 1. Built-in defaults
    /// 2. `config.<environment>.toml` in the working directory (optional)
    /// 3. `POSTERS__*` environment variables, `__` separating nested keys
    ///    (e.g. `POSTERS__CACHE__URL`)
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = Environment::from_env();
        let settings = config::Config::builder()
            .set_default("environment", environment.to_string())?
            .add_source(config::File::with_name(environment.config_file()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from flat environment variables only
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let environment = Environment::from_env();
        Self {
            environment,
            server: ServerConfig::from_env(),
            cache: CacheConfig::from_env(),
            verification: VerificationConfig::from_env(),
            email: TransportConfig::from_env("EMAIL"),
            sms: std::env::var("SMS_PROVIDER")
                .ok()
                .map(|_| TransportConfig::from_env("SMS")),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.verification.validate()?;
        self.email.validate("email")?;
        if let Some(sms) = &self.sms {
            sms.validate("sms")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.sms.is_none());
        assert_eq!(config.verification.code_ttl_seconds, 240);
    }

    #[test]
    fn test_invalid_code_length_rejected() {
        let mut config = AppConfig::default();
        config.verification.code_length = 2;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_code_ttl_bounds() {
        let mut config = AppConfig::default();

        config.verification.code_ttl_seconds = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.verification.code_ttl_seconds = u64::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.verification.code_ttl_seconds = 86_400;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_document() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                environment = "production"

                [verification]
                code_ttl_seconds = 120

                [email]
                provider = "http"
                endpoint = "https://mail.example.com/v1/messages"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let config: AppConfig = settings.try_deserialize().unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.verification.code_ttl_seconds, 120);
        assert_eq!(config.verification.code_length, 6);
        assert_eq!(config.email.provider, TransportProvider::Http);
        assert!(config.validate().is_ok());
    }
}
