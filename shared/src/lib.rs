//! Shared utilities and common types for the Posters server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types and the layered configuration loader
//! - Credential utilities (masking for logs, format validation)
//! - The JSON response envelope used by the HTTP layer

pub mod config;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, ConfigError, Environment, LoggingConfig, ServerConfig,
    TransportConfig, VerificationConfig,
};
pub use types::ApiResponse;
pub use utils::{mask_credential, validation};
