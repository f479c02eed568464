//! Domain-specific error types and error handling.

mod types;

pub use types::{DispatchError, StoreError};

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Verification channel ({channel}) is not supported")]
    UnsupportedChannel { channel: String },

    #[error("Code generation strategy ({strategy}) is not supported")]
    UnsupportedGenerator { strategy: String },

    #[error("Invalid code length: {length} (min: {min}, max: {max})")]
    InvalidCodeLength { length: usize, min: usize, max: usize },

    // Bridge to the entry store error type
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DomainError {
    /// Whether the error comes from how the service was set up rather than
    /// from a collaborator failing at runtime
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            DomainError::UnsupportedChannel { .. }
                | DomainError::UnsupportedGenerator { .. }
                | DomainError::InvalidCodeLength { .. }
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
