//! # Posters Core
//!
//! Core business logic for the Posters backend: the one-time-code
//! verification engine used by the email sign-in flow. This crate contains the
//! verification entry, the capability traits implemented by the infrastructure
//! layer, code generators, the channel registry and the verification service.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
