//! Verification service module for one-time-code sign-in
//!
//! This module provides the complete code workflow:
//! - Code generation strategies
//! - Capability traits for the entry store and the notification dispatcher
//! - Channel registry mapping channel names to their collaborators
//! - The service that sends and verifies codes

mod channel;
mod config;
mod generator;
mod service;
mod traits;


pub use channel::{Channel, ChannelBackend, ChannelRegistry};
pub use config::VerificationServiceConfig;
pub use generator::{LateralCodeGenerator, NumericCodeGenerator};
pub use service::VerificationService;
pub use traits::{CodeGenerator, EntryStore, NotificationDispatcher};
