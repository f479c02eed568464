//! Error types returned by the verification collaborators
//!
//! Implementations in the infrastructure layer map their backend errors into
//! these so the service can apply its failure policy without knowing which
//! backend is in use.

use thiserror::Error;

/// Entry store failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Entry store unavailable: {0}")]
    Unavailable(String),

    #[error("Stored value for {key} is not valid UTF-8")]
    Corrupt { key: String },
}

/// Notification dispatch failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Delivery queue is closed")]
    QueueClosed,

    #[error("Delivery rejected: {0}")]
    Rejected(String),
}
