//! Capability traits implemented by code generators, entry stores and dispatchers

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::{DispatchError, DomainResult, StoreError};

/// Produces the secret sent to the user
pub trait CodeGenerator: Send + Sync {
    /// Generate a numeric code of exactly `length` digits
    fn generate_code(&self, length: usize) -> DomainResult<String>;

    /// Name used in logs and errors
    fn strategy_name(&self) -> &'static str;
}

/// Key/value store with per-entry expiry
///
/// Each operation must be atomic for a single key; the service adds no
/// locking of its own.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Write `value` under `key`, replacing any previous entry and restarting its TTL
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Read the live value, `None` if never written or expired
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Remove the entry; returns whether a live entry was removed
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Remove the entry only while it still holds `expected`
    ///
    /// Check and removal happen as one step, so a value written in between
    /// (a resend) survives.
    async fn delete_if_equals(&self, key: &str, expected: &str) -> Result<bool, StoreError>;
}

/// Hands a code to an out-of-band delivery mechanism
///
/// `enqueue` only hands the task to a queue and must not wait on the
/// delivery provider. Retries and terminal failures belong to whatever
/// consumes the queue.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn enqueue(&self, destination: &str, code: &str) -> Result<(), DispatchError>;
}
