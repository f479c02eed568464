//! Redis-backed entry store
//!
//! Entries live under `verification:{channel}:{credential}` (behind the
//! optional global prefix from [`CacheConfig`](super::CacheConfig)) and rely
//! on Redis' native expiry, so an expired entry simply reads as absent.

use std::time::Duration;

use async_trait::async_trait;
use posters_core::errors::StoreError;
use posters_core::services::verification::{Channel, EntryStore};
use posters_shared::mask_credential;
use tracing::debug;

use super::RedisClient;

/// Entry store for one channel on top of a shared [`RedisClient`]
#[derive(Clone)]
pub struct RedisEntryStore {
    client: RedisClient,
    namespace: String,
}

impl RedisEntryStore {
    pub fn new(client: RedisClient, channel: Channel) -> Self {
        let namespace = client
            .config()
            .make_key(&format!("verification:{}", channel));
        Self { client, namespace }
    }

    /// Full Redis key for a credential
    pub fn format_key(&self, credential: &str) -> String {
        format!("{}:{}", self.namespace, credential)
    }

    /// Seconds left on a credential's entry, `None` when absent
    pub async fn remaining_ttl(&self, credential: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.client.ttl(&self.format_key(credential)).await?)
    }
}

#[async_trait]
impl EntryStore for RedisEntryStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        // SET EX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        debug!(
            credential = %mask_credential(key),
            ttl_seconds = seconds,
            "Storing verification entry in Redis"
        );
        self.client
            .set_with_expiry(&self.format_key(key), value, seconds)
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.client.get(&self.format_key(key)).await?)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.client.delete(&self.format_key(key)).await?)
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        Ok(self
            .client
            .delete_if_equals(&self.format_key(key), expected)
            .await?)
    }
}
