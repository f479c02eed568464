//! Redis cache client implementation
//!
//! This module provides a Redis client with connection retry and per-command
//! retry for transient failures. It exposes the handful of operations the
//! verification entry store needs (set with expiry, get, delete, an atomic
//! compare-and-delete and TTL inspection), the list operations behind the
//! durable delivery queue, plus a PING health check.

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::cache::CacheConfig;
use crate::InfrastructureError;

/// Upper bound for the exponential backoff between attempts
const MAX_BACKOFF_MS: u64 = 5000;

/// Deletes KEYS[1] only while it holds ARGV[1]
const DELETE_IF_EQUALS_SCRIPT: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
"#;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Redis cache client with retry logic
///
/// Cloning is cheap: clones share the same multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    /// Used to open dedicated connections for blocking commands
    client: Client,
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
}

impl RedisClient {
    /// Connect to Redis, retrying the initial connection per `config.connect_retries`
    ///
    /// # Example
    /// ```no_run
    /// use posters_infra::cache::{CacheConfig, RedisClient};
    ///
    /// async fn create_client() -> Result<RedisClient, posters_infra::InfrastructureError> {
    ///     RedisClient::new(CacheConfig::new("redis://localhost:6379/2")).await
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!("Creating Redis client with URL: {}", mask_url(&config.url));

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::create_connection_with_retry(
            client.clone(),
            config.connect_retries,
            config.retry_delay_ms,
        )
        .await?;

        info!("Redis client created successfully");

        Ok(Self {
            client,
            connection,
            config,
        })
    }

    /// Configuration this client was created with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_BACKOFF_MS);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Set a value with expiration time, replacing any existing value and TTL
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        debug!("Setting key '{}' with expiry {}s", key, expiry_seconds);

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                let value = value.to_string();

                Box::pin(async move { conn.set_ex::<_, _, ()>(key, value, expiry_seconds).await })
            })
            .await;

        result.map_err(|e| {
            error!("Failed to set key '{}': {}", key, e);
            InfrastructureError::Cache(e)
        })
    }

    /// Get a value from cache
    ///
    /// Values are decoded as UTF-8; anything else is reported as
    /// [`InfrastructureError::InvalidValue`] rather than compared as bytes.
    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        debug!("Getting key '{}'", key);

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();

                Box::pin(async move { conn.get::<_, Option<Vec<u8>>>(key).await })
            })
            .await;

        match result {
            Ok(Some(bytes)) => String::from_utf8(bytes).map(Some).map_err(|_| {
                error!("Key '{}' holds a non UTF-8 value", key);
                InfrastructureError::InvalidValue {
                    key: key.to_string(),
                }
            }),
            Ok(None) => {
                debug!("Key '{}' not found", key);
                Ok(None)
            }
            Err(e) => {
                error!("Failed to get key '{}': {}", key, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Delete a key from cache
    ///
    /// # Returns
    /// * `Result<bool, InfrastructureError>` - True if key was deleted, false if not found
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        debug!("Deleting key '{}'", key);

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();

                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await;

        match result {
            Ok(deleted_count) => Ok(deleted_count > 0),
            Err(e) => {
                error!("Failed to delete key '{}': {}", key, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Delete a key only if it still holds `expected`
    ///
    /// Runs as a Lua script, so a write landing between the comparison and
    /// the delete cannot be lost.
    ///
    /// # Returns
    /// * `Result<bool, InfrastructureError>` - True if key held `expected` and was deleted
    pub async fn delete_if_equals(
        &self,
        key: &str,
        expected: &str,
    ) -> Result<bool, InfrastructureError> {
        debug!("Deleting key '{}' if unchanged", key);

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                let expected = expected.to_string();

                Box::pin(async move {
                    redis::Script::new(DELETE_IF_EQUALS_SCRIPT)
                        .key(key)
                        .arg(expected)
                        .invoke_async::<_, i64>(&mut conn)
                        .await
                })
            })
            .await;

        match result {
            Ok(deleted_count) => Ok(deleted_count > 0),
            Err(e) => {
                error!("Failed to compare-and-delete key '{}': {}", key, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Get time-to-live for a key
    ///
    /// # Returns
    /// * `Result<Option<i64>, InfrastructureError>` - TTL in seconds, None if key doesn't exist or has no expiry
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();

                Box::pin(async move { conn.ttl::<_, i64>(key).await })
            })
            .await;

        match result {
            Ok(ttl) if ttl >= 0 => Ok(Some(ttl)),
            Ok(_) => Ok(None),
            Err(e) => {
                error!("Failed to get TTL for key '{}': {}", key, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Push a value onto the head of a list
    pub async fn push(&self, key: &str, value: &str) -> Result<(), InfrastructureError> {
        debug!("Pushing onto list '{}'", key);

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                let value = value.to_string();

                Box::pin(async move { conn.lpush::<_, _, i64>(key, value).await })
            })
            .await;

        result.map(|_| ()).map_err(|e| {
            error!("Failed to push onto list '{}': {}", key, e);
            InfrastructureError::Cache(e)
        })
    }

    /// Remove one occurrence of `value` from a list
    ///
    /// # Returns
    /// * `Result<bool, InfrastructureError>` - True if an element was removed
    pub async fn remove_from_list(&self, key: &str, value: &str) -> Result<bool, InfrastructureError> {
        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                let value = value.to_string();

                Box::pin(async move { conn.lrem::<_, _, i64>(key, 1, value).await })
            })
            .await;

        match result {
            Ok(removed) => Ok(removed > 0),
            Err(e) => {
                error!("Failed to remove from list '{}': {}", key, e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Move every element from the tail of `source` to the tail of `destination`
    ///
    /// # Returns
    /// * `Result<usize, InfrastructureError>` - Number of elements moved
    pub async fn move_all(&self, source: &str, destination: &str) -> Result<usize, InfrastructureError> {
        let mut moved = 0;

        loop {
            let result = self
                .execute_with_retry(|mut conn| {
                    let source = source.to_string();
                    let destination = destination.to_string();

                    Box::pin(async move {
                        redis::cmd("LMOVE")
                            .arg(source)
                            .arg(destination)
                            .arg("RIGHT")
                            .arg("RIGHT")
                            .query_async::<_, Option<Vec<u8>>>(&mut conn)
                            .await
                    })
                })
                .await;

            match result {
                Ok(Some(_)) => moved += 1,
                Ok(None) => return Ok(moved),
                Err(e) => {
                    error!("Failed to move list '{}' onto '{}': {}", source, destination, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Open a connection of its own, for commands that block the server side
    ///
    /// Blocking commands on the shared multiplexed connection would stall
    /// every other caller.
    pub async fn dedicated_connection(&self) -> Result<MultiplexedConnection, InfrastructureError> {
        Self::create_connection_with_retry(
            self.client.clone(),
            self.config.connect_retries,
            self.config.retry_delay_ms,
        )
        .await
    }

    /// Wait up to `timeout` for the tail of `source` and move it to the head of `destination`
    ///
    /// Must be given a connection from [`RedisClient::dedicated_connection`].
    /// Not retried: the caller polls in a loop anyway.
    ///
    /// # Returns
    /// * `Result<Option<String>, InfrastructureError>` - The moved element, None on timeout
    pub async fn blocking_move(
        connection: &mut MultiplexedConnection,
        source: &str,
        destination: &str,
        timeout: Duration,
    ) -> Result<Option<String>, InfrastructureError> {
        let moved = redis::cmd("BLMOVE")
            .arg(source)
            .arg(destination)
            .arg("RIGHT")
            .arg("LEFT")
            .arg(timeout.as_secs_f64())
            .query_async::<_, Option<Vec<u8>>>(connection)
            .await?;

        match moved {
            Some(bytes) => String::from_utf8(bytes).map(Some).map_err(|_| {
                error!("List '{}' held a non UTF-8 element", source);
                InfrastructureError::InvalidValue {
                    key: source.to_string(),
                }
            }),
            None => Ok(None),
        }
    }

    /// Check if the Redis connection is healthy
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let result = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await;

        match result {
            Ok(response) if response == "PONG" => Ok(true),
            Ok(response) => {
                warn!("Redis health check returned unexpected response: {}", response);
                Ok(false)
            }
            Err(e) => {
                error!("Redis health check failed: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Execute a Redis operation, retrying transient failures with exponential backoff
    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let max_attempts = self.config.command_retries.max(1);
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            match operation(conn).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < max_attempts && is_retriable_error(&e) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_attempts, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_BACKOFF_MS);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Check if a Redis error is transient and the operation should be retried
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError | redis::ErrorKind::BusyLoadingError | redis::ErrorKind::TryAgain
    )
}

/// Hide the password part of a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
