//! Redis-backed delivery queue
//!
//! Tasks are stored as JSON in a per-channel Redis list. The worker moves
//! each task onto a processing list while delivering it and removes it once
//! delivery has finished, successfully or not. Anything still on the
//! processing list when a worker starts was claimed by a worker that died,
//! and goes back on the pending list. Delivery is therefore at least once.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use posters_core::errors::DispatchError;
use posters_core::services::verification::{Channel, NotificationDispatcher};
use posters_shared::config::CacheConfig;
use redis::aio::MultiplexedConnection;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use super::{DeliveryTask, DeliveryWorker, MessageTemplate, MessageTransport, RetryPolicy};
use crate::cache::RedisClient;
use crate::InfrastructureError;

/// How long one claim blocks before the worker checks for shutdown again
const CLAIM_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis keys of one channel's queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueKeys {
    pub pending: String,
    pub processing: String,
}

impl QueueKeys {
    pub fn new(config: &CacheConfig, channel: Channel) -> Self {
        Self {
            pending: config.make_key(&format!("delivery:{}:pending", channel)),
            processing: config.make_key(&format!("delivery:{}:processing", channel)),
        }
    }
}

/// Worker side of a Redis queue
///
/// Claims go through a dedicated connection; acknowledgements use the
/// client's shared one.
#[derive(Clone)]
pub struct RedisTaskSource {
    client: RedisClient,
    keys: QueueKeys,
    connection: MultiplexedConnection,
}

impl RedisTaskSource {
    /// Wait for the next pending task and mark it as processing
    pub async fn claim(&mut self) -> Result<Option<String>, InfrastructureError> {
        RedisClient::blocking_move(
            &mut self.connection,
            &self.keys.pending,
            &self.keys.processing,
            CLAIM_TIMEOUT,
        )
        .await
    }

    /// Drop a finished task from the processing list
    pub async fn acknowledge(&self, raw: &str) -> Result<(), InfrastructureError> {
        if !self.client.remove_from_list(&self.keys.processing, raw).await? {
            warn!("Acknowledged delivery task was no longer processing");
        }
        Ok(())
    }
}

/// Producer half of the Redis delivery queue
///
/// Once every clone is dropped the worker stops claiming. Deliveries still
/// in flight are abandoned and stay on the processing list for the next
/// start.
#[derive(Clone)]
pub struct RedisDeliveryQueue {
    client: RedisClient,
    keys: QueueKeys,
    _shutdown: Arc<watch::Sender<()>>,
}

impl RedisDeliveryQueue {
    /// Requeue abandoned tasks, spawn a [`DeliveryWorker`] and return the queue feeding it
    ///
    /// Must be called from within a tokio runtime. Needs Redis 6.2 or newer.
    pub async fn start(
        client: RedisClient,
        transport: Arc<dyn MessageTransport>,
        template: MessageTemplate,
        policy: RetryPolicy,
    ) -> Result<(Self, JoinHandle<()>), InfrastructureError> {
        let channel = template.channel();
        let keys = QueueKeys::new(client.config(), channel);

        let recovered = client.move_all(&keys.processing, &keys.pending).await?;
        if recovered > 0 {
            warn!(
                event = "delivery_tasks_recovered",
                channel = %channel,
                count = recovered,
                "Requeued delivery tasks abandoned by a previous worker"
            );
        }

        let source = RedisTaskSource {
            client: client.clone(),
            keys: keys.clone(),
            connection: client.dedicated_connection().await?,
        };
        let (shutdown, shutdown_signal) = watch::channel(());
        let worker = DeliveryWorker::new(transport, template, policy);
        let handle = tokio::spawn(worker.run_redis(source, shutdown_signal));

        let queue = Self {
            client,
            keys,
            _shutdown: Arc::new(shutdown),
        };
        Ok((queue, handle))
    }

    pub fn keys(&self) -> &QueueKeys {
        &self.keys
    }
}

#[async_trait]
impl NotificationDispatcher for RedisDeliveryQueue {
    async fn enqueue(&self, destination: &str, code: &str) -> Result<(), DispatchError> {
        let task = DeliveryTask {
            destination: destination.to_string(),
            code: code.to_string(),
        };
        let payload =
            serde_json::to_string(&task).map_err(|e| DispatchError::Rejected(e.to_string()))?;

        self.client.push(&self.keys.pending, &payload).await?;
        Ok(())
    }
}
