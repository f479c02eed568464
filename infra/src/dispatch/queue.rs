//! In-process delivery queue
//!
//! Tasks live only in memory and are lost with the process; see
//! [`RedisDeliveryQueue`](super::RedisDeliveryQueue) for the durable one.

use std::sync::Arc;

use async_trait::async_trait;
use posters_core::errors::DispatchError;
use posters_core::services::verification::NotificationDispatcher;
use tokio::sync::mpsc;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use super::{DeliveryWorker, MessageTemplate, MessageTransport, RetryPolicy};

/// One code waiting to be delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryTask {
    pub destination: String,
    pub code: String,
}

/// Producer half of the delivery queue
///
/// Enqueueing never waits. Once every clone is dropped the worker drains
/// what is left and exits.
#[derive(Debug, Clone)]
pub struct DeliveryQueue {
    sender: mpsc::UnboundedSender<DeliveryTask>,
}

impl DeliveryQueue {
    /// Wrap an existing channel; the caller owns the receiving side
    pub fn new(sender: mpsc::UnboundedSender<DeliveryTask>) -> Self {
        Self { sender }
    }

    /// Spawn a [`DeliveryWorker`] and return the queue feeding it
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        transport: Arc<dyn MessageTransport>,
        template: MessageTemplate,
        policy: RetryPolicy,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = DeliveryWorker::new(transport, template, policy);
        let handle = tokio::spawn(worker.run(receiver));

        (Self::new(sender), handle)
    }

    /// Whether the worker has gone away
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[async_trait]
impl NotificationDispatcher for DeliveryQueue {
    async fn enqueue(&self, destination: &str, code: &str) -> Result<(), DispatchError> {
        self.sender
            .send(DeliveryTask {
                destination: destination.to_string(),
                code: code.to_string(),
            })
            .map_err(|_| DispatchError::QueueClosed)
    }
}
