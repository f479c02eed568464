//! Delivery worker with bounded retries

use std::sync::Arc;
use std::time::Duration;

use posters_shared::config::VerificationConfig;
use posters_shared::mask_credential;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::{DeliveryTask, MessageTemplate, MessageTransport, RedisTaskSource};
use crate::InfrastructureError;

/// Pause after a failed claim before polling Redis again
const CLAIM_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// How often and how far apart delivery is attempted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    /// Fixed pause between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(30),
        }
    }
}

impl From<&VerificationConfig> for RetryPolicy {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            max_attempts: config.delivery_max_attempts,
            delay: config.delivery_retry_delay(),
        }
    }
}

/// Consumer half of the delivery queue
///
/// Each task is delivered on its own tokio task so a slow provider only
/// delays its own message.
#[derive(Clone)]
pub struct DeliveryWorker {
    transport: Arc<dyn MessageTransport>,
    template: Arc<MessageTemplate>,
    policy: RetryPolicy,
}

impl DeliveryWorker {
    pub fn new(
        transport: Arc<dyn MessageTransport>,
        template: MessageTemplate,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            template: Arc::new(template),
            policy,
        }
    }

    /// Process tasks until every sender is dropped, then wait for in-flight deliveries
    pub async fn run(self, mut receiver: mpsc::UnboundedReceiver<DeliveryTask>) {
        info!(
            channel = %self.template.channel(),
            provider = self.transport.provider_name(),
            max_attempts = self.policy.max_attempts,
            "Delivery worker started"
        );

        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                task = receiver.recv() => match task {
                    Some(task) => {
                        let worker = self.clone();
                        in_flight.spawn(async move {
                            // Failures are logged inside deliver
                            let _ = worker.deliver(&task).await;
                        });
                    }
                    None => break,
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Delivery task aborted");
                    }
                }
            }
        }

        while in_flight.join_next().await.is_some() {}

        info!(channel = %self.template.channel(), "Delivery worker stopped");
    }

    /// Claim tasks from Redis until `shutdown` closes, then abandon in-flight deliveries
    ///
    /// Each task is acknowledged once delivery finished, whatever the
    /// outcome. An abandoned task stays claimed and is requeued on the
    /// next start.
    pub async fn run_redis(self, mut source: RedisTaskSource, mut shutdown: watch::Receiver<()>) {
        info!(
            channel = %self.template.channel(),
            provider = self.transport.provider_name(),
            max_attempts = self.policy.max_attempts,
            "Redis delivery worker started"
        );

        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                claimed = source.claim() => match claimed {
                    Ok(Some(raw)) => match serde_json::from_str::<DeliveryTask>(&raw) {
                        Ok(task) => {
                            let worker = self.clone();
                            let source = source.clone();
                            in_flight.spawn(async move {
                                // Failures are logged inside deliver
                                let _ = worker.deliver(&task).await;
                                if let Err(e) = source.acknowledge(&raw).await {
                                    warn!(error = %e, "Failed to acknowledge delivery task");
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "Dropping undecodable delivery task");
                            if let Err(e) = source.acknowledge(&raw).await {
                                warn!(error = %e, "Failed to acknowledge delivery task");
                            }
                        }
                    },
                    Ok(None) => {}
                    Err(e) => {
                        error!(error = %e, "Failed to claim delivery task");
                        sleep(CLAIM_ERROR_BACKOFF).await;
                    }
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Delivery task aborted");
                    }
                }
            }
        }

        if !in_flight.is_empty() {
            warn!(
                channel = %self.template.channel(),
                abandoned = in_flight.len(),
                "Abandoning in-flight deliveries until the next start"
            );
        }
        in_flight.shutdown().await;

        info!(channel = %self.template.channel(), "Redis delivery worker stopped");
    }

    /// Deliver one task, retrying per the policy
    ///
    /// Returns the provider message id, or the last error once attempts are
    /// exhausted.
    pub async fn deliver(&self, task: &DeliveryTask) -> Result<String, InfrastructureError> {
        let (subject, body) = self.template.render(&task.code);
        let destination = mask_credential(&task.destination);
        let provider = self.transport.provider_name();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(destination = %destination, attempt, "Attempting delivery");

            match self
                .transport
                .send(&task.destination, &subject, &body)
                .await
            {
                Ok(message_id) => {
                    info!(
                        event = "delivery_sent",
                        destination = %destination,
                        provider,
                        attempt,
                        message_id = %message_id,
                        "Verification code delivered"
                    );
                    return Ok(message_id);
                }
                Err(e) if attempt < max_attempts => {
                    warn!(
                        event = "delivery_retry_scheduled",
                        destination = %destination,
                        provider,
                        attempt,
                        max_attempts,
                        retry_in_seconds = self.policy.delay.as_secs(),
                        error = %e,
                        "Delivery failed, retrying"
                    );
                    sleep(self.policy.delay).await;
                }
                Err(e) => {
                    error!(
                        event = "delivery_failed_permanently",
                        destination = %destination,
                        provider,
                        attempts = attempt,
                        error = %e,
                        "Giving up on verification code delivery"
                    );
                    return Err(e);
                }
            }
        }
    }
}
