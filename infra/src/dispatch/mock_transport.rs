//! Mock message transport
//!
//! Records messages instead of sending them. Used as the development provider
//! and by tests, which can make it fail a fixed number of times (or always) to
//! exercise the delivery worker's retries.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use posters_shared::mask_credential;
use tracing::{info, warn};
use uuid::Uuid;

use super::MessageTransport;
use crate::InfrastructureError;

/// A message the mock transport accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: String,
    pub destination: String,
    pub subject: String,
    pub body: String,
}

/// Mock transport for development and testing
///
/// Clones share their log and counters, so a test can keep one handle while
/// the delivery worker owns another.
#[derive(Clone, Default)]
pub struct MockTransport {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    attempts: Arc<AtomicU64>,
    /// Attempts still to fail; `u32::MAX` fails forever
    failures_left: Arc<AtomicU32>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `failures` attempts, then succeed
    pub fn failing_first(failures: u32) -> Self {
        let transport = Self::new();
        transport.failures_left.store(failures, Ordering::SeqCst);
        transport
    }

    /// Fail every attempt
    pub fn always_failing() -> Self {
        Self::failing_first(u32::MAX)
    }

    /// Messages accepted so far, oldest first
    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// Number of messages accepted
    pub fn message_count(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or_default()
    }

    /// Number of send attempts, failed ones included
    pub fn attempt_count(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> bool {
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                0 => None,
                u32::MAX => Some(u32::MAX),
                n => Some(n - 1),
            })
            .is_ok()
    }
}

#[async_trait]
impl MessageTransport for MockTransport {
    async fn send(
        &self,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, InfrastructureError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let masked = mask_credential(destination);

        if self.take_failure() {
            warn!(
                provider = "mock",
                destination = %masked,
                attempt,
                "Mock transport simulating failure"
            );
            return Err(InfrastructureError::Transport(
                "Simulated delivery failure".to_string(),
            ));
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        info!(
            target: "delivery",
            provider = "mock",
            destination = %masked,
            message_id = %message_id,
            "Mock message accepted"
        );

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentMessage {
                message_id: message_id.clone(),
                destination: destination.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        }

        Ok(message_id)
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
