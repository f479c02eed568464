//! End-to-end verification flow: service, in-memory store, delivery queue and
//! mock transport wired the way `initialize` wires the Redis-backed ones.

use std::sync::Arc;
use std::time::Duration;

use posters_core::errors::DomainError;
use posters_core::services::verification::{
    Channel, ChannelBackend, ChannelRegistry, EntryStore, NumericCodeGenerator,
    VerificationService, VerificationServiceConfig,
};
use posters_infra::cache::MemoryEntryStore;
use posters_infra::dispatch::{DeliveryQueue, MessageTemplate, MockTransport, RetryPolicy};
use tokio::task::JoinHandle;

const CREDENTIAL: &str = "user@example.com";

struct Harness {
    service: VerificationService,
    store: MemoryEntryStore,
    transport: MockTransport,
    worker: JoinHandle<()>,
}

impl Harness {
    fn new(transport: MockTransport) -> Self {
        let store = MemoryEntryStore::new();
        let (queue, worker) = DeliveryQueue::start(
            Arc::new(transport.clone()),
            MessageTemplate::for_channel(Channel::Email, 4),
            RetryPolicy::default(),
        );

        let registry = ChannelRegistry::new().with_channel(
            Channel::Email,
            ChannelBackend::new(
                Arc::new(NumericCodeGenerator),
                Arc::new(store.clone()),
                Arc::new(queue),
            ),
        );

        Self {
            service: VerificationService::new(registry, VerificationServiceConfig::default()),
            store,
            transport,
            worker,
        }
    }

    async fn pending_code(&self) -> String {
        self.store
            .get(CREDENTIAL)
            .await
            .unwrap()
            .expect("a pending code")
    }

    /// Drop the service (and with it the queue) and wait for the worker to drain
    async fn shutdown(self) -> MockTransport {
        drop(self.service);
        self.worker.await.unwrap();
        self.transport
    }
}

#[tokio::test]
async fn test_send_then_verify_succeeds_once() {
    let harness = Harness::new(MockTransport::new());

    harness.service.send("email", CREDENTIAL).await.unwrap();
    let code = harness.pending_code().await;

    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    assert!(harness.service.verify("email", CREDENTIAL, &code).await.unwrap());
    assert!(!harness.service.verify("email", CREDENTIAL, &code).await.unwrap());
    assert!(harness.store.is_empty().await);
}

#[tokio::test]
async fn test_code_is_delivered_to_credential() {
    let harness = Harness::new(MockTransport::new());

    harness.service.send("email", CREDENTIAL).await.unwrap();
    let code = harness.pending_code().await;

    let transport = harness.shutdown().await;
    let sent = transport.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].destination, CREDENTIAL);
    assert_eq!(sent[0].subject, "Posters Login Code.");
    assert!(sent[0].body.contains(&code));
}

#[tokio::test]
async fn test_verify_without_send() {
    let harness = Harness::new(MockTransport::new());

    assert!(!harness
        .service
        .verify("email", CREDENTIAL, "123456")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_wrong_code_keeps_entry() {
    let harness = Harness::new(MockTransport::new());

    harness.service.send("email", CREDENTIAL).await.unwrap();
    let code = harness.pending_code().await;
    let wrong = if code == "000000" { "000001" } else { "000000" };

    assert!(!harness.service.verify("email", CREDENTIAL, wrong).await.unwrap());
    assert!(harness.service.has_pending_code("email", CREDENTIAL).await.unwrap());
    assert!(harness.service.verify("email", CREDENTIAL, &code).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_code_expires_after_ttl() {
    let harness = Harness::new(MockTransport::new());

    harness.service.send("email", CREDENTIAL).await.unwrap();
    let code = harness.pending_code().await;

    tokio::time::advance(Duration::from_secs(240)).await;

    assert!(!harness.service.verify("email", CREDENTIAL, &code).await.unwrap());
}

#[tokio::test]
async fn test_resend_replaces_pending_code() {
    let harness = Harness::new(MockTransport::new());

    harness.service.send("email", CREDENTIAL).await.unwrap();
    let first = harness.pending_code().await;
    harness.service.send("email", CREDENTIAL).await.unwrap();
    let second = harness.pending_code().await;

    if first != second {
        assert!(!harness.service.verify("email", CREDENTIAL, &first).await.unwrap());
    }
    assert!(harness.service.verify("email", CREDENTIAL, &second).await.unwrap());
    assert_eq!(harness.shutdown().await.message_count(), 2);
}

#[tokio::test]
async fn test_unknown_channel_has_no_side_effects() {
    let harness = Harness::new(MockTransport::new());

    let result = harness.service.send("carrier_pigeon", CREDENTIAL).await;
    assert!(matches!(result, Err(DomainError::UnsupportedChannel { .. })));

    // Registered in the enum but not wired here
    let result = harness.service.send("sms", "+15551234567").await;
    assert!(matches!(result, Err(DomainError::UnsupportedChannel { .. })));

    assert!(harness.store.is_empty().await);
    assert_eq!(harness.shutdown().await.attempt_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_delivery_failure_does_not_affect_verification() {
    let harness = Harness::new(MockTransport::always_failing());

    harness.service.send("email", CREDENTIAL).await.unwrap();
    let code = harness.pending_code().await;

    assert!(harness.service.verify("email", CREDENTIAL, &code).await.unwrap());

    let transport = harness.shutdown().await;
    assert_eq!(transport.attempt_count(), 3);
    assert_eq!(transport.message_count(), 0);
}

#[tokio::test]
async fn test_concurrent_verify_accepts_code_once() {
    let harness = Arc::new(Harness::new(MockTransport::new()));

    harness.service.send("email", CREDENTIAL).await.unwrap();
    let code = harness.pending_code().await;

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let harness = Arc::clone(&harness);
            let code = code.clone();
            tokio::spawn(async move {
                harness
                    .service
                    .verify("email", CREDENTIAL, &code)
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut accepted = 0;
    for attempt in attempts {
        if attempt.await.unwrap() {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);
}
