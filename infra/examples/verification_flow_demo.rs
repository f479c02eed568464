//! Example demonstrating the verification flow without external services
//!
//! Wires the verification service to the in-memory entry store and a mock
//! transport whose first delivery attempt fails, then sends and verifies a
//! code. Retry delay is shortened to one second.
//!
//! Run with: cargo run --example verification_flow_demo

use std::sync::Arc;
use std::time::Duration;

use posters_core::services::verification::{
    Channel, ChannelBackend, ChannelRegistry, EntryStore, NumericCodeGenerator,
    VerificationService, VerificationServiceConfig,
};
use posters_infra::cache::MemoryEntryStore;
use posters_infra::dispatch::{DeliveryQueue, MessageTemplate, MockTransport, RetryPolicy};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let store = MemoryEntryStore::new();
    let transport = MockTransport::failing_first(1);
    let (queue, worker) = DeliveryQueue::start(
        Arc::new(transport.clone()),
        MessageTemplate::for_channel(Channel::Email, 4),
        RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        },
    );

    let service = VerificationService::new(
        ChannelRegistry::new().with_channel(
            Channel::Email,
            ChannelBackend::new(
                Arc::new(NumericCodeGenerator),
                Arc::new(store.clone()),
                Arc::new(queue),
            ),
        ),
        VerificationServiceConfig::default(),
    );

    let credential = "user@example.com";

    println!("=== Sending code ===");
    service.send("email", credential).await?;
    let code = store.get(credential).await?.ok_or("code was not stored")?;
    println!("Stored code: {}", code);

    println!("\n=== Verifying ===");
    println!("Wrong code accepted: {}", service.verify("email", credential, "000000x").await?);
    println!("Right code accepted: {}", service.verify("email", credential, &code).await?);
    println!("Reused code accepted: {}", service.verify("email", credential, &code).await?);

    println!("\n=== Unknown channel ===");
    if let Err(e) = service.send("carrier_pigeon", credential).await {
        println!("Rejected: {}", e);
    }

    // Dropping the service closes the queue; the worker drains and exits
    drop(service);
    worker.await?;

    for message in transport.sent_messages() {
        println!("\n=== Delivered ({}) ===", message.message_id);
        println!("To: {}\nSubject: {}\n\n{}", message.destination, message.subject, message.body);
    }
    println!("Delivery attempts: {}", transport.attempt_count());

    Ok(())
}
