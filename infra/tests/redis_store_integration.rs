//! Verification flow against a real Redis server
//!
//! Run with `REDIS_URL` pointing at a disposable database and `--ignored`.

use std::sync::Arc;
use std::time::Duration;

use posters_core::services::verification::{
    Channel, ChannelBackend, ChannelRegistry, NumericCodeGenerator, VerificationService,
    VerificationServiceConfig,
};
use posters_core::services::verification::{EntryStore, NotificationDispatcher};
use posters_infra::cache::{CacheConfig, RedisClient, RedisEntryStore};
use posters_infra::dispatch::{
    DeliveryQueue, MessageTemplate, MockTransport, QueueKeys, RedisDeliveryQueue, RetryPolicy,
};
use redis::AsyncCommands;

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379/2".to_string())
}

async fn redis_client() -> RedisClient {
    RedisClient::new(CacheConfig::new(redis_url()).with_prefix("posters_test"))
        .await
        .expect("Redis server required")
}

/// Client whose keys no other test touches
async fn isolated_client() -> RedisClient {
    let prefix = format!("posters_test:{}", uuid::Uuid::new_v4());
    RedisClient::new(CacheConfig::new(redis_url()).with_prefix(prefix))
        .await
        .expect("Redis server required")
}

async fn list_len(key: &str) -> usize {
    let client = redis::Client::open(redis_url()).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    conn.llen::<_, usize>(key).await.unwrap()
}

async fn wait_for_messages(transport: &MockTransport, count: usize) {
    for _ in 0..100 {
        if transport.message_count() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("expected {} delivered messages", count);
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_verification_flow_on_redis() {
    let client = redis_client().await;
    let store = RedisEntryStore::new(client.clone(), Channel::Email);
    let transport = MockTransport::new();
    let (queue, _worker) = DeliveryQueue::start(
        Arc::new(transport.clone()),
        MessageTemplate::for_channel(Channel::Email, 4),
        RetryPolicy::default(),
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

    let credential = format!("flow-{}@example.com", uuid::Uuid::new_v4());
    service.send("email", &credential).await.unwrap();

    let key = store.format_key(&credential);
    let code = client.get(&key).await.unwrap().expect("stored code");
    let ttl = client.ttl(&key).await.unwrap().expect("ttl set");
    assert!(ttl > 230 && ttl <= 240);

    assert!(!service.verify("email", &credential, "not-it").await.unwrap());
    assert!(service.verify("email", &credential, &code).await.unwrap());
    assert_eq!(client.get(&key).await.unwrap(), None);
    assert!(!service.verify("email", &credential, &code).await.unwrap());
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_delete_if_equals_keeps_replaced_value() {
    let client = redis_client().await;
    let store = RedisEntryStore::new(client.clone(), Channel::Email);
    let credential = format!("cad-{}@example.com", uuid::Uuid::new_v4());
    let ttl = Duration::from_secs(60);

    store.put(&credential, "111111", ttl).await.unwrap();
    store.put(&credential, "222222", ttl).await.unwrap();

    assert!(!store.delete_if_equals(&credential, "111111").await.unwrap());
    assert_eq!(
        store.get(&credential).await.unwrap(),
        Some("222222".to_string())
    );
    assert!(store.delete_if_equals(&credential, "222222").await.unwrap());
    assert_eq!(store.get(&credential).await.unwrap(), None);
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_redis_queue_delivers_and_acknowledges() {
    let client = isolated_client().await;
    let transport = MockTransport::new();
    let (queue, worker) = RedisDeliveryQueue::start(
        client,
        Arc::new(transport.clone()),
        MessageTemplate::for_channel(Channel::Email, 4),
        RetryPolicy::default(),
    )
    .await
    .unwrap();
    let keys = queue.keys().clone();

    queue.enqueue("user@example.com", "482913").await.unwrap();
    wait_for_messages(&transport, 1).await;

    let sent = transport.sent_messages();
    assert_eq!(sent[0].destination, "user@example.com");
    assert!(sent[0].body.contains("482913"));

    // Acknowledgement follows delivery
    for _ in 0..100 {
        if list_len(&keys.processing).await == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(list_len(&keys.processing).await, 0);
    assert_eq!(list_len(&keys.pending).await, 0);

    drop(queue);
    worker.await.unwrap();
}

#[tokio::test]
#[ignore] // Requires actual Redis server
async fn test_redis_queue_requeues_abandoned_tasks() {
    let client = isolated_client().await;
    let keys = QueueKeys::new(client.config(), Channel::Email);

    // Claimed by a worker that never finished
    client
        .push(
            &keys.processing,
            r#"{"destination":"stranded@example.com","code":"105377"}"#,
        )
        .await
        .unwrap();

    let transport = MockTransport::new();
    let (queue, worker) = RedisDeliveryQueue::start(
        client,
        Arc::new(transport.clone()),
        MessageTemplate::for_channel(Channel::Email, 4),
        RetryPolicy::default(),
    )
    .await
    .unwrap();

    wait_for_messages(&transport, 1).await;
    assert_eq!(transport.sent_messages()[0].destination, "stranded@example.com");

    drop(queue);
    worker.await.unwrap();
}
