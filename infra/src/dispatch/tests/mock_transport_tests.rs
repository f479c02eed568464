use crate::dispatch::{MessageTransport, MockTransport};
use crate::InfrastructureError;

#[tokio::test]
async fn test_mock_send_records_message() {
    let transport = MockTransport::new();

    let message_id = transport
        .send("user@example.com", "Posters Login Code.", "body")
        .await
        .unwrap();

    assert!(message_id.starts_with("mock_"));
    assert_eq!(transport.message_count(), 1);

    let sent = transport.sent_messages();
    assert_eq!(sent[0].destination, "user@example.com");
    assert_eq!(sent[0].message_id, message_id);
}

#[tokio::test]
async fn test_mock_failing_first() {
    let transport = MockTransport::failing_first(2);

    for _ in 0..2 {
        let result = transport.send("user@example.com", "s", "b").await;
        assert!(matches!(result, Err(InfrastructureError::Transport(_))));
    }
    assert!(transport.send("user@example.com", "s", "b").await.is_ok());

    assert_eq!(transport.attempt_count(), 3);
    assert_eq!(transport.message_count(), 1);
}

#[tokio::test]
async fn test_mock_always_failing() {
    let transport = MockTransport::always_failing();

    for _ in 0..5 {
        assert!(transport.send("user@example.com", "s", "b").await.is_err());
    }
    assert_eq!(transport.message_count(), 0);
}

#[tokio::test]
async fn test_clones_share_state() {
    let transport = MockTransport::new();
    let handle = transport.clone();

    handle.send("user@example.com", "s", "b").await.unwrap();

    assert_eq!(transport.message_count(), 1);
    assert_eq!(transport.provider_name(), "mock");
}
