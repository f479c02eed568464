use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;
use posters_api::{configure, AppState};
use posters_core::errors::{DispatchError, StoreError};
use posters_core::services::verification::{
    Channel, ChannelBackend, ChannelRegistry, EntryStore, NotificationDispatcher,
    NumericCodeGenerator, VerificationService, VerificationServiceConfig,
};
use posters_infra::cache::MemoryEntryStore;
use serde_json::{json, Value};

/// Keeps every queued `(destination, code)` so tests can read the code back
#[derive(Default)]
struct RecordingDispatcher {
    deliveries: Mutex<Vec<(String, String)>>,
}

impl RecordingDispatcher {
    fn last_code(&self) -> String {
        self.deliveries
            .lock()
            .unwrap()
            .last()
            .map(|(_, code)| code.clone())
            .expect("a queued delivery")
    }

    fn count(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn enqueue(&self, destination: &str, code: &str) -> Result<(), DispatchError> {
        self.deliveries
            .lock()
            .unwrap()
            .push((destination.to_string(), code.to_string()));
        Ok(())
    }
}

/// Store whose backend is down
struct UnreachableStore;

#[async_trait]
impl EntryStore for UnreachableStore {
    async fn put(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn delete_if_equals(&self, _key: &str, _expected: &str) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

fn state_with(store: Arc<dyn EntryStore>, dispatcher: Arc<RecordingDispatcher>) -> web::Data<AppState> {
    let registry = ChannelRegistry::new().with_channel(
        Channel::Email,
        ChannelBackend::new(Arc::new(NumericCodeGenerator), store, dispatcher),
    );
    let service = VerificationService::new(registry, VerificationServiceConfig::default());

    web::Data::new(AppState::new(Arc::new(service)))
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(App::new().app_data($state.clone()).configure(configure)).await
    };
}

#[actix_web::test]
async fn test_send_then_verify() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let state = state_with(Arc::new(MemoryEntryStore::new()), dispatcher.clone());
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/send-code")
        .set_json(json!({ "credential": "user@example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["expires_in"], 240);

    let code = dispatcher.last_code();
    let verify = |code: &str| {
        test::TestRequest::post()
            .uri("/api/v1/auth/verify-code")
            .set_json(json!({
                "channel": "email",
                "credential": "user@example.com",
                "code": code,
            }))
            .to_request()
    };

    let body: Value = test::call_and_read_body_json(&app, verify(&code)).await;
    assert_eq!(body["data"]["verified"], true);

    // Single use
    let body: Value = test::call_and_read_body_json(&app, verify(&code)).await;
    assert_eq!(body["data"]["verified"], false);
}

#[actix_web::test]
async fn test_verify_without_pending_code() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let state = state_with(Arc::new(MemoryEntryStore::new()), dispatcher);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/verify-code")
        .set_json(json!({ "credential": "user@example.com", "code": "482913" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["verified"], false);
}

#[actix_web::test]
async fn test_send_code_rejects_malformed_email() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let state = state_with(Arc::new(MemoryEntryStore::new()), dispatcher.clone());
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/send-code")
        .set_json(json!({ "channel": "email", "credential": "not-an-email" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "validation_error");
    assert_eq!(dispatcher.count(), 0);
}

#[actix_web::test]
async fn test_verify_code_rejects_non_numeric_code() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let state = state_with(Arc::new(MemoryEntryStore::new()), dispatcher);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/verify-code")
        .set_json(json!({ "credential": "user@example.com", "code": "12ab56" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_malformed_json_body() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let state = state_with(Arc::new(MemoryEntryStore::new()), dispatcher);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/send-code")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"credential\":")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "validation_error");
}

#[actix_web::test]
async fn test_unsupported_channel() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let store = MemoryEntryStore::new();
    let state = state_with(Arc::new(store.clone()), dispatcher.clone());
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/send-code")
        .set_json(json!({ "channel": "carrier_pigeon", "credential": "coop 7" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "unsupported_channel");
    assert!(store.is_empty().await);
    assert_eq!(dispatcher.count(), 0);
}

#[actix_web::test]
async fn test_store_outage() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let state = state_with(Arc::new(UnreachableStore), dispatcher.clone());
    let app = init_app!(state);

    // A failed write is swallowed; the code is still queued
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/send-code")
        .set_json(json!({ "credential": "user@example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(dispatcher.count(), 1);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/verify-code")
        .set_json(json!({ "credential": "user@example.com", "code": "482913" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "store_unavailable");
}

#[actix_web::test]
async fn test_health_check() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let state = state_with(Arc::new(MemoryEntryStore::new()), dispatcher);
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["channels"], json!(["email"]));
}
