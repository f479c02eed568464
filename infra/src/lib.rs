//! # Infrastructure Layer
//!
//! Concrete collaborators for the Posters verification service:
//!
//! - **Cache**: the Redis client and the entry stores (Redis for production,
//!   in-memory for development and tests)
//! - **Dispatch**: message transports (HTTP mail API, mock) and the delivery
//!   queue whose worker owns retries
//!
//! [`initialize`] wires them into a ready-to-use [`VerificationService`]
//! from an [`AppConfig`].

use std::sync::Arc;

use posters_core::errors::{DispatchError, StoreError};
use posters_core::services::verification::{
    Channel, ChannelBackend, ChannelRegistry, NumericCodeGenerator, VerificationService,
    VerificationServiceConfig,
};
use posters_shared::config::{AppConfig, TransportConfig, TransportProvider};
use tokio::task::JoinHandle;

/// Cache module - Redis client and entry stores
pub mod cache;

/// Dispatch module - delivery queue, retry worker and transports
pub mod dispatch;

use cache::{RedisClient, RedisEntryStore};
use dispatch::{
    HttpMailTransport, MessageTemplate, MessageTransport, MockTransport, RedisDeliveryQueue,
    RetryPolicy,
};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Stored bytes could not be decoded
    #[error("Cache value for {key} is not valid UTF-8")]
    InvalidValue { key: String },

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Message transport error
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<InfrastructureError> for StoreError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::InvalidValue { key } => StoreError::Corrupt { key },
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

impl From<InfrastructureError> for DispatchError {
    fn from(error: InfrastructureError) -> Self {
        DispatchError::Rejected(error.to_string())
    }
}

/// Infrastructure service container
pub struct InfrastructureServices {
    /// Verification service wired to every configured channel
    pub verification: Arc<VerificationService>,
    /// Redis client shared by the entry stores and queues, for health checks
    pub redis: RedisClient,
    /// Delivery workers, one per channel; they finish once the service is dropped
    pub workers: Vec<JoinHandle<()>>,
}

/// Initialize infrastructure services
///
/// This function sets up:
/// - The Redis connection used by every channel's entry store
/// - One transport and Redis delivery queue per configured channel; tasks
///   left unfinished by a previous run are requeued
/// - The channel registry and the verification service on top of it
///
/// Must be called from within a tokio runtime; the delivery workers are
/// spawned onto it.
pub async fn initialize(config: &AppConfig) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!("Initializing infrastructure services...");

    config
        .validate()
        .map_err(|e| InfrastructureError::Config(e.to_string()))?;

    let redis = RedisClient::new(config.cache.clone()).await?;
    let policy = RetryPolicy::from(&config.verification);
    let ttl_minutes = config.verification.code_ttl_seconds.div_ceil(60);

    let mut registry = ChannelRegistry::new();
    let mut workers = Vec::new();

    let mut channels = vec![(Channel::Email, &config.email)];
    if let Some(sms) = &config.sms {
        channels.push((Channel::Sms, sms));
    }

    for (channel, transport_config) in channels {
        let transport = create_transport(transport_config)?;
        tracing::info!(
            channel = %channel,
            provider = transport.provider_name(),
            "Registering verification channel"
        );

        let template = MessageTemplate::for_channel(channel, ttl_minutes);
        let (queue, worker) =
            RedisDeliveryQueue::start(redis.clone(), transport, template, policy.clone()).await?;
        let store = RedisEntryStore::new(redis.clone(), channel);

        registry.register(
            channel,
            ChannelBackend::new(Arc::new(NumericCodeGenerator), Arc::new(store), Arc::new(queue)),
        );
        workers.push(worker);
    }

    let verification = Arc::new(VerificationService::new(
        registry,
        VerificationServiceConfig::from(&config.verification),
    ));

    tracing::info!("Infrastructure services initialized successfully");

    Ok(InfrastructureServices {
        verification,
        redis,
        workers,
    })
}

/// Create the message transport described by a channel's configuration
pub fn create_transport(
    config: &TransportConfig,
) -> Result<Arc<dyn MessageTransport>, InfrastructureError> {
    match config.provider {
        TransportProvider::Mock => Ok(Arc::new(MockTransport::new())),
        TransportProvider::Http => Ok(Arc::new(HttpMailTransport::new(config)?)),
    }
}
