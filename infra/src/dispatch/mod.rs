//! Dispatch module for verification messages
//!
//! [`RedisDeliveryQueue`] is the [`NotificationDispatcher`] handed to the
//! verification service in production: `enqueue` only pushes onto a Redis
//! list, so queued codes survive a restart. [`DeliveryQueue`] does the same
//! over an in-process channel for development and tests. A
//! [`DeliveryWorker`] drains either one, renders each code through a
//! [`MessageTemplate`] and hands the message to a [`MessageTransport`],
//! retrying per its [`RetryPolicy`].
//!
//! [`NotificationDispatcher`]: posters_core::services::verification::NotificationDispatcher

pub mod http_transport;
pub mod mock_transport;
pub mod queue;
pub mod redis_queue;
pub mod template;
pub mod transport;
pub mod worker;

#[cfg(test)]
mod tests;

pub use http_transport::HttpMailTransport;
pub use mock_transport::{MockTransport, SentMessage};
pub use queue::{DeliveryQueue, DeliveryTask};
pub use redis_queue::{QueueKeys, RedisDeliveryQueue, RedisTaskSource};
pub use template::MessageTemplate;
pub use transport::MessageTransport;
pub use worker::{DeliveryWorker, RetryPolicy};
