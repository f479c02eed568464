//! Message transport trait

use async_trait::async_trait;

use crate::InfrastructureError;

/// Delivers one rendered message to a provider
///
/// Implementations make a single attempt; retrying is the delivery worker's job.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Send a message, returning the provider's message id
    async fn send(
        &self,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, InfrastructureError>;

    /// Provider name for logs
    fn provider_name(&self) -> &str;
}
