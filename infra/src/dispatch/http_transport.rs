//! HTTP mail transport
//!
//! Posts each message as JSON to a mail provider API:
//!
//! ```json
//! { "from": "...", "to": "...", "subject": "...", "body": "..." }
//! ```
//!
//! A `2xx` response is a success; its optional `id` / `message_id` field is
//! returned as the provider message id.

use std::time::Duration;

use async_trait::async_trait;
use posters_shared::config::TransportConfig;
use posters_shared::mask_credential;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::MessageTransport;
use crate::InfrastructureError;

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Mail provider reached over HTTP
pub struct HttpMailTransport {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    from_address: String,
}

impl HttpMailTransport {
    /// Build the transport; the config must carry an endpoint
    pub fn new(config: &TransportConfig) -> Result<Self, InfrastructureError> {
        let endpoint = config.endpoint.clone().ok_or_else(|| {
            InfrastructureError::Config("HTTP transport requires an endpoint".to_string())
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        info!(
            endpoint = %endpoint,
            from = %mask_credential(&config.from_address),
            "HTTP mail transport initialized"
        );

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn message_id_from(body: &serde_json::Value) -> Option<String> {
    ["id", "message_id"]
        .iter()
        .find_map(|field| body.get(field).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[async_trait]
impl MessageTransport for HttpMailTransport {
    async fn send(
        &self,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, InfrastructureError> {
        let payload = OutboundMessage {
            from: &self.from_address,
            to: destination,
            subject,
            body,
        };

        debug!(destination = %mask_credential(destination), "Posting message to mail API");

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(
                status = status.as_u16(),
                destination = %mask_credential(destination),
                "Mail API rejected message"
            );
            return Err(InfrastructureError::Transport(format!(
                "Mail API returned {}: {}",
                status, detail
            )));
        }

        // Providers that answer without a JSON body still accepted the message
        let message_id = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .as_ref()
            .and_then(message_id_from)
            .unwrap_or_else(|| format!("http_{}", Uuid::new_v4()));

        Ok(message_id)
    }

    fn provider_name(&self) -> &str {
        "http"
    }
}
