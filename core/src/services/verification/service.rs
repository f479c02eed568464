//! Main verification service implementation

use constant_time_eq::constant_time_eq;
use posters_shared::mask_credential;

use crate::domain::entities::verification_entry::VerificationEntry;
use crate::errors::{DomainError, DomainResult};

use super::channel::ChannelRegistry;
use super::config::VerificationServiceConfig;

/// Sends one-time codes and verifies them
///
/// Per credential the service moves between no entry and a pending entry,
/// driven purely by what is in the channel's store: `send` creates or
/// overwrites the entry, a successful `verify` or the store's TTL removes it.
pub struct VerificationService {
    /// Collaborators for each configured channel
    registry: ChannelRegistry,
    /// Service configuration
    config: VerificationServiceConfig,
}

impl VerificationService {
    /// Create a new verification service
    ///
    /// # Arguments
    ///
    /// * `registry` - Channels with their generator, store and dispatcher
    /// * `config` - Code length and entry TTL
    pub fn new(registry: ChannelRegistry, config: VerificationServiceConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Send a verification code to a credential
    ///
    /// This method:
    /// 1. Resolves the channel
    /// 2. Generates a new code
    /// 3. Stores it under the credential, replacing any pending code
    /// 4. Queues it for delivery
    ///
    /// Only steps 1 and 2 can fail the call, and neither has side effects.
    /// A store or queue failure is logged and the call still succeeds; the
    /// user simply never receives a usable code.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The code was generated (storage and delivery are best-effort)
    /// * `Err(DomainError)` - Unknown channel or unusable generator
    pub async fn send(&self, channel: &str, credential: &str) -> DomainResult<()> {
        let (channel, backend) = self.registry.resolve(channel)?;
        let masked = mask_credential(credential);

        let code = backend.generator().generate_code(self.config.code_length)?;
        let entry = VerificationEntry::new(credential, code, self.config.entry_ttl);

        tracing::info!(
            channel = %channel,
            credential = %masked,
            strategy = backend.generator().strategy_name(),
            expires_at = %entry.expires_at,
            event = "otp_generated",
            "Generated new verification code"
        );

        if let Err(e) = backend
            .store()
            .put(&entry.credential, &entry.code, entry.ttl)
            .await
        {
            tracing::error!(
                channel = %channel,
                credential = %masked,
                error = %e,
                event = "otp_storage_failed",
                "Verification entry was not stored"
            );
        }

        if let Err(e) = backend
            .dispatcher()
            .enqueue(&entry.credential, &entry.code)
            .await
        {
            tracing::error!(
                channel = %channel,
                credential = %masked,
                error = %e,
                event = "otp_dispatch_failed",
                "Verification code was not queued for delivery"
            );
        }

        Ok(())
    }

    /// Verify a submitted code
    ///
    /// A wrong code or a missing/expired entry is an ordinary `false`; the
    /// pending entry is left untouched so the user can retry. A matching code
    /// deletes the entry if it still holds that code, so each code verifies
    /// at most once under concurrent requests and a resend that lands in
    /// between keeps its fresh code.
    ///
    /// # Returns
    ///
    /// * `Ok(bool)` - Whether the code was accepted
    /// * `Err(DomainError)` - Unknown channel or store failure
    pub async fn verify(
        &self,
        channel: &str,
        credential: &str,
        submitted_code: &str,
    ) -> DomainResult<bool> {
        let (channel, backend) = self.registry.resolve(channel)?;
        let masked = mask_credential(credential);

        let stored = backend.store().get(credential).await.map_err(|e| {
            tracing::error!(
                channel = %channel,
                credential = %masked,
                error = %e,
                event = "otp_lookup_failed",
                "Failed to read verification entry"
            );
            DomainError::Store(e)
        })?;

        let Some(stored) = stored else {
            tracing::debug!(
                channel = %channel,
                credential = %masked,
                event = "otp_not_found",
                "No pending verification code (never sent or expired)"
            );
            return Ok(false);
        };

        if !Self::codes_match(&stored, submitted_code) {
            tracing::warn!(
                channel = %channel,
                credential = %masked,
                event = "otp_verification_failed",
                "Submitted verification code does not match"
            );
            return Ok(false);
        }

        // Only the caller whose delete removed the entry wins. Comparing
        // against the value read keeps a code issued in between alive.
        if !backend.store().delete_if_equals(credential, &stored).await? {
            tracing::warn!(
                channel = %channel,
                credential = %masked,
                event = "otp_already_consumed",
                "Verification code was consumed or replaced by a concurrent request"
            );
            return Ok(false);
        }

        tracing::info!(
            channel = %channel,
            credential = %masked,
            event = "otp_verified_success",
            "Verification code successfully verified"
        );
        Ok(true)
    }

    /// Check whether a credential has an unexpired code waiting
    pub async fn has_pending_code(&self, channel: &str, credential: &str) -> DomainResult<bool> {
        let (_, backend) = self.registry.resolve(channel)?;
        Ok(backend.store().get(credential).await?.is_some())
    }

    /// Compare a stored code with a submitted one
    ///
    /// Both sides are UTF-8 strings; surrounding whitespace is ignored and the
    /// remaining bytes must match exactly. The comparison runs in constant
    /// time for equal-length inputs.
    pub fn codes_match(stored: &str, submitted: &str) -> bool {
        let stored = stored.trim();
        let submitted = submitted.trim();
        if stored.len() != submitted.len() {
            return false;
        }
        constant_time_eq(stored.as_bytes(), submitted.as_bytes())
    }
}
