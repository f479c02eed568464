//! Verification entry: a credential bound to a pending one-time code.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use posters_shared::validation::{MAX_CODE_LENGTH, MIN_CODE_LENGTH};

/// Length of a generated code unless configured otherwise
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Seconds a code stays verifiable unless configured otherwise
pub const DEFAULT_ENTRY_TTL_SECONDS: u64 = 240;

/// A pending code as written to the entry store
///
/// The store keeps only `credential -> code` with a TTL; the timestamps exist
/// for logging and for callers that want to report when the code lapses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationEntry {
    /// Store key the code is bound to (e.g. an email address)
    pub credential: String,

    /// Fixed-width numeric code
    pub code: String,

    /// Time-to-live handed to the store
    pub ttl: Duration,

    /// When the entry was created
    pub created_at: DateTime<Utc>,

    /// First instant at which the entry is no longer visible
    pub expires_at: DateTime<Utc>,
}

impl VerificationEntry {
    /// Create an entry that expires `ttl` from now
    pub fn new(credential: impl Into<String>, code: impl Into<String>, ttl: Duration) -> Self {
        let created_at = Utc::now();
        // A TTL too large for chrono saturates to the far future
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|lifetime| created_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            credential: credential.into(),
            code: code.into(),
            ttl,
            created_at,
            expires_at,
        }
    }

    /// Entries are visible strictly before `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left before the entry lapses, zero once expired
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).to_std().unwrap_or(Duration::ZERO)
    }
}
