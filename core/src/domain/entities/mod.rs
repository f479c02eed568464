//! Domain entities

pub mod verification_entry;

pub use verification_entry::{
    VerificationEntry, DEFAULT_CODE_LENGTH, DEFAULT_ENTRY_TTL_SECONDS, MAX_CODE_LENGTH,
    MIN_CODE_LENGTH,
};
