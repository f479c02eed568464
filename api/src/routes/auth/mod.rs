//! One-time-code sign-in endpoints
//!
//! - `send-code` generates a code for a credential and queues its delivery
//! - `verify-code` checks a submitted code and consumes it on success

pub mod send_code;
pub mod verify_code;
