//! # Posters API
//!
//! actix-web endpoints for one-time-code sign-in, plus the process wiring
//! used by the `posters_api` binary.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod routes;
pub mod telemetry;

pub use app::{configure, AppState};
