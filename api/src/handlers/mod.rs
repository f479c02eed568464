//! Error-to-response mapping shared by the route handlers

pub mod error;

pub use error::{handle_domain_error, validation_error_response};
