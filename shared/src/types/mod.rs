//! Type definitions shared with the presentation layer

pub mod response;

pub use response::ApiResponse;
