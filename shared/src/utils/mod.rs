//! Common utility functions

pub mod mask;
pub mod validation;

pub use mask::mask_credential;
