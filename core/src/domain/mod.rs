//! Domain layer containing the verification entry model.

pub mod entities;

pub use entities::*;
