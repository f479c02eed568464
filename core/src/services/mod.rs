//! Business services containing domain logic and use cases.

pub mod verification;

// Re-export commonly used types
pub use verification::{
    Channel, ChannelBackend, ChannelRegistry, CodeGenerator, EntryStore, LateralCodeGenerator,
    NotificationDispatcher, NumericCodeGenerator, VerificationService, VerificationServiceConfig,
};
