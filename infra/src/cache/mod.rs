//! Cache module for verification entries
//!
//! This module provides the Redis client with connection and command retry,
//! plus the two entry store backends: Redis for production and an in-memory
//! map for development and tests.

pub mod memory_store;
pub mod redis_client;
pub mod redis_store;

#[cfg(test)]
mod tests;

pub use memory_store::MemoryEntryStore;
pub use redis_client::RedisClient;
pub use redis_store::RedisEntryStore;

// Re-export commonly used types
pub use posters_shared::config::CacheConfig;
