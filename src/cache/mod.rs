//! Cache Module
//!
//! In-memory stand-in for the shared cache service: TTL entries, an atomic
//! `add`, and counters. Lock tokens live here.

mod entry;
mod stats;
mod store;


pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 250;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
