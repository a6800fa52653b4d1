//! Cache Module
//!
//! Provides an in-memory byte cache with interval-based expiry.

mod entry;
mod handle;
mod policy;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use handle::{Cache, MAX_INTERVAL};
pub use policy::ReadPolicy;
pub use stats::CacheStats;
pub use store::CacheStore;
