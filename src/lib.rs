//! Pokecache - A concurrent in-memory response cache
//!
//! Stores raw response bodies by request URL and purges them after a fixed
//! interval using an owned background reaper task.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStats, ReadPolicy};
pub use config::Config;
pub use error::{CacheError, Result};
