//! Background Tasks Module
//!
//! Contains background tasks owned by a cache.
//!
//! # Tasks
//! - Reaper: Removes stale cache entries once per expiry interval

mod reaper;

pub use reaper::{spawn_reaper, ReaperHandle};
