//! Cache Entry Module
//!
//! Defines the structure for individual cache entries.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A stored payload and the moment it was inserted.
///
/// Entries are never mutated after construction; an `add` on the same key
/// replaces the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Raw payload, opaque to the cache
    value: Vec<u8>,
    /// Insertion time (monotonic)
    created_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(value: Vec<u8>) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    /// Returns the stored payload.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Returns the insertion time.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    // == Age ==
    /// Time elapsed between insertion and `now`.
    ///
    /// Saturates to zero if `now` precedes insertion.
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    // == Is Stale ==
    /// Checks whether the entry is older than `interval` at `now`.
    ///
    /// Boundary condition: an entry whose age equals the interval exactly is
    /// still live. Only a strictly greater age is stale.
    pub fn is_stale_at(&self, interval: Duration, now: Instant) -> bool {
        self.age_at(now) > interval
    }
}
