//! Cache Store Module
//!
//! The guarded state behind a [`Cache`](crate::cache::Cache): the entry map,
//! the expiry interval and the counters. All methods assume the caller holds
//! the cache lock.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::cache::{CacheEntry, CacheStats, ReadPolicy};

// == Cache Store ==
/// Key-value storage with interval-based staleness.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Staleness threshold and reaper period
    interval: Duration,
    /// Treatment of stale-but-unreaped entries on read
    read_policy: ReadPolicy,
    /// Read and sweep counters
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `interval` - Age beyond which entries are stale
    /// * `read_policy` - Whether `get` hides stale entries
    pub fn new(interval: Duration, read_policy: ReadPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            interval,
            read_policy,
            stats: CacheStats::new(),
        }
    }

    // == Add ==
    /// Stores a payload, replacing any existing entry for `key`.
    ///
    /// The replacement carries a fresh timestamp, so the entry's age resets.
    pub fn add(&mut self, key: String, value: Vec<u8>) {
        self.entries.insert(key, CacheEntry::new(value));
    }

    // == Get ==
    /// Returns a copy of the payload stored under `key`.
    ///
    /// Under [`ReadPolicy::Lenient`] any present entry is a hit regardless of
    /// age. Under [`ReadPolicy::Strict`] entries older than the interval are
    /// misses. Stale entries are left for the reaper in both cases.
    pub fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        let found = match self.entries.get(key) {
            Some(entry) if self.is_visible(entry) => Some(entry.value().to_vec()),
            _ => None,
        };

        match found {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        found
    }

    fn is_visible(&self, entry: &CacheEntry) -> bool {
        match self.read_policy {
            ReadPolicy::Lenient => true,
            ReadPolicy::Strict => !entry.is_stale_at(self.interval, Instant::now()),
        }
    }

    // == Reap ==
    /// Removes every entry older than the interval.
    ///
    /// Every call counts as one sweep in the stats, whether it comes from
    /// the reaper or a manual [`Cache::reap`](crate::cache::Cache::reap).
    /// Returns the number of entries removed.
    pub fn reap(&mut self) -> usize {
        self.reap_at(Instant::now())
    }

    /// Removes every entry that is stale as of `now`.
    pub fn reap_at(&mut self, now: Instant) -> usize {
        let interval = self.interval;
        let before = self.entries.len();

        self.entries
            .retain(|_, entry| !entry.is_stale_at(interval, now));

        let removed = before - self.entries.len();
        self.stats.record_sweep(removed);
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Interval ==
    /// Returns the staleness threshold.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    // == Read Policy ==
    /// Returns how `get` treats stale entries.
    pub fn read_policy(&self) -> ReadPolicy {
        self.read_policy
    }

    // == Length ==
    /// Returns the current number of entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
