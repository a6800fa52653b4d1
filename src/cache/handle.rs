//! Cache Handle Module
//!
//! The public, thread-safe face of the cache. Wraps a [`CacheStore`] in a
//! single async mutex and owns the reaper task that sweeps it.

use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::cache::{CacheStats, CacheStore, ReadPolicy};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_reaper, ReaperHandle};

/// Longest accepted expiry interval (365 days).
pub const MAX_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

// == Cache ==
/// Concurrent key/value cache whose entries expire after a fixed interval.
///
/// Every operation takes the same lock, so `add`, `get` and reaper sweeps are
/// linearizable. Share it between tasks with `Arc<Cache>`; any clone may
/// `close` it.
///
/// ```ignore
/// let cache = Arc::new(Cache::spawn(Duration::from_secs(60))?);
/// if cache.get(url).await.is_none() {
///     let body = fetch(url).await?;
///     cache.add(url, body).await;
/// }
/// cache.close().await?;
/// ```
#[derive(Debug)]
pub struct Cache {
    store: Arc<Mutex<CacheStore>>,
    interval: Duration,
    read_policy: ReadPolicy,
    /// Never held across an await
    reaper: StdMutex<Option<ReaperHandle>>,
}

impl Cache {
    // == Constructors ==
    /// Creates a cache with lenient reads. The reaper is not started.
    ///
    /// # Expiry
    /// Nothing is removed until [`Cache::start`] is called (or use
    /// [`Cache::spawn`]). Under [`ReadPolicy::Lenient`] an unstarted cache
    /// keeps returning entries of any age.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidInterval`] if `interval` is zero or
    /// longer than [`MAX_INTERVAL`].
    pub fn new(interval: Duration) -> Result<Self> {
        Self::with_policy(interval, ReadPolicy::default())
    }

    /// Creates a cache with the given read policy. The reaper is not started.
    ///
    /// # Expiry
    /// As with [`Cache::new`], call [`Cache::start`] to begin sweeping.
    pub fn with_policy(interval: Duration, read_policy: ReadPolicy) -> Result<Self> {
        if interval.is_zero() || interval > MAX_INTERVAL {
            return Err(CacheError::InvalidInterval);
        }

        Ok(Self {
            store: Arc::new(Mutex::new(CacheStore::new(interval, read_policy))),
            interval,
            read_policy,
            reaper: StdMutex::new(None),
        })
    }

    /// Creates a cache from configuration. The reaper is not started.
    ///
    /// # Expiry
    /// As with [`Cache::new`], call [`Cache::start`] to begin sweeping.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_policy(config.interval, config.read_policy)
    }

    /// Creates a cache and immediately starts its reaper.
    pub fn spawn(interval: Duration) -> Result<Self> {
        let cache = Self::new(interval)?;
        cache.start()?;
        Ok(cache)
    }

    // == Lifecycle ==
    /// Starts the background reaper on the current tokio runtime.
    ///
    /// # Errors
    /// - [`CacheError::ReaperAlreadyRunning`] if a reaper is live
    /// - [`CacheError::NoRuntime`] if called outside a tokio runtime
    pub fn start(&self) -> Result<()> {
        let mut slot = self.reaper_slot();
        if slot.as_ref().is_some_and(|reaper| !reaper.is_finished()) {
            return Err(CacheError::ReaperAlreadyRunning);
        }
        Handle::try_current().map_err(|_| CacheError::NoRuntime)?;

        *slot = Some(spawn_reaper(self.store.clone(), self.interval));
        Ok(())
    }

    /// Stops the reaper and waits for it to exit.
    ///
    /// Does nothing if the reaper is not running. Entries are kept, and the
    /// reaper may be started again afterwards.
    pub async fn close(&self) -> Result<()> {
        let reaper = self.reaper_slot().take();
        let Some(reaper) = reaper else {
            return Ok(());
        };

        if let Err(err) = reaper.stop().await {
            warn!("Cache reaper did not exit cleanly: {}", err);
            return Err(err);
        }
        info!("Cache closed");
        Ok(())
    }

    // == Is Running ==
    /// Returns true while a reaper task is alive.
    pub fn is_running(&self) -> bool {
        self.reaper_slot()
            .as_ref()
            .is_some_and(|reaper| !reaper.is_finished())
    }

    fn reaper_slot(&self) -> MutexGuard<'_, Option<ReaperHandle>> {
        // The slot only holds a handle, so a poisoned lock is still usable
        self.reaper.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // == Add ==
    /// Stores `value` under `key`, replacing any previous entry and resetting
    /// its age.
    pub async fn add(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        let (key, value) = (key.into(), value.into());
        self.store.lock().await.add(key, value);
    }

    // == Get ==
    /// Returns an independent copy of the payload stored under `key`, or
    /// `None` if there is none.
    ///
    /// With [`ReadPolicy::Lenient`] an entry that is past the interval but not
    /// yet swept is still returned.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.store.lock().await.get(key)
    }

    // == Reap ==
    /// Runs one sweep now, independent of the reaper schedule.
    ///
    /// Counts toward [`CacheStats::sweeps`] like a scheduled sweep. Returns
    /// the number of entries removed.
    pub async fn reap(&self) -> usize {
        self.store.lock().await.reap()
    }

    // == Length ==
    /// Returns the number of stored entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    // == Is Empty ==
    /// Returns true if no entries are stored.
    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub async fn stats(&self) -> CacheStats {
        self.store.lock().await.stats()
    }

    // == Interval ==
    /// Returns the expiry interval, which is also the reaper period.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    // == Read Policy ==
    /// Returns how reads treat stale-but-unreaped entries.
    pub fn read_policy(&self) -> ReadPolicy {
        self.read_policy
    }
}
