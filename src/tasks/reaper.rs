//! Reaper Task
//!
//! Background task that periodically removes stale cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::error::Result;

/// Owned handle to a running reaper.
///
/// Dropping the handle drops the shutdown sender, which also stops the task
/// at its next wake-up. Use [`ReaperHandle::stop`] to stop it and wait for it
/// to exit.
#[derive(Debug)]
pub struct ReaperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Signals the reaper to stop and waits for the task to exit.
    pub async fn stop(self) -> Result<()> {
        // Err only means the task already exited and dropped its receiver
        let _ = self.shutdown.send(true);
        self.task.await?;
        Ok(())
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a background task that sweeps stale entries every `interval`.
///
/// The first sweep runs one full interval after spawning, not immediately.
/// Each sweep holds the store lock for its whole duration.
///
/// Must be called from within a tokio runtime. An interval too large to add
/// to the current instant makes the task exit without sweeping.
///
/// # Example
/// ```ignore
/// let store = Arc::new(Mutex::new(CacheStore::new(interval, ReadPolicy::Lenient)));
/// let reaper = spawn_reaper(store.clone(), interval);
/// // Later, during shutdown:
/// reaper.stop().await?;
/// ```
pub fn spawn_reaper(store: Arc<Mutex<CacheStore>>, interval: Duration) -> ReaperHandle {
    let (shutdown, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        info!("Starting cache reaper with interval of {:?}", interval);

        let Some(first_sweep) = Instant::now().checked_add(interval) else {
            warn!("Cache reaper interval {:?} is out of range, not sweeping", interval);
            return;
        };
        let mut ticker = time::interval_at(first_sweep, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    // Sender dropped or stop requested
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let (removed, remaining) = {
                        let mut guard = store.lock().await;
                        let removed = guard.reap();
                        (removed, guard.len())
                    };

                    if removed > 0 {
                        info!(
                            "Cache reap: removed {} stale entries, {} remaining",
                            removed, remaining
                        );
                    } else {
                        debug!("Cache reap: no stale entries found");
                    }
                }
            }
        }

        info!("Cache reaper stopped");
    });

    ReaperHandle { shutdown, task }
}
