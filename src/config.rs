//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::ReadPolicy;

/// Default expiry interval in milliseconds (one minute).
const DEFAULT_INTERVAL_MS: u64 = 60_000;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Expiry interval, also used as the reaper period
    pub interval: Duration,
    /// Whether reads report stale-but-unreaped entries
    pub read_policy: ReadPolicy,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_INTERVAL_MS` - Expiry interval in milliseconds (default: 60000)
    /// - `CACHE_READ_POLICY` - `lenient` or `strict` (default: lenient)
    pub fn from_env() -> Self {
        Self {
            interval: env::var("CACHE_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(Duration::from_millis(DEFAULT_INTERVAL_MS)),
            read_policy: env::var("CACHE_READ_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            read_policy: ReadPolicy::default(),
        }
    }
}
