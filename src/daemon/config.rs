/*!
 * Cleaner Configuration
 *
 * Runtime configuration for the daemon, flushes and the exit drain
 */

use crate::core::limits::{
    DEFAULT_DAEMON_NAME, DEFAULT_DAEMON_PRIORITY, DEFAULT_LOCK_STRIPES, DRAIN_ROUNDS, DRAIN_SETTLE,
    FLUSH_INITIAL_BACKOFF, FLUSH_MAX_ATTEMPTS, FLUSH_MAX_BACKOFF, MAX_PRIORITY, MIN_PRIORITY,
};
use crate::core::types::Priority;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Bounded backoff used by `run_cleanup_now`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushPolicy {
    /// Polling attempts before giving up
    pub max_attempts: u32,
    /// First sleep between polls
    pub initial_backoff: Duration,
    /// Cap for the doubling sleep
    pub max_backoff: Duration,
}

impl Default for FlushPolicy {
    fn default() -> Self {
        Self {
            max_attempts: FLUSH_MAX_ATTEMPTS,
            initial_backoff: FLUSH_INITIAL_BACKOFF,
            max_backoff: FLUSH_MAX_BACKOFF,
        }
    }
}

impl FlushPolicy {
    /// Sleep that follows `current`
    pub fn next_backoff(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_backoff)
    }

    /// Upper bound of the total time a flush may sleep
    pub fn worst_case(&self) -> Duration {
        let mut total = Duration::ZERO;
        let mut backoff = self.initial_backoff;
        for _ in 0..self.max_attempts {
            total += backoff;
            backoff = self.next_backoff(backoff);
        }
        total
    }
}

/// Bounded retry loop run at shutdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainPolicy {
    /// Collection rounds to attempt
    pub rounds: u32,
    /// Sleep after each forced collection
    pub settle: Duration,
}

impl Default for DrainPolicy {
    fn default() -> Self {
        Self {
            rounds: DRAIN_ROUNDS,
            settle: DRAIN_SETTLE,
        }
    }
}

/// Cleaner configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Name of the daemon thread
    pub thread_name: String,
    /// Initial daemon priority
    pub priority: Priority,
    /// Drain ready handles when the cleaner shuts down
    pub run_on_exit: bool,
    pub flush: FlushPolicy,
    pub drain: DrainPolicy,
    /// Stripes used for payload-scoped locking
    pub lock_stripes: usize,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_DAEMON_NAME.to_string(),
            priority: DEFAULT_DAEMON_PRIORITY,
            run_on_exit: false,
            flush: FlushPolicy::default(),
            drain: DrainPolicy::default(),
            lock_stripes: DEFAULT_LOCK_STRIPES,
        }
    }
}

impl CleanerConfig {
    /// Configuration for short-lived processes and tests: fast polling, quick drain
    pub fn responsive() -> Self {
        Self {
            flush: FlushPolicy {
                max_attempts: 200,
                initial_backoff: Duration::from_micros(100),
                max_backoff: Duration::from_millis(25),
            },
            drain: DrainPolicy {
                rounds: 5,
                settle: Duration::from_millis(1),
            },
            ..Self::default()
        }
    }

    /// Defaults overridden from the environment
    ///
    /// Environment variables:
    /// - CLEANUP_RUN_ON_EXIT: drain at exit (`1`/`true`)
    /// - CLEANUP_DAEMON_PRIORITY: initial priority (1-10)
    /// - CLEANUP_DRAIN_ROUNDS: collection rounds at exit
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup("CLEANUP_RUN_ON_EXIT") {
            config.run_on_exit = value == "1" || value.eq_ignore_ascii_case("true");
        }

        if let Some(value) = lookup("CLEANUP_DAEMON_PRIORITY") {
            match value.parse::<Priority>() {
                Ok(p) if (MIN_PRIORITY..=MAX_PRIORITY).contains(&p) => config.priority = p,
                _ => warn!(value = %value, "Ignoring invalid CLEANUP_DAEMON_PRIORITY"),
            }
        }

        if let Some(value) = lookup("CLEANUP_DRAIN_ROUNDS") {
            match value.parse::<u32>() {
                Ok(rounds) => config.drain.rounds = rounds,
                Err(_) => warn!(value = %value, "Ignoring invalid CLEANUP_DRAIN_ROUNDS"),
            }
        }

        config
    }
}
