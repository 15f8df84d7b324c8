/*!
 * Limits and Constants
 *
 * Centralized location for the subsystem's thresholds, timings and bounds.
 */

use super::types::Priority;
use std::time::Duration;

// =============================================================================
// DAEMON
// =============================================================================

/// Lowest daemon priority
pub const MIN_PRIORITY: Priority = 1;

/// Default priority for ordinary threads
pub const NORM_PRIORITY: Priority = 5;

/// Highest daemon priority
pub const MAX_PRIORITY: Priority = 10;

/// Priority the daemon starts with
pub const DEFAULT_DAEMON_PRIORITY: Priority = MIN_PRIORITY;

/// Nice-value distance between two adjacent priorities (Linux)
pub const NICE_PER_PRIORITY_STEP: i32 = 4;

/// Name of the daemon thread
pub const DEFAULT_DAEMON_NAME: &str = "cleanup-daemon";

// =============================================================================
// PAYLOAD LOCKING
// =============================================================================

/// Number of lock stripes used for payload-scoped mutual exclusion
pub const DEFAULT_LOCK_STRIPES: usize = 64;

// =============================================================================
// FLUSH (run_cleanup_now)
// =============================================================================

/// Maximum polling attempts before a flush gives up
pub const FLUSH_MAX_ATTEMPTS: u32 = 64;

/// First backoff sleep of a flush
pub const FLUSH_INITIAL_BACKOFF: Duration = Duration::from_micros(200);

/// Upper bound for a single backoff sleep
pub const FLUSH_MAX_BACKOFF: Duration = Duration::from_millis(100);

// =============================================================================
// EXIT DRAIN
// =============================================================================

/// Collection rounds attempted at process exit
pub const DRAIN_ROUNDS: u32 = 10;

/// Sleep after each forced collection, giving drops time to enqueue
pub const DRAIN_SETTLE: Duration = Duration::from_millis(10);
