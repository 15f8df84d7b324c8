/*!
 * Registry and Daemon
 *
 * Handle lifecycle: `Pending` (owner alive) -> `Ready` (owner dropped,
 * signal queued) -> `Fired` (removed from the registry and executed).
 * Exactly one daemon thread per cleaner fires ready handles one at a time.
 */

mod cleaner;
mod config;
pub mod priority;
mod registry;
mod stats;
mod worker;

pub use cleaner::{Cleaner, CleanerBuilder};
pub use config::{CleanerConfig, DrainPolicy, FlushPolicy};
pub use registry::Registry;
pub use stats::CleanerStats;
