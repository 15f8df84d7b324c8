/*!
 * Phantom Cleanup Library
 * Post-drop cleanup actions run by a single background daemon
 */

pub mod api;
pub mod core;
pub mod daemon;
pub mod exceptions;
pub mod heuristic;
pub mod monitoring;
pub mod phantom;
pub mod shutdown;

// Re-exports
pub use api::global::{
    add_exception_handler, register, register_action, register_auto_close, run_cleanup_now,
    set_priority, set_run_on_exit,
};
pub use api::{Cleanup, Close, Resources, Tracked};
pub use crate::core::limits::{MAX_PRIORITY, MIN_PRIORITY, NORM_PRIORITY};
pub use crate::core::{errors::*, types::*};
pub use daemon::{Cleaner, CleanerBuilder, CleanerConfig, CleanerStats, DrainPolicy, FlushPolicy};
pub use exceptions::ExceptionChain;
pub use heuristic::{AcceptAll, LeakHeuristic, Nesting, StructuralHeuristic, TypeShape};
pub use monitoring::init_tracing;
pub use phantom::{Anchor, Collector, Payload};
pub use shutdown::DrainReport;
