/*!
 * Phantom Handles and Notification
 *
 * The drop-driven analog of a collector's phantom references:
 *
 * - **Anchor**: embedded in the owner; its drop marks the owner unreachable
 * - **NotificationChannel**: queue the anchor pushes ready handles onto
 * - **PhantomHandle**: action plus payload, held only by the registry
 * - **PayloadLocks**: mutual exclusion for cleanups sharing a payload
 * - **Collector**: optional hook that releases parked owners on demand
 */

mod anchor;
mod channel;
mod collector;
mod handle;
mod locks;
mod payload;

pub use anchor::Anchor;
pub(crate) use anchor::AnchorCell;
pub use channel::{NotificationChannel, Signal};
pub use collector::{Collector, NoopCollector};
pub use handle::PhantomHandle;
pub use locks::PayloadLocks;
pub use payload::Payload;
