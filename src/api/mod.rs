/*!
 * Registration API
 *
 * - **Cleanup**: trait implemented by owners, with registration helpers
 * - **Tracked**: wrapper that turns any value into an owner
 * - **Close / Resources**: ordered auto-close of resources
 * - **global**: free functions on the process-wide cleaner
 */

mod close;
pub mod global;
mod owner;
mod registration;

pub use close::{Close, Resources};
pub use owner::{Cleanup, Tracked};
