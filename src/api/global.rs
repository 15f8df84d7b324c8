/*!
 * Process-Wide API
 * Free functions operating on the global cleaner
 */

use super::close::Close;
use super::owner::Cleanup;
use crate::core::errors::CleanupFailure;
use crate::core::types::{CleanupResult, HandleId};
use crate::daemon::Cleaner;
use crate::phantom::Payload;

/// Run `action(payload)` once `owner` has been dropped
pub fn register<O, V, F>(owner: &O, action: F, payload: V) -> CleanupResult<HandleId>
where
    O: Cleanup,
    V: Payload,
    F: FnOnce(V) + Send + 'static,
{
    Cleaner::global().register(owner, action, payload)
}

/// Run `action()` once `owner` has been dropped
pub fn register_action<O, F>(owner: &O, action: F) -> CleanupResult<HandleId>
where
    O: Cleanup,
    F: FnOnce() + Send + 'static,
{
    Cleaner::global().register_action(owner, action)
}

/// Close `resources` in the given order once `owner` has been dropped
pub fn register_auto_close<O, R, I>(owner: &O, resources: I) -> CleanupResult<HandleId>
where
    O: Cleanup,
    R: Close,
    I: IntoIterator<Item = R>,
{
    Cleaner::global().register_auto_close(owner, resources)
}

/// Append a handler for failures raised while cleaning up
pub fn add_exception_handler<F>(handler: F)
where
    F: Fn(&CleanupFailure) + Send + Sync + 'static,
{
    Cleaner::global().add_exception_handler(handler);
}

/// Drain ready cleanups when the process exits
pub fn set_run_on_exit(enabled: bool) {
    Cleaner::global().set_run_on_exit(enabled);
}

/// Scheduling priority of the global daemon, 1 (lowest) to 10 (highest)
pub fn set_priority(priority: i32) -> CleanupResult<()> {
    Cleaner::global().set_priority(priority)
}

/// Block until cleanups that are ready now have fired
pub fn run_cleanup_now() -> bool {
    Cleaner::global().run_cleanup_now()
}
