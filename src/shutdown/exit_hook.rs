/*!
 * Exit Hook
 * One-shot process exit callback for the process-wide cleaner
 */

use super::coordinator::DrainReport;
use crate::daemon::Cleaner;
#[cfg(unix)]
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::OnceLock;

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Install the exit hook once; returns whether it is in place
pub(crate) fn install() -> bool {
    *INSTALLED.get_or_init(register)
}

pub(crate) fn is_installed() -> bool {
    INSTALLED.get().copied().unwrap_or(false)
}

#[cfg(unix)]
fn register() -> bool {
    // SAFETY: `run_at_exit` is a plain extern "C" function with no arguments
    unsafe { nix::libc::atexit(run_at_exit) == 0 }
}

#[cfg(not(unix))]
fn register() -> bool {
    false
}

#[cfg(unix)]
extern "C" fn run_at_exit() {
    // Unwinding out of an extern "C" function aborts the process
    let _ = catch_unwind(AssertUnwindSafe(drain_global));
}

#[cfg(unix)]
fn drain_global() {
    if let Some(cleaner) = Cleaner::try_global() {
        drain_if_enabled(cleaner);
    }
}

/// Run the exit drain of `cleaner` if it is set to run on exit
#[cfg_attr(not(unix), allow(dead_code))]
fn drain_if_enabled(cleaner: &Cleaner) -> Option<DrainReport> {
    if cleaner.runs_on_exit() {
        Some(cleaner.drain_on_exit(&cleaner.config().drain))
    } else {
        None
    }
}
