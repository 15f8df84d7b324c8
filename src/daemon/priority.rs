/*!
 * Daemon Priority
 * Validation and mapping of daemon priorities onto OS scheduling
 */

use crate::core::errors::CleanupError;
use crate::core::limits::{MAX_PRIORITY, MIN_PRIORITY, NICE_PER_PRIORITY_STEP, NORM_PRIORITY};
use crate::core::types::{CleanupResult, Priority};

/// Validate a requested priority
pub fn validate(priority: i32) -> CleanupResult<Priority> {
    if (MIN_PRIORITY as i32..=MAX_PRIORITY as i32).contains(&priority) {
        Ok(priority as Priority)
    } else {
        Err(CleanupError::InvalidPriority(priority))
    }
}

/// Nice value for a priority: normal priority is nice 0, lower priorities are nicer
pub fn nice_for(priority: Priority) -> i32 {
    ((NORM_PRIORITY as i32 - priority as i32) * NICE_PER_PRIORITY_STEP).clamp(-20, 19)
}

/// OS id of the calling thread, if the platform exposes one
#[cfg(target_os = "linux")]
pub(crate) fn current_thread_id() -> Option<i32> {
    Some(nix::unistd::gettid().as_raw())
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn current_thread_id() -> Option<i32> {
    None
}

/// Apply `priority` to the thread `tid`
#[cfg(target_os = "linux")]
pub(crate) fn apply(tid: i32, priority: Priority) -> Result<(), String> {
    // SAFETY: setpriority only reads its integer arguments
    let rc = unsafe {
        nix::libc::setpriority(
            nix::libc::PRIO_PROCESS,
            tid as nix::libc::id_t,
            nice_for(priority),
        )
    };
    if rc == 0 {
        Ok(())
    } else {
        Err(nix::errno::Errno::last().to_string())
    }
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn apply(_tid: i32, _priority: Priority) -> Result<(), String> {
    Ok(())
}
