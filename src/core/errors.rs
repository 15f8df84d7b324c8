/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::{HandleId, Identity};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Registration and configuration errors, returned to the calling thread
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum CleanupError {
    #[error("Payload is the owner itself (identity {owner:#x})")]
    #[diagnostic(
        code(cleanup::self_reference),
        help("The payload keeps the owner alive, so the cleanup could never run. Pass the owner's resources instead of the owner.")
    )]
    SelfReference { owner: Identity },

    #[error("Payload type {payload} may hold a reference to owner type {owner}: {reason}")]
    #[diagnostic(
        code(cleanup::leak_suspected),
        help("Declare the payload as a top-level or static nested type that does not capture the owner.")
    )]
    LeakSuspected {
        owner: String,
        payload: String,
        reason: LeakReason,
    },

    #[error("Required argument missing: {0}")]
    #[diagnostic(code(cleanup::null_argument))]
    NullArgument(String),

    #[error("Invalid daemon priority {0}")]
    #[diagnostic(
        code(cleanup::invalid_priority),
        help("Priority must be between MIN_PRIORITY (1) and MAX_PRIORITY (10).")
    )]
    InvalidPriority(i32),

    #[error("Failed to spawn cleanup daemon: {0}")]
    #[diagnostic(
        code(cleanup::daemon_spawn),
        help("Ready handles can still be flushed with run_cleanup_now().")
    )]
    DaemonSpawn(String),
}

/// Why the leak heuristic rejected a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeakReason {
    /// Anonymous type declared inside the owner type
    AnonymousInOwner,
    /// Non-static nested type of the owner type
    InnerOfOwner,
    /// Compiler-synthesized type such as a boxed closure
    Synthetic,
}

impl std::fmt::Display for LeakReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeakReason::AnonymousInOwner => write!(f, "anonymous type inside owner"),
            LeakReason::InnerOfOwner => write!(f, "inner type of owner"),
            LeakReason::Synthetic => write!(f, "synthetic type"),
        }
    }
}

/// Failures surfaced while processing cleanups, delivered to exception handlers
///
/// These never propagate out of the daemon.
#[derive(Error, Debug, Diagnostic)]
pub enum CleanupFailure {
    #[error("Cleanup action of {handle} panicked: {message}")]
    #[diagnostic(code(cleanup::action_failure))]
    ActionPanicked { handle: HandleId, message: String },

    #[error("Closing resource #{index} failed: {source}")]
    #[diagnostic(code(cleanup::close_failed))]
    CloseFailed {
        index: usize,
        #[source]
        source: io::Error,
    },

    #[error("Cleanup daemon was interrupted")]
    #[diagnostic(
        code(cleanup::interrupted),
        help("The daemon keeps running after an interruption.")
    )]
    Interrupted,

    #[error("Notification channel failure: {0}")]
    #[diagnostic(code(cleanup::channel))]
    Channel(String),
}

impl CleanupFailure {
    /// Handle whose action produced this failure, if any
    pub fn handle(&self) -> Option<HandleId> {
        match self {
            CleanupFailure::ActionPanicked { handle, .. } => Some(*handle),
            _ => None,
        }
    }
}

/// An exception handler panicked, truncating the rest of that dispatch
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[error("Exception handler #{index} panicked: {message}")]
#[diagnostic(
    code(cleanup::handler_failure),
    help("Handlers registered after this one did not see the failure.")
)]
pub struct HandlerFailure {
    pub index: usize,
    pub message: String,
}

/// Extract a readable message from a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
