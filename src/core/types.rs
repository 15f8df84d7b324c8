/*!
 * Core Types
 * Common types used across the cleanup subsystem
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Daemon scheduling priority (1-10, higher is more important)
pub type Priority = u8;

/// Address identity of an object, used for identity comparisons only
pub type Identity = usize;

/// Common result type for registration and configuration operations
pub type CleanupResult<T> = Result<T, super::errors::CleanupError>;

/// Identifier of one registered cleanup handle
///
/// Ids are allocated from a process-wide counter and never reused, so a stale
/// id can never alias a newer registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandleId(u64);

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

impl HandleId {
    /// Allocate the next unused handle id
    pub(crate) fn next() -> Self {
        Self(NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle#{}", self.0)
    }
}

/// Identifier of one owner anchor (for diagnostics)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnchorId(u64);

static NEXT_ANCHOR_ID: AtomicU64 = AtomicU64::new(1);

impl AnchorId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ANCHOR_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor#{}", self.0)
    }
}

/// Lifecycle state of a cleanup handle
///
/// `Pending -> Ready -> Fired`, where `Fired` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleState {
    /// Registered, owner still alive
    Pending,
    /// Owner dropped, handle waiting to be consumed
    Ready,
    /// Action executed and handle removed (or id unknown)
    Fired,
}

impl fmt::Display for HandleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleState::Pending => write!(f, "pending"),
            HandleState::Ready => write!(f, "ready"),
            HandleState::Fired => write!(f, "fired"),
        }
    }
}
