/*!
 * Handle Registry
 * The live set of outstanding cleanup handles
 */

use crate::core::types::{HandleId, HandleState};
use crate::phantom::{AnchorCell, PhantomHandle};
use ahash::HashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Weak;

struct Entry {
    handle: PhantomHandle,
    /// Bookkeeping link to the owner; never keeps it alive
    owner: Weak<AnchorCell>,
}

/// Identity-keyed map of pending handles behind a single lock
///
/// The registry is the only strong holder of each handle. A handle stays
/// here from registration until a consumer removes it, and removal happens
/// exactly once, so each handle fires at most once.
pub struct Registry {
    entries: Mutex<HashMap<HandleId, Entry>>,
    registered: AtomicU64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::default()),
            registered: AtomicU64::new(0),
        }
    }

    pub(crate) fn insert(&self, handle: PhantomHandle, owner: Weak<AnchorCell>) {
        let id = handle.id();
        self.entries.lock().insert(id, Entry { handle, owner });
        self.registered.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a handle out for firing; `None` if it was already taken
    pub(crate) fn remove(&self, id: HandleId) -> Option<PhantomHandle> {
        self.entries.lock().remove(&id).map(|entry| entry.handle)
    }

    /// Lifecycle state of a handle; unknown ids count as fired
    pub fn state_of(&self, id: HandleId) -> HandleState {
        match self.entries.lock().get(&id) {
            Some(entry) if entry.owner.strong_count() > 0 => HandleState::Pending,
            Some(_) => HandleState::Ready,
            None => HandleState::Fired,
        }
    }

    /// Handles not fired yet
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handles whose owner has been dropped but which have not fired yet
    pub fn ready(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|entry| entry.owner.strong_count() == 0)
            .count()
    }

    /// Total registrations ever accepted
    pub fn registered(&self) -> u64 {
        self.registered.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("pending", &self.len())
            .field("registered", &self.registered())
            .finish()
    }
}
