/*!
 * Payload Locks
 * Striped mutual exclusion keyed by payload identity
 */

use crate::core::types::Identity;
use ahash::RandomState;
use parking_lot::{Mutex, MutexGuard};
use std::hash::BuildHasher;

/// Fixed set of lock stripes
///
/// Cleanups whose payloads share an identity map to the same stripe and so
/// never run at the same time, whichever thread consumes them. Unrelated
/// payloads may share a stripe, which only serializes them.
pub struct PayloadLocks {
    stripes: Box<[Mutex<()>]>,
    hasher: RandomState,
}

impl PayloadLocks {
    pub fn new(stripes: usize) -> Self {
        let stripes = stripes.max(1);
        Self {
            stripes: (0..stripes).map(|_| Mutex::new(())).collect(),
            hasher: RandomState::new(),
        }
    }

    /// Lock the stripe of `identity`; payloads without identity need no lock
    pub fn guard(&self, identity: Option<Identity>) -> Option<MutexGuard<'_, ()>> {
        identity.map(|id| self.stripes[self.stripe_of(id)].lock())
    }

    fn stripe_of(&self, identity: Identity) -> usize {
        (self.hasher.hash_one(identity) as usize) % self.stripes.len()
    }

    pub fn stripes(&self) -> usize {
        self.stripes.len()
    }
}

impl std::fmt::Debug for PayloadLocks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadLocks")
            .field("stripes", &self.stripes.len())
            .finish()
    }
}
