/*!
 * Phantom Handles
 * One cleanup action bound to its payload, tied to an owner by id only
 */

use super::payload::Payload;
use crate::core::errors::panic_message;
use crate::core::types::{HandleId, Identity};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

type BoundAction = Box<dyn FnOnce() + Send>;

/// A pending cleanup
///
/// Holds no reference to the owner. The registry is the only strong holder
/// until a consumer removes and runs it.
pub struct PhantomHandle {
    id: HandleId,
    action: BoundAction,
    identity: Option<Identity>,
    payload_type: &'static str,
    registered_at: Instant,
}

impl PhantomHandle {
    pub(crate) fn new<V, F>(action: F, payload: V) -> Self
    where
        V: Payload,
        F: FnOnce(V) + Send + 'static,
    {
        let identity = payload.identity();
        Self {
            id: HandleId::next(),
            action: Box::new(move || action(payload)),
            identity,
            payload_type: std::any::type_name::<V>(),
            registered_at: Instant::now(),
        }
    }

    #[inline]
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Identity of the payload, used for payload-scoped locking
    #[inline]
    pub fn identity(&self) -> Option<Identity> {
        self.identity
    }

    #[inline]
    pub fn payload_type(&self) -> &'static str {
        self.payload_type
    }

    /// Time since registration
    pub fn age(&self) -> Duration {
        self.registered_at.elapsed()
    }

    /// Run the action, consuming the handle
    ///
    /// A panic in the action is caught and returned as its message.
    pub(crate) fn run(self) -> Result<(), String> {
        let action = self.action;
        catch_unwind(AssertUnwindSafe(action)).map_err(|panic| panic_message(panic.as_ref()))
    }
}

impl std::fmt::Debug for PhantomHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhantomHandle")
            .field("id", &self.id)
            .field("identity", &self.identity)
            .field("payload_type", &self.payload_type)
            .finish()
    }
}
