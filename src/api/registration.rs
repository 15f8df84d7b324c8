/*!
 * Registration
 * Validating and installing cleanups against an owner
 */

use super::close::{Close, Resources};
use super::owner::Cleanup;
use crate::core::errors::CleanupError;
use crate::core::types::{CleanupResult, HandleId};
use crate::daemon::Cleaner;
use crate::phantom::{Payload, PhantomHandle};
use std::sync::Arc;
use tracing::{debug, trace};

impl Cleaner {
    /// Run `action(payload)` once `owner` has been dropped
    ///
    /// Rejects a payload that is the owner itself and payload types the leak
    /// heuristic flags as capturing the owner. Composite payloads are checked
    /// component by component. Nothing is registered on error.
    pub fn register<O, V, F>(&self, owner: &O, action: F, payload: V) -> CleanupResult<HandleId>
    where
        O: Cleanup,
        V: Payload,
        F: FnOnce(V) + Send + 'static,
    {
        let owner_identity = owner.owner_identity();
        if payload.identity() == Some(owner_identity) {
            return Err(CleanupError::SelfReference {
                owner: owner_identity,
            });
        }

        let owner_shape = self.core.shapes.owner_shape::<O>(O::shape);
        let payload_shapes = self.core.shapes.payload_shapes::<V>(V::shapes);
        for payload_shape in payload_shapes.iter() {
            if let Some(reason) = self.core.heuristic.classify(&owner_shape, payload_shape) {
                debug!(
                    owner = owner_shape.name(),
                    payload = payload_shape.name(),
                    %reason,
                    "Rejected suspect payload"
                );
                return Err(CleanupError::LeakSuspected {
                    owner: owner_shape.name().to_string(),
                    payload: payload_shape.name().to_string(),
                    reason,
                });
            }
        }

        Ok(self.install(owner, PhantomHandle::new(action, payload)))
    }

    /// Run `action()` once `owner` has been dropped
    ///
    /// There is no payload, so the leak check is skipped. The closure's
    /// captures must still not include the owner.
    pub fn register_action<O, F>(&self, owner: &O, action: F) -> CleanupResult<HandleId>
    where
        O: Cleanup,
        F: FnOnce() + Send + 'static,
    {
        Ok(self.install(owner, PhantomHandle::new(move |()| action(), ())))
    }

    /// Close `resources` in the given order once `owner` has been dropped
    ///
    /// Pass resources in the opposite order of their creation. A resource
    /// that fails to close is reported to the exception chain and the rest
    /// are still closed.
    pub fn register_auto_close<O, R, I>(&self, owner: &O, resources: I) -> CleanupResult<HandleId>
    where
        O: Cleanup,
        R: Close,
        I: IntoIterator<Item = R>,
    {
        let resources = Resources::new(resources.into_iter().collect());
        if resources.is_empty() {
            return Err(CleanupError::NullArgument("resources".to_string()));
        }

        let owner_identity = owner.owner_identity();
        if resources.contains(owner_identity) {
            return Err(CleanupError::SelfReference {
                owner: owner_identity,
            });
        }

        let chain = Arc::clone(&self.core.chain);
        let action = move |resources: Resources<R>| {
            resources.close_all(&chain);
        };
        Ok(self.install(owner, PhantomHandle::new(action, resources)))
    }

    /// Store the handle and arm the owner's anchor
    fn install<O: Cleanup>(&self, owner: &O, handle: PhantomHandle) -> HandleId {
        let id = handle.id();
        let anchor = owner.anchor();
        self.core.registry.insert(handle, anchor.downgrade());
        anchor.watch(id, &self.core.channel);
        trace!(handle = %id, anchor = %anchor.id(), "Cleanup registered");
        id
    }
}
