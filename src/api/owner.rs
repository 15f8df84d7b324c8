/*!
 * Owners
 * Types whose drop triggers registered cleanups
 */

use super::close::Close;
use crate::core::types::{CleanupResult, HandleId, Identity};
use crate::daemon::Cleaner;
use crate::heuristic::TypeShape;
use crate::phantom::{Anchor, Payload};
use std::ops::{Deref, DerefMut};

/// An object that can have cleanup actions registered against it
///
/// Implementors embed an [`Anchor`]. Register cleanups at the end of
/// construction, once the object is fully valid. The provided methods use
/// the process-wide cleaner; use [`Cleaner::register`] for another instance.
pub trait Cleanup: 'static {
    fn anchor(&self) -> &Anchor;

    /// Declared shape of the owner type, checked against payload shapes
    fn shape() -> TypeShape
    where
        Self: Sized,
    {
        TypeShape::top_level::<Self>()
    }

    /// Address identity of this owner
    fn owner_identity(&self) -> Identity {
        self as *const Self as *const () as Identity
    }

    /// Run `action(payload)` after `self` is dropped
    ///
    /// The payload must not hold `self`. May be called any number of times;
    /// every call creates an independent handle.
    fn register_cleanup<V, F>(&self, action: F, payload: V) -> CleanupResult<HandleId>
    where
        Self: Sized,
        V: Payload,
        F: FnOnce(V) + Send + 'static,
    {
        Cleaner::global().register(self, action, payload)
    }

    /// Run `action()` after `self` is dropped
    fn register_cleanup_action<F>(&self, action: F) -> CleanupResult<HandleId>
    where
        Self: Sized,
        F: FnOnce() + Send + 'static,
    {
        Cleaner::global().register_action(self, action)
    }

    /// Close `resources` in the given order after `self` is dropped
    ///
    /// List them in the opposite order of their creation.
    fn register_auto_close<R, I>(&self, resources: I) -> CleanupResult<HandleId>
    where
        Self: Sized,
        R: Close,
        I: IntoIterator<Item = R>,
    {
        Cleaner::global().register_auto_close(self, resources)
    }
}

/// Attaches an anchor to any value, making it an owner
///
/// ```ignore
/// let buffer = Tracked::new(vec![0u8; 4096]);
/// cleaner.register_action(&buffer, || log_release())?;
/// drop(buffer); // cleanup becomes ready
/// ```
pub struct Tracked<T> {
    anchor: Anchor,
    value: T,
}

impl<T> Tracked<T> {
    pub fn new(value: T) -> Self {
        Self {
            anchor: Anchor::new(),
            value,
        }
    }
}

impl<T: 'static> Cleanup for Tracked<T> {
    fn anchor(&self) -> &Anchor {
        &self.anchor
    }

    // Payloads declared inside `T` are checked against `T`
    fn shape() -> TypeShape {
        TypeShape::top_level::<T>()
    }
}

impl<T: Send + Sync + 'static> Payload for Tracked<T> {}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Tracked<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracked")
            .field("anchor", &self.anchor.id())
            .field("value", &self.value)
            .finish()
    }
}
