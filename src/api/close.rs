/*!
 * Auto-Close
 * Resources closed in order once their owner is gone
 */

use crate::core::errors::CleanupFailure;
use crate::core::types::Identity;
use crate::exceptions::ExceptionChain;
use crate::phantom::Payload;
use std::io;
use std::sync::Arc;
use tracing::trace;

/// A resource that can be released explicitly
///
/// `close` takes `&self` so shared resources (`Arc<T>`) can be closed from
/// the cleanup thread while other holders still exist.
pub trait Close: Send + 'static {
    fn close(&self) -> io::Result<()>;

    /// Address identity, compared against the owner to reject self-closing
    fn identity(&self) -> Option<Identity> {
        None
    }
}

impl<T: Close + Sync> Close for Arc<T> {
    fn close(&self) -> io::Result<()> {
        (**self).close()
    }

    fn identity(&self) -> Option<Identity> {
        Some(Arc::as_ptr(self) as *const () as Identity)
    }
}

impl<T: Close + ?Sized> Close for Box<T> {
    fn close(&self) -> io::Result<()> {
        (**self).close()
    }

    fn identity(&self) -> Option<Identity> {
        (**self).identity()
    }
}

/// Ordered list of resources used as an auto-close payload
pub struct Resources<R> {
    items: Vec<R>,
}

impl<R: Close> Resources<R> {
    pub(crate) fn new(items: Vec<R>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether any resource has the given identity
    pub(crate) fn contains(&self, identity: Identity) -> bool {
        self.items
            .iter()
            .any(|item| item.identity() == Some(identity))
    }

    /// Close every resource in list order
    ///
    /// A failing resource does not stop the ones after it; each failure goes
    /// to `chain`. Returns the number of failures.
    pub fn close_all(self, chain: &ExceptionChain) -> usize {
        let mut failures = 0;
        for (index, item) in self.items.into_iter().enumerate() {
            match item.close() {
                Ok(()) => trace!(index, "Resource closed"),
                Err(source) => {
                    failures += 1;
                    let _ = chain.dispatch(&CleanupFailure::CloseFailed { index, source });
                }
            }
        }
        failures
    }
}

impl<R: Close> Payload for Resources<R> {}

impl<R> std::fmt::Debug for Resources<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resources")
            .field("count", &self.items.len())
            .finish()
    }
}
