/*!
 * Exception Chain
 * Ordered, append-only handler list for failures raised during cleanup
 */

use crate::core::errors::{panic_message, CleanupFailure, HandlerFailure};
use arc_swap::ArcSwap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// A registered exception handler
pub type ExceptionHandler = Arc<dyn Fn(&CleanupFailure) + Send + Sync>;

/// Process-wide chain of exception handlers
///
/// Handlers run in registration order. A handler that panics stops the
/// dispatch: handlers after it do not see that failure. Reads are lock-free;
/// appends use clone-modify-swap since handlers are added rarely.
pub struct ExceptionChain {
    handlers: ArcSwap<Vec<ExceptionHandler>>,
    dispatched: AtomicU64,
    truncated: AtomicU64,
}

impl Default for ExceptionChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ExceptionChain {
    /// Create an empty (no-op) chain
    pub fn new() -> Self {
        Self {
            handlers: ArcSwap::from_pointee(Vec::new()),
            dispatched: AtomicU64::new(0),
            truncated: AtomicU64::new(0),
        }
    }

    /// Append a handler after all previously added handlers
    pub fn add_handler<F>(&self, handler: F)
    where
        F: Fn(&CleanupFailure) + Send + Sync + 'static,
    {
        let handler: ExceptionHandler = Arc::new(handler);
        self.handlers.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(Arc::clone(&handler));
            next
        });
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a failure to every handler in order
    ///
    /// Returns the number of handlers that completed, or the failure of the
    /// handler that panicked and cut the dispatch short.
    pub fn dispatch(&self, failure: &CleanupFailure) -> Result<usize, HandlerFailure> {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        let handlers = self.handlers.load_full();

        for (index, handler) in handlers.iter().enumerate() {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| handler(failure))) {
                self.truncated.fetch_add(1, Ordering::Relaxed);
                let truncation = HandlerFailure {
                    index,
                    message: panic_message(panic.as_ref()),
                };
                warn!(
                    handler = index,
                    skipped = handlers.len() - index - 1,
                    error = %truncation,
                    "Exception handler panicked, dispatch truncated"
                );
                return Err(truncation);
            }
        }

        Ok(handlers.len())
    }

    /// Total dispatches performed
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Dispatches cut short by a panicking handler
    pub fn truncated(&self) -> u64 {
        self.truncated.load(Ordering::Relaxed)
    }

    /// Ready-made handler that reports failures through `tracing`
    pub fn logging() -> impl Fn(&CleanupFailure) + Send + Sync + 'static {
        |failure: &CleanupFailure| match failure.handle() {
            Some(handle) => warn!(%handle, error = %failure, "Cleanup failed"),
            None => warn!(error = %failure, "Cleanup failed"),
        }
    }
}

impl std::fmt::Debug for ExceptionChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExceptionChain")
            .field("handlers", &self.len())
            .field("dispatched", &self.dispatched())
            .field("truncated", &self.truncated())
            .finish()
    }
}
