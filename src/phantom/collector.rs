/*!
 * Collector Hook
 * Forcing "collection" of owners that are parked instead of dropped
 */

/// Releases owners that are unreachable but not yet dropped
///
/// Without a tracing collector every owner is dropped deterministically, so
/// there is nothing to force by default. Applications that defer drops
/// (pools, graveyards, deferred-destruction queues) implement this to flush
/// them; the exit drain calls it before polling for ready handles.
pub trait Collector: Send + Sync {
    fn collect(&self);
}

/// Collector with nothing to release
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCollector;

impl Collector for NoopCollector {
    fn collect(&self) {}
}

impl<F> Collector for F
where
    F: Fn() + Send + Sync,
{
    fn collect(&self) {
        self()
    }
}
