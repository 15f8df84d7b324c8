/*!
 * Notification Channel
 * Queue of ready handles fed by owner drops
 */

use crate::core::types::HandleId;
use flume::{Receiver, RecvError, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Message delivered to channel consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The owner of this handle has been dropped
    Ready(HandleId),
    /// Wake the daemon; reported to the exception chain, then ignored
    Interrupt,
    /// Stop the daemon loop
    Shutdown,
}

/// Multi-producer, multi-consumer queue of signals
///
/// Producers are anchor drops. The daemon is the regular consumer; drains
/// may consume concurrently, which is safe because each handle is removed
/// from the registry exactly once. `enqueued` and `consumed` count `Ready`
/// signals and form the readiness signal polled by flushes.
#[derive(Debug)]
pub struct NotificationChannel {
    tx: Sender<Signal>,
    rx: Receiver<Signal>,
    enqueued: AtomicU64,
    consumed: AtomicU64,
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationChannel {
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            tx,
            rx,
            enqueued: AtomicU64::new(0),
            consumed: AtomicU64::new(0),
        }
    }

    /// Enqueue a ready handle
    pub(crate) fn notify_ready(&self, handle: HandleId) {
        // Counted before sending so `consumed` can never overtake `enqueued`
        self.enqueued.fetch_add(1, Ordering::SeqCst);
        self.send(Signal::Ready(handle));
        trace!(%handle, "Handle enqueued as ready");
    }

    pub(crate) fn interrupt(&self) {
        self.send(Signal::Interrupt);
    }

    pub(crate) fn shutdown(&self) {
        self.send(Signal::Shutdown);
    }

    fn send(&self, signal: Signal) {
        // The channel owns its own receiver, so it cannot be disconnected
        let _ = self.tx.send(signal);
    }

    /// Block until a signal arrives
    pub(crate) fn recv(&self) -> Result<Signal, RecvError> {
        self.rx.recv()
    }

    /// Take a signal if one is queued
    pub(crate) fn try_recv(&self) -> Option<Signal> {
        self.rx.try_recv().ok()
    }

    /// Record that a `Ready` signal has been fully processed
    pub(crate) fn mark_consumed(&self) {
        self.consumed.fetch_add(1, Ordering::SeqCst);
    }

    /// Total `Ready` signals enqueued so far
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::SeqCst)
    }

    /// Total `Ready` signals processed so far
    pub fn consumed(&self) -> u64 {
        self.consumed.load(Ordering::SeqCst)
    }

    /// Signals currently waiting in the queue
    pub fn backlog(&self) -> usize {
        self.rx.len()
    }
}
