/*!
 * Cleaner
 * The process-wide manager owning the registry, channel and daemon
 */

use super::config::CleanerConfig;
use super::priority;
use super::registry::Registry;
use super::stats::CleanerStats;
use super::worker;
use crate::core::errors::CleanupFailure;
use crate::core::types::{CleanupResult, HandleId, HandleState, Priority};
use crate::exceptions::ExceptionChain;
use crate::heuristic::{LeakHeuristic, ShapeCache, StructuralHeuristic};
use crate::phantom::{Collector, NoopCollector, NotificationChannel, PayloadLocks, Signal};
use parking_lot::Mutex;
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};

static GLOBAL: OnceLock<Cleaner> = OnceLock::new();

thread_local! {
    /// Cores with a cleanup action running on this thread, innermost last
    static FIRING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks a core as firing on the current thread until dropped
struct FiringGuard {
    core: usize,
}

impl FiringGuard {
    fn enter(core: &CleanerCore) -> Self {
        let core = core.address();
        FIRING.with(|firing| firing.borrow_mut().push(core));
        Self { core }
    }
}

impl Drop for FiringGuard {
    fn drop(&mut self) {
        FIRING.with(|firing| {
            let mut firing = firing.borrow_mut();
            if let Some(pos) = firing.iter().rposition(|&core| core == self.core) {
                firing.remove(pos);
            }
        });
    }
}

/// Whether a consumer should keep taking signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Stop,
}

/// State shared between the cleaner, its daemon and drains
pub(crate) struct CleanerCore {
    pub(crate) config: CleanerConfig,
    pub(crate) registry: Registry,
    pub(crate) channel: Arc<NotificationChannel>,
    pub(crate) chain: Arc<ExceptionChain>,
    pub(crate) shapes: ShapeCache,
    pub(crate) heuristic: Box<dyn LeakHeuristic>,
    pub(crate) collector: Box<dyn Collector>,
    locks: PayloadLocks,
    priority: AtomicU8,
    /// OS thread id of the daemon, 0 until it has started
    daemon_tid: AtomicI32,
    pub(crate) run_on_exit: AtomicBool,
    fired: AtomicU64,
    action_failures: AtomicU64,
}

impl CleanerCore {
    /// Process one signal taken from the channel
    pub(crate) fn consume(&self, signal: Signal) -> Flow {
        match signal {
            Signal::Ready(id) => {
                self.fire(id);
                self.channel.mark_consumed();
                Flow::Continue
            }
            Signal::Interrupt => {
                debug!("Cleanup daemon interrupted");
                self.report(&CleanupFailure::Interrupted);
                Flow::Continue
            }
            Signal::Shutdown => Flow::Stop,
        }
    }

    /// Remove a handle from the registry and run it
    ///
    /// Returns false when another consumer already took the handle.
    fn fire(&self, id: HandleId) -> bool {
        let Some(handle) = self.registry.remove(id) else {
            trace!(handle = %id, "Handle already fired, ignoring");
            return false;
        };

        let _payload_guard = self.locks.guard(handle.identity());
        let _firing = FiringGuard::enter(self);
        let age = handle.age();
        match handle.run() {
            Ok(()) => debug!(handle = %id, age_ms = age.as_millis() as u64, "Cleanup fired"),
            Err(message) => {
                self.action_failures.fetch_add(1, Ordering::Relaxed);
                self.report(&CleanupFailure::ActionPanicked {
                    handle: id,
                    message,
                });
            }
        }
        self.fired.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Route a failure to the exception chain
    pub(crate) fn report(&self, failure: &CleanupFailure) {
        // Truncation is already logged by the chain
        let _ = self.chain.dispatch(failure);
    }

    /// Consume every signal currently queued, without blocking
    ///
    /// Returns the number of ready signals processed. A shutdown request is
    /// put back for the daemon.
    pub(crate) fn drain_ready(&self) -> usize {
        let mut processed = 0;
        while let Some(signal) = self.channel.try_recv() {
            let is_ready = matches!(signal, Signal::Ready(_));
            if self.consume(signal) == Flow::Stop {
                self.channel.shutdown();
                break;
            }
            if is_ready {
                processed += 1;
            }
        }
        processed
    }

    fn address(&self) -> usize {
        self as *const Self as usize
    }

    /// Whether one of this core's actions is running on the calling thread
    ///
    /// Such a thread holds a payload stripe and must not fire other handles.
    pub(crate) fn is_firing(&self) -> bool {
        let core = self.address();
        FIRING.with(|firing| firing.borrow().contains(&core))
    }

    /// Called on the daemon thread before it starts consuming
    pub(crate) fn daemon_started(&self) {
        if let Some(tid) = priority::current_thread_id() {
            self.daemon_tid.store(tid, Ordering::SeqCst);
        }
        self.apply_priority();
    }

    fn apply_priority(&self) {
        let tid = self.daemon_tid.load(Ordering::SeqCst);
        if tid == 0 {
            return;
        }
        let priority = self.priority.load(Ordering::SeqCst);
        if let Err(e) = priority::apply(tid, priority) {
            warn!(priority, error = %e, "Could not apply daemon priority");
        }
    }
}

/// Builder for [`Cleaner`]
pub struct CleanerBuilder {
    config: CleanerConfig,
    heuristic: Box<dyn LeakHeuristic>,
    collector: Box<dyn Collector>,
}

impl Default for CleanerBuilder {
    fn default() -> Self {
        Self {
            config: CleanerConfig::default(),
            heuristic: Box::new(StructuralHeuristic),
            collector: Box::new(NoopCollector),
        }
    }
}

impl CleanerBuilder {
    pub fn config(mut self, config: CleanerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the leak heuristic
    pub fn heuristic(mut self, heuristic: impl LeakHeuristic + 'static) -> Self {
        self.heuristic = Box::new(heuristic);
        self
    }

    /// Hook run by the exit drain to release parked owners
    pub fn collector(mut self, collector: impl Collector + 'static) -> Self {
        self.collector = Box::new(collector);
        self
    }

    fn into_core(self) -> Arc<CleanerCore> {
        Arc::new(CleanerCore {
            locks: PayloadLocks::new(self.config.lock_stripes),
            priority: AtomicU8::new(self.config.priority),
            run_on_exit: AtomicBool::new(self.config.run_on_exit),
            config: self.config,
            registry: Registry::new(),
            channel: Arc::new(NotificationChannel::new()),
            chain: Arc::new(ExceptionChain::new()),
            shapes: ShapeCache::new(),
            heuristic: self.heuristic,
            collector: self.collector,
            daemon_tid: AtomicI32::new(0),
            fired: AtomicU64::new(0),
            action_failures: AtomicU64::new(0),
        })
    }

    /// Build the cleaner and start its daemon
    pub fn build(self) -> CleanupResult<Cleaner> {
        let core = self.into_core();
        let daemon = worker::spawn(Arc::clone(&core))?;
        info!(
            thread = %core.config.thread_name,
            priority = core.config.priority,
            "Cleaner initialized"
        );
        Ok(Cleaner {
            core,
            daemon: Mutex::new(Some(daemon)),
        })
    }

    /// Build a cleaner without a daemon
    ///
    /// Ready handles only fire through `run_cleanup_now` or the exit drain.
    pub fn build_detached(self) -> Cleaner {
        Cleaner {
            core: self.into_core(),
            daemon: Mutex::new(None),
        }
    }
}

/// Manager of pending cleanups
///
/// Owns the registry, the notification channel, the exception chain and the
/// daemon thread. One process-wide instance is available through
/// [`Cleaner::global`]; independent instances can be built for isolation.
///
/// # Example
///
/// ```ignore
/// let cleaner = Cleaner::new()?;
/// let owner = Tracked::new(Buffer::new());
/// cleaner.register(&owner, |path: PathBuf| remove_scratch(path), scratch_path)?;
/// drop(owner);
/// cleaner.run_cleanup_now();
/// ```
pub struct Cleaner {
    pub(crate) core: Arc<CleanerCore>,
    daemon: Mutex<Option<JoinHandle<()>>>,
}

impl Cleaner {
    pub fn builder() -> CleanerBuilder {
        CleanerBuilder::default()
    }

    /// Cleaner with default configuration and a running daemon
    pub fn new() -> CleanupResult<Self> {
        Self::builder().build()
    }

    /// The process-wide cleaner, created on first use from the environment
    pub fn global() -> &'static Cleaner {
        let mut created = false;
        let global = GLOBAL.get_or_init(|| {
            created = true;
            let config = CleanerConfig::from_env();
            match Cleaner::builder().config(config.clone()).build() {
                Ok(cleaner) => cleaner,
                Err(e) => {
                    error!(error = %e, "Running global cleaner without a daemon");
                    Cleaner::builder().config(config).build_detached()
                }
            }
        });
        if created {
            // run_on_exit may come from the environment
            global.arm_exit_hook();
        }
        global
    }

    /// The process-wide cleaner if it has been created
    pub fn try_global() -> Option<&'static Cleaner> {
        GLOBAL.get()
    }

    pub(crate) fn is_global(&self) -> bool {
        GLOBAL.get().is_some_and(|global| std::ptr::eq(global, self))
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.core.config
    }

    /// Whether a daemon thread is consuming ready handles
    pub fn has_daemon(&self) -> bool {
        self.daemon.lock().is_some()
    }

    /// Append an exception handler to this cleaner's chain
    pub fn add_exception_handler<F>(&self, handler: F)
    where
        F: Fn(&CleanupFailure) + Send + Sync + 'static,
    {
        self.core.chain.add_handler(handler);
    }

    pub fn exception_chain(&self) -> &ExceptionChain {
        &self.core.chain
    }

    /// Change the daemon's scheduling priority
    pub fn set_priority(&self, priority: i32) -> CleanupResult<()> {
        let priority = priority::validate(priority)?;
        self.core.priority.store(priority, Ordering::SeqCst);
        self.core.apply_priority();
        debug!(priority, "Daemon priority updated");
        Ok(())
    }

    pub fn priority(&self) -> Priority {
        self.core.priority.load(Ordering::SeqCst)
    }

    /// Deliver an interruption to the daemon
    ///
    /// It is reported to the exception chain as [`CleanupFailure::Interrupted`];
    /// the daemon keeps running.
    pub fn interrupt(&self) {
        self.core.channel.interrupt();
    }

    pub fn state_of(&self, id: HandleId) -> HandleState {
        self.core.registry.state_of(id)
    }

    /// Handles that have not fired yet
    pub fn pending(&self) -> usize {
        self.core.registry.len()
    }

    pub fn stats(&self) -> CleanerStats {
        CleanerStats {
            registered: self.core.registry.registered(),
            pending: self.core.registry.len(),
            ready: self.core.registry.ready(),
            enqueued: self.core.channel.enqueued(),
            consumed: self.core.channel.consumed(),
            fired: self.core.fired.load(Ordering::Relaxed),
            action_failures: self.core.action_failures.load(Ordering::Relaxed),
            handler_failures: self.core.chain.truncated(),
        }
    }
}

impl Drop for Cleaner {
    fn drop(&mut self) {
        if self.runs_on_exit() {
            let report = self.drain_on_exit(&self.core.config.drain);
            debug!(fired = report.fired, rounds = report.rounds, "Drained cleaner on drop");
        }

        let Some(daemon) = self.daemon.get_mut().take() else {
            return;
        };
        self.core.channel.shutdown();
        // A cleaner dropped by one of its own actions cannot wait for itself
        if daemon.thread().id() == thread::current().id() {
            return;
        }
        if daemon.join().is_err() {
            error!("Cleanup daemon terminated abnormally");
        }
    }
}

impl std::fmt::Debug for Cleaner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cleaner")
            .field("stats", &self.stats())
            .field("daemon", &self.has_daemon())
            .finish()
    }
}
