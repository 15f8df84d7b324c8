/*!
 * Shutdown Coordinator
 * Best-effort draining at exit and synchronous flushing of ready handles
 */

use super::exit_hook;
use crate::daemon::{Cleaner, DrainPolicy};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of an exit drain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainReport {
    /// Collection rounds performed
    pub rounds: u32,
    /// Handles fired by the drain itself
    pub fired: usize,
    /// Handles still registered afterwards
    pub remaining: usize,
}

impl Cleaner {
    /// Toggle whether this cleaner drains ready handles at shutdown
    ///
    /// For the process-wide cleaner the first enable installs a one-shot
    /// exit hook; other cleaners drain when they are dropped.
    pub fn set_run_on_exit(&self, enabled: bool) {
        self.core.run_on_exit.store(enabled, Ordering::SeqCst);
        self.arm_exit_hook();
        debug!(enabled, "Run-on-exit updated");
    }

    pub fn runs_on_exit(&self) -> bool {
        self.core.run_on_exit.load(Ordering::SeqCst)
    }

    /// Whether the process exit hook will drain this cleaner
    pub fn exit_hook_installed(&self) -> bool {
        self.is_global() && exit_hook::is_installed()
    }

    /// Install the exit hook if this is the process-wide cleaner and it runs on exit
    pub(crate) fn arm_exit_hook(&self) {
        if self.runs_on_exit() && self.is_global() && !exit_hook::install() {
            warn!("Exit hook unavailable, cleanups will not run at exit");
        }
    }

    /// Wait until every handle that is ready right now has fired
    ///
    /// Does not force collection and ignores handles that become ready after
    /// the call starts. Polls with bounded backoff and returns `false` if the
    /// bound ran out first. Without a daemon the calling thread fires the
    /// handles itself. Called from inside one of this cleaner's actions it
    /// returns `false` at once, since the running action holds back the flush.
    pub fn run_cleanup_now(&self) -> bool {
        if self.core.is_firing() {
            debug!("Flush requested from a running cleanup action, not waiting");
            return false;
        }

        let channel = &self.core.channel;
        let target = channel.enqueued();
        let policy = &self.core.config.flush;
        let mut backoff = policy.initial_backoff;

        for _ in 0..policy.max_attempts {
            if !self.has_daemon() {
                self.core.drain_ready();
            }
            if channel.consumed() >= target {
                return true;
            }
            thread::sleep(backoff);
            backoff = policy.next_backoff(backoff);
        }

        let done = channel.consumed() >= target;
        if !done {
            warn!(
                target,
                consumed = channel.consumed(),
                "Flush gave up before all ready handles fired"
            );
        }
        done
    }

    /// Force collection and fire newly ready handles directly, in bounded rounds
    ///
    /// Stops early once nothing is registered. Purely best effort: handles
    /// whose owners are still alive stay pending. Called from inside one of
    /// this cleaner's actions it fires nothing.
    pub fn drain_on_exit(&self, policy: &DrainPolicy) -> DrainReport {
        let started = Instant::now();
        let mut report = DrainReport::default();

        if self.core.is_firing() {
            report.remaining = self.core.registry.len();
            warn!(
                remaining = report.remaining,
                "Exit drain skipped inside a running cleanup action"
            );
            return report;
        }

        for _ in 0..policy.rounds {
            report.rounds += 1;
            self.core.collector.collect();
            thread::sleep(policy.settle);
            report.fired += self.core.drain_ready();
            if self.core.registry.is_empty() {
                break;
            }
        }

        report.remaining = self.core.registry.len();
        info!(
            rounds = report.rounds,
            fired = report.fired,
            remaining = report.remaining,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Exit drain finished"
        );
        report
    }
}
