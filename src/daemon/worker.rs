/*!
 * Cleanup Daemon
 * The single background worker consuming the notification channel
 */

use super::cleaner::{CleanerCore, Flow};
use crate::core::errors::{CleanupError, CleanupFailure};
use crate::core::types::CleanupResult;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::info;

/// Start the daemon thread for `core`
pub(crate) fn spawn(core: Arc<CleanerCore>) -> CleanupResult<JoinHandle<()>> {
    thread::Builder::new()
        .name(core.config.thread_name.clone())
        .spawn(move || run(core))
        .map_err(|e| CleanupError::DaemonSpawn(e.to_string()))
}

/// Consume signals until shutdown
///
/// Action and handler failures never end the loop; only a shutdown request
/// or a broken channel does.
fn run(core: Arc<CleanerCore>) {
    core.daemon_started();
    info!(thread = %core.config.thread_name, "Cleanup daemon started");

    loop {
        let flow = match core.channel.recv() {
            Ok(signal) => core.consume(signal),
            Err(e) => {
                core.report(&CleanupFailure::Channel(e.to_string()));
                Flow::Stop
            }
        };
        if flow == Flow::Stop {
            break;
        }
    }

    info!(thread = %core.config.thread_name, "Cleanup daemon stopped");
}
