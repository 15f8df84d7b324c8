/*!
 * Cleaner Statistics
 */

use serde::{Deserialize, Serialize};

/// Snapshot of a cleaner's counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CleanerStats {
    /// Registrations accepted
    pub registered: u64,
    /// Handles not fired yet
    pub pending: usize,
    /// Pending handles whose owner is gone
    pub ready: usize,
    /// Ready signals produced by owner drops
    pub enqueued: u64,
    /// Ready signals processed
    pub consumed: u64,
    /// Actions executed
    pub fired: u64,
    /// Actions that panicked
    pub action_failures: u64,
    /// Dispatches truncated by a panicking handler
    pub handler_failures: u64,
}

impl CleanerStats {
    /// Ready signals not processed yet
    pub fn backlog(&self) -> u64 {
        self.enqueued.saturating_sub(self.consumed)
    }

    /// Serialize as JSON for logs and diagnostics
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
