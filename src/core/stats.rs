//! Pool statistics published while a run is in progress.

use serde::{Deserialize, Serialize};

/// Snapshot of pool state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Allowed concurrency. Never below `running`: after a scale-down the
    /// excess operations keep their slots until they settle.
    pub concurrency: usize,
    /// Operations currently in flight.
    pub running: usize,
    /// Lower concurrency bound.
    pub min_concurrency: usize,
    /// Upper concurrency bound.
    pub max_concurrency: usize,
    /// Operations started so far.
    pub started_tasks: u64,
    /// Operations that settled successfully.
    pub completed_tasks: u64,
    /// Operations that settled with an error, including discarded ones.
    pub failed_tasks: u64,
    /// Scheduling loop ticks elapsed.
    pub ticks: u64,
    /// Free memory ratio of the latest accepted sample.
    pub last_free_ratio: Option<f64>,
}

impl PoolStats {
    /// Whether the concurrency invariants hold for this snapshot.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.running <= self.concurrency
            && self.min_concurrency <= self.concurrency
            && self.concurrency <= self.max_concurrency
    }
}
