//! Resource monitor contract consumed by the concurrency controller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::MonitorError;

/// Point-in-time memory statistics for the host process group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryInfo {
    /// Memory available to the process group, in bytes.
    pub total_bytes: u64,
    /// Memory not in use, in bytes.
    pub free_bytes: u64,
    /// Memory in use, in bytes.
    pub used_bytes: u64,
}

impl MemoryInfo {
    /// Build a sample from total and used bytes.
    #[must_use]
    pub const fn from_used(total_bytes: u64, used_bytes: u64) -> Self {
        Self {
            total_bytes,
            free_bytes: total_bytes.saturating_sub(used_bytes),
            used_bytes,
        }
    }

    /// Fraction of total memory that is free, `0.0` when total is unknown.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn free_ratio(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.free_bytes as f64 / self.total_bytes as f64
    }
}

/// Source of memory statistics.
///
/// Failures are absorbed by the pool: the tick proceeds with the samples it
/// already has.
#[async_trait]
pub trait ResourceMonitor: Send + Sync {
    /// Take a fresh memory sample.
    async fn sample(&self) -> Result<MemoryInfo, MonitorError>;
}
