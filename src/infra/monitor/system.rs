//! Host-wide memory statistics via `sysinfo`.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use sysinfo::System;

use crate::core::{MemoryInfo, MonitorError, ResourceMonitor};

/// Samples host memory. Available memory counts as free.
#[derive(Clone)]
pub struct SystemMemoryMonitor {
    system: Arc<Mutex<System>>,
}

impl SystemMemoryMonitor {
    /// Create a monitor with an empty `sysinfo` system handle.
    #[must_use]
    pub fn new() -> Self {
        Self {
            system: Arc::new(Mutex::new(System::new())),
        }
    }

    /// Total host memory in bytes, refreshed on each call.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Unavailable` if the refresh task fails.
    pub async fn total_bytes(&self) -> Result<u64, MonitorError> {
        Ok(self.sample().await?.total_bytes)
    }
}

impl Default for SystemMemoryMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SystemMemoryMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemMemoryMonitor").finish_non_exhaustive()
    }
}

#[async_trait]
impl ResourceMonitor for SystemMemoryMonitor {
    async fn sample(&self) -> Result<MemoryInfo, MonitorError> {
        let system = Arc::clone(&self.system);
        // Refreshing reads procfs synchronously.
        tokio::task::spawn_blocking(move || read_system_memory(&mut system.lock()))
            .await
            .map_err(|e| MonitorError::Unavailable(format!("memory refresh task failed: {e}")))?
    }
}

fn read_system_memory(system: &mut System) -> Result<MemoryInfo, MonitorError> {
    system.refresh_memory();
    let total = system.total_memory();
    if total == 0 {
        return Err(MonitorError::Unavailable("host reported zero total memory".into()));
    }
    let available = system.available_memory().min(total);
    Ok(MemoryInfo {
        total_bytes: total,
        free_bytes: available,
        used_bytes: total - available,
    })
}
