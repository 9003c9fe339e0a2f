//! Concrete resource monitors.

pub mod cgroup;
pub mod system;

use std::sync::Arc;

use tracing::{debug, info};

use crate::core::ResourceMonitor;

pub use cgroup::{CgroupMemoryMonitor, CgroupVersion, DEFAULT_CGROUP_ROOT};
pub use system::SystemMemoryMonitor;

/// Pick the cgroup monitor when the process runs under a finite cgroup
/// memory limit, otherwise the host-wide monitor.
pub async fn detect_monitor() -> Arc<dyn ResourceMonitor> {
    match CgroupMemoryMonitor::detect().await {
        Ok(monitor) => match monitor.limit_bytes().await {
            Ok(Some(limit)) => {
                info!(limit_bytes = limit, version = ?monitor.version(), "Using cgroup memory limit");
                return Arc::new(monitor);
            }
            Ok(None) => debug!("Cgroup has no memory limit"),
            Err(e) => debug!(error = %e, "Cgroup memory limit unreadable"),
        },
        Err(e) => debug!(error = %e, "No cgroup memory controller"),
    }
    info!("Using host memory statistics");
    Arc::new(SystemMemoryMonitor::new())
}
