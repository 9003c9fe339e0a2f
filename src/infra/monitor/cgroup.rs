//! Container memory statistics from the cgroup filesystem.
//!
//! Supports the unified (v2) hierarchy (`memory.max`, `memory.current`) and
//! the legacy (v1) memory controller (`memory/memory.limit_in_bytes`,
//! `memory/memory.usage_in_bytes`). Without a finite limit the host total is
//! used instead.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{MemoryInfo, MonitorError, ResourceMonitor};
use crate::infra::monitor::SystemMemoryMonitor;

/// Default cgroup filesystem mount point.
pub const DEFAULT_CGROUP_ROOT: &str = "/sys/fs/cgroup";

/// v1 reports "unlimited" as a page-aligned `i64::MAX`; anything this large is no limit.
const UNLIMITED_THRESHOLD: u64 = 1 << 60;

/// Cgroup hierarchy flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CgroupVersion {
    /// Legacy per-controller hierarchy.
    V1,
    /// Unified hierarchy.
    V2,
}

/// Samples memory usage against the container's cgroup limit.
#[derive(Debug, Clone)]
pub struct CgroupMemoryMonitor {
    root: PathBuf,
    version: CgroupVersion,
    host: SystemMemoryMonitor,
}

impl CgroupMemoryMonitor {
    /// Detect the cgroup version under [`DEFAULT_CGROUP_ROOT`].
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Unavailable` if no memory controller is mounted.
    pub async fn detect() -> Result<Self, MonitorError> {
        Self::detect_at(DEFAULT_CGROUP_ROOT).await
    }

    /// Detect the cgroup version under a custom root.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Unavailable` if no memory controller files exist.
    pub async fn detect_at(root: impl Into<PathBuf>) -> Result<Self, MonitorError> {
        let root = root.into();
        let version = if exists(&root.join("memory.max")).await {
            CgroupVersion::V2
        } else if exists(&root.join("memory").join("memory.limit_in_bytes")).await {
            CgroupVersion::V1
        } else {
            return Err(MonitorError::Unavailable(format!(
                "no cgroup memory controller under {}",
                root.display()
            )));
        };
        debug!(root = %root.display(), ?version, "Detected cgroup memory controller");
        Ok(Self {
            root,
            version,
            host: SystemMemoryMonitor::new(),
        })
    }

    /// Detected hierarchy flavour.
    #[must_use]
    pub const fn version(&self) -> CgroupVersion {
        self.version
    }

    /// Memory limit in bytes, `None` when unlimited.
    ///
    /// # Errors
    ///
    /// Returns an error if the limit file cannot be read or parsed.
    pub async fn limit_bytes(&self) -> Result<Option<u64>, MonitorError> {
        let raw = tokio::fs::read_to_string(self.limit_path()).await?;
        parse_limit(&raw)
    }

    /// Current memory usage in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the usage file cannot be read or parsed.
    pub async fn usage_bytes(&self) -> Result<u64, MonitorError> {
        let raw = tokio::fs::read_to_string(self.usage_path()).await?;
        parse_bytes(&raw)
    }

    fn limit_path(&self) -> PathBuf {
        match self.version {
            CgroupVersion::V2 => self.root.join("memory.max"),
            CgroupVersion::V1 => self.root.join("memory").join("memory.limit_in_bytes"),
        }
    }

    fn usage_path(&self) -> PathBuf {
        match self.version {
            CgroupVersion::V2 => self.root.join("memory.current"),
            CgroupVersion::V1 => self.root.join("memory").join("memory.usage_in_bytes"),
        }
    }
}

#[async_trait]
impl ResourceMonitor for CgroupMemoryMonitor {
    async fn sample(&self) -> Result<MemoryInfo, MonitorError> {
        let used = self.usage_bytes().await?;
        let total = match self.limit_bytes().await? {
            Some(limit) => limit,
            None => self.host.total_bytes().await?,
        };
        Ok(MemoryInfo::from_used(total, used))
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

fn parse_bytes(raw: &str) -> Result<u64, MonitorError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<u64>()
        .map_err(|e| MonitorError::Parse(format!("invalid byte count {trimmed:?}: {e}")))
}

fn parse_limit(raw: &str) -> Result<Option<u64>, MonitorError> {
    if raw.trim() == "max" {
        return Ok(None);
    }
    let limit = parse_bytes(raw)?;
    Ok((limit < UNLIMITED_THRESHOLD).then_some(limit))
}
