//! Error types for pool and monitor operations.

use thiserror::Error;

/// Errors produced by an autoscaled pool run.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Configuration rejected before any work started.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// First unit of work that failed; later failures are discarded.
    #[error("task failed: {0}")]
    TaskFailed(#[source] anyhow::Error),
    /// A unit of work panicked or was aborted by the runtime.
    #[error("task panicked: {0}")]
    TaskPanicked(String),
    /// The caller-supplied completion predicate failed.
    #[error("completion check failed: {0}")]
    CompletionCheck(#[source] anyhow::Error),
}

/// Errors produced by resource monitors. Never fatal to a run.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Reading a statistics source failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A statistics source held unexpected content.
    #[error("parse error: {0}")]
    Parse(String),
    /// The statistics source is not available on this host.
    #[error("monitor unavailable: {0}")]
    Unavailable(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
