//! Builder assembling an autoscaled pool from configuration and collaborators.

use std::sync::Arc;

use crate::config::AutoscaledPoolConfig;
use crate::core::{AutoscaledPool, CompletionPredicate, PoolError, ResourceMonitor, WorkSource};
use crate::infra::monitor::{detect_monitor, SystemMemoryMonitor};

/// Builds an [`AutoscaledPool`], defaulting to host memory statistics when
/// no monitor is supplied.
pub struct AutoscaledPoolBuilder {
    config: AutoscaledPoolConfig,
    source: Option<Box<dyn WorkSource>>,
    monitor: Option<Arc<dyn ResourceMonitor>>,
    completion: Option<Arc<dyn CompletionPredicate>>,
}

impl AutoscaledPoolBuilder {
    /// Start a builder from configuration.
    #[must_use]
    pub fn new(config: AutoscaledPoolConfig) -> Self {
        Self {
            config,
            source: None,
            monitor: None,
            completion: None,
        }
    }

    /// Start a builder from a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidConfig` on parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, PoolError> {
        AutoscaledPoolConfig::from_json_str(input)
            .map(Self::new)
            .map_err(PoolError::InvalidConfig)
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &AutoscaledPoolConfig {
        &self.config
    }

    /// Set the work source.
    #[must_use]
    pub fn source<S>(mut self, source: S) -> Self
    where
        S: WorkSource + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Set the resource monitor.
    #[must_use]
    pub fn monitor<M>(mut self, monitor: M) -> Self
    where
        M: ResourceMonitor + 'static,
    {
        self.monitor = Some(Arc::new(monitor));
        self
    }

    /// Set a resource monitor shared with other components.
    #[must_use]
    pub fn shared_monitor(mut self, monitor: Arc<dyn ResourceMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Use the cgroup limit when running in a container, host memory otherwise.
    #[must_use]
    pub async fn detect_monitor(mut self) -> Self {
        self.monitor = Some(detect_monitor().await);
        self
    }

    /// Set the completion predicate.
    #[must_use]
    pub fn completion_predicate<C>(mut self, predicate: C) -> Self
    where
        C: CompletionPredicate + 'static,
    {
        self.completion = Some(Arc::new(predicate));
        self
    }

    /// Whether a completion predicate has been set.
    #[must_use]
    pub const fn has_completion_predicate(&self) -> bool {
        self.completion.is_some()
    }

    /// Build the pool.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidConfig` if no work source was set or the
    /// configuration is invalid.
    pub fn build(self) -> Result<AutoscaledPool, PoolError> {
        let source = self
            .source
            .ok_or_else(|| PoolError::InvalidConfig("work source is required".into()))?;
        let monitor = self
            .monitor
            .unwrap_or_else(|| Arc::new(SystemMemoryMonitor::new()));
        AutoscaledPool::from_parts(self.config, source, monitor, self.completion)
    }
}

impl std::fmt::Debug for AutoscaledPoolBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoscaledPoolBuilder")
            .field("config", &self.config)
            .field("has_source", &self.source.is_some())
            .field("has_monitor", &self.monitor.is_some())
            .field("has_completion_predicate", &self.completion.is_some())
            .finish()
    }
}
