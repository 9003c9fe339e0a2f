//! Public entry point for running work with memory-aware autoscaled concurrency.
//!
//! # Example
//!
//! ```rust,ignore
//! use autoscaled_pool::config::AutoscaledPoolConfig;
//! use autoscaled_pool::core::{AutoscaledPool, NextWork};
//! use autoscaled_pool::infra::SystemMemoryMonitor;
//!
//! let urls = std::sync::Arc::new(parking_lot::Mutex::new(seed_urls()));
//! let queue = urls.clone();
//! let source = move || match queue.lock().pop() {
//!     Some(url) => Ok(NextWork::from_future(crawl(url))),
//!     None => Ok(NextWork::Empty),
//! };
//!
//! let pool = AutoscaledPool::new(
//!     AutoscaledPoolConfig::new().with_concurrency(2, 50),
//!     source,
//!     SystemMemoryMonitor::new(),
//! )?;
//! let stats = pool.run().await?;
//! ```

use std::sync::Arc;

use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::AutoscaledPoolConfig;
use crate::core::scheduler::SchedulingLoop;
use crate::core::{CompletionPredicate, PoolError, PoolStats, ResourceMonitor, WorkSource};

/// Runs units of work from a [`WorkSource`] with concurrency tuned against
/// memory pressure reported by a [`ResourceMonitor`].
///
/// A pool performs exactly one run; [`AutoscaledPool::run`] consumes it.
pub struct AutoscaledPool {
    config: AutoscaledPoolConfig,
    source: Box<dyn WorkSource>,
    monitor: Arc<dyn ResourceMonitor>,
    completion: Option<Arc<dyn CompletionPredicate>>,
    stats_tx: watch::Sender<PoolStats>,
}

impl AutoscaledPool {
    /// Create a pool.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidConfig` if the configuration is invalid.
    pub fn new<S, M>(config: AutoscaledPoolConfig, source: S, monitor: M) -> Result<Self, PoolError>
    where
        S: WorkSource + 'static,
        M: ResourceMonitor + 'static,
    {
        Self::from_parts(config, Box::new(source), Arc::new(monitor), None)
    }

    pub(crate) fn from_parts(
        config: AutoscaledPoolConfig,
        source: Box<dyn WorkSource>,
        monitor: Arc<dyn ResourceMonitor>,
        completion: Option<Arc<dyn CompletionPredicate>>,
    ) -> Result<Self, PoolError> {
        config.validate().map_err(PoolError::InvalidConfig)?;

        let (stats_tx, _) = watch::channel(PoolStats {
            concurrency: config.min_concurrency,
            min_concurrency: config.min_concurrency,
            max_concurrency: config.max_concurrency,
            ..PoolStats::default()
        });

        Ok(Self {
            config,
            source,
            monitor,
            completion,
            stats_tx,
        })
    }

    /// Attach a completion predicate that decides when an idle pool is done.
    #[must_use]
    pub fn with_completion_predicate<C>(mut self, predicate: C) -> Self
    where
        C: CompletionPredicate + 'static,
    {
        self.completion = Some(Arc::new(predicate));
        self
    }

    /// Configuration the pool was built with.
    #[must_use]
    pub const fn config(&self) -> &AutoscaledPoolConfig {
        &self.config
    }

    /// Subscribe to pool statistics, updated as work starts, settles and scales.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PoolStats> {
        self.stats_tx.subscribe()
    }

    /// Run until all work is drained.
    ///
    /// Work is spawned onto the current tokio runtime, so this must be called
    /// from within one.
    ///
    /// # Errors
    ///
    /// Returns the first failure of any unit of work (or of the completion
    /// predicate) once every operation already running has settled. Work not
    /// yet started is abandoned.
    pub async fn run(self) -> Result<PoolStats, PoolError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("autoscaled_pool", %run_id);

        SchedulingLoop::new(
            self.config,
            self.source,
            self.monitor,
            self.completion,
            self.stats_tx,
        )
        .drive()
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for AutoscaledPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoscaledPool")
            .field("config", &self.config)
            .field("has_completion_predicate", &self.completion.is_some())
            .finish_non_exhaustive()
    }
}
