//! Scheduling loop driving an autoscaled pool run.
//!
//! One task owns all pool state. Units of work are spawned onto the tokio
//! runtime and tracked in a [`JoinSet`], so they settle in completion order
//! without blocking the loop. A fixed-interval tick re-polls the work source,
//! triggers memory sampling every N ticks and logs every M ticks. Settled
//! slots are refilled immediately rather than at the next tick.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::AutoscaledPoolConfig;
use crate::core::{
    CompletionPredicate, ConcurrencyController, MemoryInfo, MonitorError, NextWork, PoolError,
    PoolStats, ResourceMonitor, ScaleDecision, WorkSource,
};

/// Consecutive empty fill passes with nothing running after which the work
/// is considered exhausted when no completion predicate is supplied.
const EMPTY_PASSES_BEFORE_DRAIN: u32 = 2;

type SampleTask = JoinHandle<Result<MemoryInfo, MonitorError>>;

pub(crate) struct SchedulingLoop {
    config: AutoscaledPoolConfig,
    source: Box<dyn WorkSource>,
    monitor: Arc<dyn ResourceMonitor>,
    completion: Option<Arc<dyn CompletionPredicate>>,
    stats_tx: watch::Sender<PoolStats>,
    controller: ConcurrencyController,
    in_flight: JoinSet<anyhow::Result<()>>,
    sample_task: Option<SampleTask>,
    first_error: Option<PoolError>,
    empty_passes: u32,
    tick: u64,
    started: u64,
    completed: u64,
    failed: u64,
}

impl SchedulingLoop {
    pub(crate) fn new(
        config: AutoscaledPoolConfig,
        source: Box<dyn WorkSource>,
        monitor: Arc<dyn ResourceMonitor>,
        completion: Option<Arc<dyn CompletionPredicate>>,
        stats_tx: watch::Sender<PoolStats>,
    ) -> Self {
        let controller = ConcurrencyController::new(&config);
        Self {
            config,
            source,
            monitor,
            completion,
            stats_tx,
            controller,
            in_flight: JoinSet::new(),
            sample_task: None,
            first_error: None,
            empty_passes: 0,
            tick: 0,
            started: 0,
            completed: 0,
            failed: 0,
        }
    }

    /// Run until drained or until the first failure and all in-flight work settled.
    pub(crate) async fn drive(mut self) -> Result<PoolStats, PoolError> {
        let mut ticker = time::interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            min_concurrency = self.controller.min_concurrency(),
            max_concurrency = self.controller.max_concurrency(),
            min_free_memory_ratio = self.config.min_free_memory_ratio,
            tick_interval_ms = self.config.tick_interval_ms,
            "Autoscaled pool started"
        );
        self.publish();

        loop {
            tokio::select! {
                biased;

                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    self.settle(joined);
                    self.fill();
                }
                sampled = next_sample(&mut self.sample_task), if self.sample_task.is_some() => {
                    self.sample_task = None;
                    self.on_sample(sampled);
                }
                _ = ticker.tick() => {
                    if self.on_tick().await {
                        break;
                    }
                }
            }

            self.publish();

            if self.first_error.is_some() && self.in_flight.is_empty() {
                break;
            }
        }

        if let Some(task) = self.sample_task.take() {
            task.abort();
        }
        let stats = self.snapshot();
        self.stats_tx.send_replace(stats.clone());

        match self.first_error.take() {
            Some(err) => {
                error!(
                    error = %err,
                    started = stats.started_tasks,
                    failed = stats.failed_tasks,
                    "Autoscaled pool aborted"
                );
                Err(err)
            }
            None => {
                info!(
                    completed = stats.completed_tasks,
                    ticks = stats.ticks,
                    "Autoscaled pool finished"
                );
                Ok(stats)
            }
        }
    }

    /// Handle one tick. Returns `true` once the pool is drained.
    async fn on_tick(&mut self) -> bool {
        self.tick += 1;

        if self.first_error.is_some() {
            // Aborting: wait for in-flight work, start nothing.
            return false;
        }

        let started = self.fill();

        if self.tick % self.config.autoscale_every_n_ticks == 0 && self.sample_task.is_none() {
            let monitor = Arc::clone(&self.monitor);
            self.sample_task = Some(tokio::spawn(async move { monitor.sample().await }));
        }

        if self.tick % self.config.log_every_n_ticks == 0 {
            self.log_status();
        }

        if started > 0 || !self.in_flight.is_empty() || self.first_error.is_some() {
            return false;
        }
        self.is_drained().await
    }

    /// Decide whether an idle pool is finished.
    async fn is_drained(&mut self) -> bool {
        if self.empty_passes == 0 {
            return false;
        }
        let Some(predicate) = self.completion.clone() else {
            return self.empty_passes >= EMPTY_PASSES_BEFORE_DRAIN;
        };
        match predicate.is_finished().await {
            Ok(finished) => {
                debug!(finished, "Completion predicate consulted");
                finished
            }
            Err(err) => {
                self.capture(PoolError::CompletionCheck(err));
                false
            }
        }
    }

    /// Start work in idle slots until the source runs dry or slots are full.
    fn fill(&mut self) -> usize {
        let mut started = 0;
        let mut saw_empty = false;

        while self.first_error.is_none() && self.in_flight.len() < self.controller.concurrency() {
            match self.source.next() {
                Ok(NextWork::Operation(op)) => {
                    self.in_flight.spawn(op);
                    self.started += 1;
                    started += 1;
                }
                Ok(NextWork::Empty) => {
                    saw_empty = true;
                    break;
                }
                Err(err) => {
                    self.capture(PoolError::TaskFailed(err));
                    break;
                }
            }
        }

        if started > 0 {
            self.empty_passes = 0;
            debug!(started, running = self.in_flight.len(), "Filled idle slots");
        } else if saw_empty {
            self.empty_passes = self.empty_passes.saturating_add(1);
        }
        started
    }

    fn settle(&mut self, joined: Result<anyhow::Result<()>, JoinError>) {
        match joined {
            Ok(Ok(())) => {
                self.completed += 1;
            }
            Ok(Err(err)) => {
                self.failed += 1;
                self.capture(PoolError::TaskFailed(err));
            }
            Err(join_err) => {
                self.failed += 1;
                self.capture(PoolError::TaskPanicked(join_err.to_string()));
            }
        }
    }

    /// Keep the first failure; later ones are logged and dropped.
    fn capture(&mut self, err: PoolError) {
        if self.first_error.is_some() {
            debug!(error = %err, "Discarding failure after the first");
            return;
        }
        warn!(
            error = %err,
            running = self.in_flight.len(),
            "Task failed, waiting for running tasks before aborting"
        );
        self.first_error = Some(err);
    }

    fn on_sample(&mut self, sampled: Result<MemoryInfo, MonitorError>) {
        let recorded = match sampled {
            Ok(info) => {
                let recorded = self.controller.record(info);
                if !recorded {
                    debug!("Discarding memory sample with zero total");
                }
                recorded
            }
            Err(err) => {
                warn!(
                    error = %err,
                    window = self.controller.snapshots().count(),
                    "Memory sample failed, scaling on previous window"
                );
                false
            }
        };
        if recorded && self.controller.is_overloaded() {
            warn!(
                free_ratio = self.controller.latest_free_ratio(),
                min_free_memory_ratio = self.config.min_free_memory_ratio,
                "Memory is overloaded"
            );
        }

        match self.controller.autoscale(self.in_flight.len()) {
            ScaleDecision::Up { from, to } => info!(from, to, "Scaling up concurrency"),
            ScaleDecision::Down { from, to } => info!(from, to, "Scaling down concurrency"),
            ScaleDecision::Hold => {
                debug!(concurrency = self.controller.concurrency(), "Concurrency unchanged");
            }
        }
        self.fill();
    }

    fn log_status(&self) {
        info!(
            concurrency = self.controller.concurrency(),
            running = self.in_flight.len(),
            free_ratio = self.controller.latest_free_ratio(),
            started = self.started,
            completed = self.completed,
            "Autoscaled pool status"
        );
    }

    fn snapshot(&self) -> PoolStats {
        let running = self.in_flight.len();
        PoolStats {
            concurrency: self.controller.concurrency().max(running),
            running,
            min_concurrency: self.controller.min_concurrency(),
            max_concurrency: self.controller.max_concurrency(),
            started_tasks: self.started,
            completed_tasks: self.completed,
            failed_tasks: self.failed,
            ticks: self.tick,
            last_free_ratio: self.controller.latest_free_ratio(),
        }
    }

    fn publish(&self) {
        self.stats_tx.send_replace(self.snapshot());
    }
}

/// Await the pending sample task, or never resolve when none is pending.
async fn next_sample(task: &mut Option<SampleTask>) -> Result<MemoryInfo, MonitorError> {
    match task.as_mut() {
        Some(handle) => handle
            .await
            .unwrap_or_else(|e| Err(MonitorError::Unavailable(format!("sampling task failed: {e}")))),
        None => std::future::pending().await,
    }
}
