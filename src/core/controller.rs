//! Memory-driven concurrency controller.
//!
//! The controller keeps a short window of memory samples and moves the
//! allowed concurrency up or down in bounded steps. Decisions are made from
//! the smoothed window once enough samples exist and operations are running;
//! before that the latest raw free ratio is used so a fresh pool can ramp up
//! immediately when memory is plentiful.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::AutoscaledPoolConfig;
use crate::core::MemoryInfo;

/// Estimate how many more (positive) or fewer (negative) instances the
/// current memory headroom can sustain.
///
/// `floor((mean(free_i / total_i) - min_free_memory_ratio) * concurrency)`.
/// An empty window yields `0`.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn space_for_instances<'a, I>(
    snapshots: I,
    concurrency: usize,
    min_free_memory_ratio: f64,
) -> i64
where
    I: IntoIterator<Item = &'a MemoryInfo>,
{
    let Some(mean) = mean_free_ratio(snapshots) else {
        return 0;
    };
    ((mean - min_free_memory_ratio) * concurrency as f64).floor() as i64
}

#[allow(clippy::cast_precision_loss)]
fn mean_free_ratio<'a, I>(snapshots: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a MemoryInfo>,
{
    let (sum, count) = snapshots
        .into_iter()
        .fold((0.0_f64, 0_usize), |(sum, count), s| (sum + s.free_ratio(), count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Outcome of one autoscale evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleDecision {
    /// Concurrency increased.
    Up {
        /// Previous concurrency.
        from: usize,
        /// New concurrency.
        to: usize,
    },
    /// Concurrency decreased.
    Down {
        /// Previous concurrency.
        from: usize,
        /// New concurrency.
        to: usize,
    },
    /// Concurrency unchanged.
    Hold,
}

/// Tracks allowed concurrency and the rolling memory window.
#[derive(Debug, Clone)]
pub struct ConcurrencyController {
    min_concurrency: usize,
    max_concurrency: usize,
    concurrency: usize,
    min_free_memory_ratio: f64,
    scale_up_step: usize,
    scale_down_step: usize,
    neutral_band: f64,
    window_size: usize,
    min_snapshots_for_estimate: usize,
    snapshots: VecDeque<MemoryInfo>,
}

impl ConcurrencyController {
    /// Create a controller starting at the minimum concurrency.
    ///
    /// The configuration is assumed to be validated.
    #[must_use]
    pub fn new(config: &AutoscaledPoolConfig) -> Self {
        Self {
            min_concurrency: config.min_concurrency,
            max_concurrency: config.max_concurrency,
            concurrency: config.min_concurrency,
            min_free_memory_ratio: config.min_free_memory_ratio,
            scale_up_step: config.scale_up_step,
            scale_down_step: config.scale_down_step,
            neutral_band: config.neutral_band,
            window_size: config.memory_window_size,
            min_snapshots_for_estimate: config.min_snapshots_for_estimate,
            snapshots: VecDeque::with_capacity(config.memory_window_size),
        }
    }

    /// Currently allowed concurrency.
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Lower concurrency bound.
    #[must_use]
    pub const fn min_concurrency(&self) -> usize {
        self.min_concurrency
    }

    /// Upper concurrency bound.
    #[must_use]
    pub const fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Samples in the window, oldest first.
    pub fn snapshots(&self) -> impl Iterator<Item = &MemoryInfo> {
        self.snapshots.iter()
    }

    /// Push a sample, evicting the oldest once the window is full.
    ///
    /// Samples reporting zero total memory carry no information and are
    /// discarded; returns whether the sample was kept.
    pub fn record(&mut self, sample: MemoryInfo) -> bool {
        if sample.total_bytes == 0 {
            return false;
        }
        while self.snapshots.len() >= self.window_size {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(sample);
        true
    }

    /// Free ratio of the most recent sample.
    #[must_use]
    pub fn latest_free_ratio(&self) -> Option<f64> {
        self.snapshots.back().map(MemoryInfo::free_ratio)
    }

    /// Mean free ratio over the window.
    #[must_use]
    pub fn mean_free_ratio(&self) -> Option<f64> {
        mean_free_ratio(&self.snapshots)
    }

    /// Whether the latest sample is below the minimum free ratio.
    #[must_use]
    pub fn is_overloaded(&self) -> bool {
        self.latest_free_ratio()
            .is_some_and(|ratio| ratio < self.min_free_memory_ratio)
    }

    /// Space-for-instances estimate over the current window and concurrency.
    #[must_use]
    pub fn space_for_instances(&self) -> i64 {
        space_for_instances(&self.snapshots, self.concurrency, self.min_free_memory_ratio)
    }

    /// Whether the smoothed estimate can be trusted.
    ///
    /// With nothing running the window says nothing about per-instance cost.
    #[must_use]
    pub fn is_calibrated(&self, running: usize) -> bool {
        running > 0 && self.snapshots.len() >= self.min_snapshots_for_estimate
    }

    /// Evaluate the window and adjust concurrency.
    pub fn autoscale(&mut self, running: usize) -> ScaleDecision {
        if self.is_calibrated(running) {
            self.autoscale_smoothed()
        } else {
            self.autoscale_raw()
        }
    }

    fn autoscale_smoothed(&mut self) -> ScaleDecision {
        let Some(mean) = self.mean_free_ratio() else {
            return ScaleDecision::Hold;
        };
        let space = self.space_for_instances();

        if mean <= self.min_free_memory_ratio {
            let by = usize::try_from(space.unsigned_abs())
                .unwrap_or(usize::MAX)
                .clamp(1, self.scale_down_step);
            return self.scale_down(by);
        }
        if mean >= self.min_free_memory_ratio + self.neutral_band {
            // Headroom below one whole instance still grants a single step.
            let by = usize::try_from(space.max(1))
                .unwrap_or(usize::MAX)
                .min(self.scale_up_step);
            return self.scale_up(by);
        }
        ScaleDecision::Hold
    }

    fn autoscale_raw(&mut self) -> ScaleDecision {
        let Some(ratio) = self.latest_free_ratio() else {
            return ScaleDecision::Hold;
        };
        if ratio <= self.min_free_memory_ratio {
            return self.scale_down(self.scale_down_step);
        }
        if ratio >= self.min_free_memory_ratio + self.neutral_band {
            return self.scale_up(self.scale_up_step);
        }
        ScaleDecision::Hold
    }

    fn scale_up(&mut self, by: usize) -> ScaleDecision {
        let from = self.concurrency;
        let to = from.saturating_add(by).min(self.max_concurrency);
        if to == from {
            return ScaleDecision::Hold;
        }
        self.concurrency = to;
        ScaleDecision::Up { from, to }
    }

    fn scale_down(&mut self, by: usize) -> ScaleDecision {
        let from = self.concurrency;
        let to = from.saturating_sub(by).max(self.min_concurrency);
        if to == from {
            return ScaleDecision::Hold;
        }
        self.concurrency = to;
        ScaleDecision::Down { from, to }
    }
}
