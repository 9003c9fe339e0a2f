//! Autoscaled pool configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Construction-time configuration for an autoscaled pool.
///
/// All values are fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoscaledPoolConfig {
    /// Lower clamp for concurrency.
    pub min_concurrency: usize,
    /// Upper clamp for concurrency.
    pub max_concurrency: usize,
    /// Fraction of total memory that must stay free.
    pub min_free_memory_ratio: f64,
    /// Largest concurrency increase applied by one autoscale decision.
    pub scale_up_step: usize,
    /// Largest concurrency decrease applied by one autoscale decision.
    pub scale_down_step: usize,
    /// Free-ratio margin above the minimum inside which concurrency is held.
    pub neutral_band: f64,
    /// Number of memory samples kept for smoothing.
    pub memory_window_size: usize,
    /// Samples required before the smoothed estimate replaces the raw ratio.
    pub min_snapshots_for_estimate: usize,
    /// Scheduling loop cadence in milliseconds.
    pub tick_interval_ms: u64,
    /// Autoscale every N ticks.
    pub autoscale_every_n_ticks: u64,
    /// Log pool status every N ticks.
    pub log_every_n_ticks: u64,
}

impl Default for AutoscaledPoolConfig {
    fn default() -> Self {
        Self {
            min_concurrency: 1,
            max_concurrency: 1000,
            min_free_memory_ratio: 0.2,
            scale_up_step: 10,
            scale_down_step: 1,
            neutral_band: 0.05,
            memory_window_size: 5,
            min_snapshots_for_estimate: 3,
            tick_interval_ms: 200,
            autoscale_every_n_ticks: 5,
            log_every_n_ticks: 50,
        }
    }
}

impl AutoscaledPoolConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency bounds.
    #[must_use]
    pub const fn with_concurrency(mut self, min: usize, max: usize) -> Self {
        self.min_concurrency = min;
        self.max_concurrency = max;
        self
    }

    /// Set the lower concurrency bound.
    #[must_use]
    pub const fn with_min_concurrency(mut self, min: usize) -> Self {
        self.min_concurrency = min;
        self
    }

    /// Set the upper concurrency bound.
    #[must_use]
    pub const fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    /// Set the minimum free memory ratio.
    #[must_use]
    pub const fn with_min_free_memory_ratio(mut self, ratio: f64) -> Self {
        self.min_free_memory_ratio = ratio;
        self
    }

    /// Set the maximum scale up and scale down steps.
    #[must_use]
    pub const fn with_steps(mut self, up: usize, down: usize) -> Self {
        self.scale_up_step = up;
        self.scale_down_step = down;
        self
    }

    /// Set the neutral band width.
    #[must_use]
    pub const fn with_neutral_band(mut self, band: f64) -> Self {
        self.neutral_band = band;
        self
    }

    /// Set the memory window size and how many samples make an estimate trustworthy.
    #[must_use]
    pub const fn with_memory_window(mut self, size: usize, min_for_estimate: usize) -> Self {
        self.memory_window_size = size;
        self.min_snapshots_for_estimate = min_for_estimate;
        self
    }

    /// Set the tick interval in milliseconds.
    #[must_use]
    pub const fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = ms;
        self
    }

    /// Set how many ticks pass between autoscale decisions.
    #[must_use]
    pub const fn with_autoscale_every_n_ticks(mut self, n: u64) -> Self {
        self.autoscale_every_n_ticks = n;
        self
    }

    /// Set how many ticks pass between status log lines.
    #[must_use]
    pub const fn with_log_every_n_ticks(mut self, n: u64) -> Self {
        self.log_every_n_ticks = n;
        self
    }

    /// Tick interval as a [`Duration`].
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_concurrency == 0 {
            return Err("min_concurrency must be greater than 0".into());
        }
        if self.min_concurrency > self.max_concurrency {
            return Err(format!(
                "min_concurrency ({}) must not exceed max_concurrency ({})",
                self.min_concurrency, self.max_concurrency
            ));
        }
        if !(self.min_free_memory_ratio > 0.0 && self.min_free_memory_ratio < 1.0) {
            return Err("min_free_memory_ratio must be between 0 and 1 (exclusive)".into());
        }
        if self.scale_up_step == 0 || self.scale_down_step == 0 {
            return Err("scale steps must be greater than 0".into());
        }
        if !(self.neutral_band >= 0.0 && self.neutral_band < 1.0) {
            return Err("neutral_band must be in [0, 1)".into());
        }
        if self.memory_window_size == 0 {
            return Err("memory_window_size must be greater than 0".into());
        }
        if self.min_snapshots_for_estimate > self.memory_window_size {
            return Err("min_snapshots_for_estimate must not exceed memory_window_size".into());
        }
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be greater than 0".into());
        }
        if self.autoscale_every_n_ticks == 0 || self.log_every_n_ticks == 0 {
            return Err("tick multiples must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
