//! Core scheduling abstractions and concurrency control.

pub mod autoscaled_pool;
pub mod controller;
pub mod error;
pub mod monitor;
mod scheduler;
pub mod stats;
pub mod work;

pub use autoscaled_pool::AutoscaledPool;
pub use controller::{space_for_instances, ConcurrencyController, ScaleDecision};
pub use error::{AppResult, MonitorError, PoolError};
pub use monitor::{MemoryInfo, ResourceMonitor};
pub use stats::PoolStats;
pub use work::{CompletionPredicate, NextWork, Operation, WorkSource};
