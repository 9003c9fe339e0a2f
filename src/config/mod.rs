//! Configuration models for autoscaled pools.

pub mod pool;

pub use pool::AutoscaledPoolConfig;
