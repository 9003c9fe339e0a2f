//! Infrastructure adapters for the pool's external collaborators.

pub mod monitor;

pub use monitor::{detect_monitor, CgroupMemoryMonitor, SystemMemoryMonitor};
