//! # Autoscaled Pool
//!
//! A memory-aware concurrency pool for long-running actor workloads such as
//! web scraping and data extraction jobs.
//!
//! The pool repeatedly pulls units of work from a caller-supplied source,
//! keeps a bounded number of them in flight, and retunes that bound against
//! live memory pressure so the process maximizes throughput without being
//! killed for over-allocation.
//!
//! ## Core Problem Solved
//!
//! - **Unknown amount of work**: work is pulled on demand, and transient
//!   emptiness (a producer about to enqueue more) is not mistaken for
//!   exhaustion
//! - **Memory-bound workloads**: browser-driven or parsing-heavy tasks have
//!   unpredictable footprints, so concurrency follows free memory instead of
//!   a fixed worker count
//! - **Fail-fast runs**: the first failing unit of work aborts the run once
//!   the work already in flight settles
//!
//! ## Example
//!
//! ```rust,ignore
//! use autoscaled_pool::builders::AutoscaledPoolBuilder;
//! use autoscaled_pool::config::AutoscaledPoolConfig;
//! use autoscaled_pool::core::NextWork;
//!
//! let pool = AutoscaledPoolBuilder::new(
//!     AutoscaledPoolConfig::new()
//!         .with_concurrency(1, 100)
//!         .with_min_free_memory_ratio(0.2),
//! )
//! .source(move || match requests.lock().pop_front() {
//!     Some(request) => Ok(NextWork::from_future(handle(request))),
//!     None => Ok(NextWork::Empty),
//! })
//! .completion_predicate(move || {
//!     let queue = queue.clone();
//!     async move { Ok(queue.is_finished().await) }
//! })
//! .detect_monitor()
//! .await
//! .build()?;
//!
//! let stats = pool.run().await?;
//! ```
//!
//! For complete examples, see `tests/autoscaled_pool_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions and concurrency control.
pub mod core;
/// Configuration models for pools.
pub mod config;
/// Builders to construct pools from configuration.
pub mod builders;
/// Infrastructure adapters for resource monitoring.
pub mod infra;
/// Shared utilities.
pub mod util;
