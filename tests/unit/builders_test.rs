//! Tests for builder modules

use autoscaled_pool::builders::AutoscaledPoolBuilder;
use autoscaled_pool::config::AutoscaledPoolConfig;
use autoscaled_pool::core::{NextWork, PoolError};
use autoscaled_pool::infra::SystemMemoryMonitor;

fn empty_source() -> impl FnMut() -> anyhow::Result<NextWork> + Send + 'static {
    || Ok(NextWork::Empty)
}

#[test]
fn test_builder_keeps_config() {
    let builder = AutoscaledPoolBuilder::new(AutoscaledPoolConfig::new().with_concurrency(2, 8));
    assert_eq!(builder.config().min_concurrency, 2);
    assert_eq!(builder.config().max_concurrency, 8);
    assert!(!builder.has_completion_predicate());
}

#[test]
fn test_builder_requires_source() {
    let err = AutoscaledPoolBuilder::new(AutoscaledPoolConfig::new())
        .build()
        .unwrap_err();
    assert!(matches!(err, PoolError::InvalidConfig(_)));
}

#[test]
fn test_builder_rejects_invalid_config() {
    let err = AutoscaledPoolBuilder::new(AutoscaledPoolConfig::new().with_concurrency(3, 1))
        .source(empty_source())
        .build()
        .unwrap_err();
    assert!(matches!(err, PoolError::InvalidConfig(_)));
}

#[test]
fn test_builder_from_json() {
    let builder = AutoscaledPoolBuilder::from_json_str(r#"{"max_concurrency": 12}"#).unwrap();
    assert_eq!(builder.config().max_concurrency, 12);

    let pool = builder
        .source(empty_source())
        .monitor(SystemMemoryMonitor::new())
        .build()
        .unwrap();
    assert_eq!(pool.config().max_concurrency, 12);
    assert_eq!(pool.subscribe().borrow().concurrency, 1);
}

#[test]
fn test_builder_from_invalid_json() {
    assert!(AutoscaledPoolBuilder::from_json_str(r#"{"min_free_memory_ratio": 2.0}"#).is_err());
}

#[tokio::test]
async fn test_builder_detects_monitor_and_runs() {
    let pool = AutoscaledPoolBuilder::new(AutoscaledPoolConfig::new().with_tick_interval_ms(5))
        .source(empty_source())
        .detect_monitor()
        .await
        .build()
        .unwrap();

    let stats = pool.run().await.unwrap();
    assert_eq!(stats.started_tasks, 0);
}
