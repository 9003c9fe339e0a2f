//! Tests for error types

use std::error::Error;

use autoscaled_pool::core::{MonitorError, PoolError};

#[test]
fn test_invalid_config_error() {
    let err = PoolError::InvalidConfig("min_concurrency must be greater than 0".to_string());
    assert_eq!(
        format!("{err}"),
        "invalid configuration: min_concurrency must be greater than 0"
    );
}

#[test]
fn test_task_failed_keeps_source() {
    let err = PoolError::TaskFailed(anyhow::anyhow!("page timed out"));
    assert_eq!(format!("{err}"), "task failed: page timed out");
    assert!(err.source().is_some());
}

#[test]
fn test_task_panicked_error() {
    let err = PoolError::TaskPanicked("boom".to_string());
    assert_eq!(format!("{err}"), "task panicked: boom");
}

#[test]
fn test_monitor_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "memory.max");
    let err: MonitorError = io.into();
    assert!(matches!(err, MonitorError::Io(_)));
    assert_eq!(format!("{err}"), "io error: memory.max");
}

#[test]
fn test_monitor_parse_error() {
    let err = MonitorError::Parse("invalid byte count".to_string());
    assert_eq!(format!("{err}"), "parse error: invalid byte count");
}
