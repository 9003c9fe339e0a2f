//! Tests for configuration validation

use autoscaled_pool::config::AutoscaledPoolConfig;

#[test]
fn test_default_config_is_valid() {
    let config = AutoscaledPoolConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.min_concurrency, 1);
    assert_eq!(config.max_concurrency, 1000);
    assert!((config.min_free_memory_ratio - 0.2).abs() < f64::EPSILON);
}

#[test]
fn test_min_concurrency_zero() {
    let config = AutoscaledPoolConfig::new().with_min_concurrency(0);
    assert!(config.validate().is_err());
}

#[test]
fn test_min_exceeds_max() {
    let config = AutoscaledPoolConfig::new().with_concurrency(10, 5);
    let err = config.validate().unwrap_err();
    assert!(err.contains("must not exceed"));
}

#[test]
fn test_min_equals_max_is_valid() {
    let config = AutoscaledPoolConfig::new().with_concurrency(4, 4);
    assert!(config.validate().is_ok());
}

#[test]
fn test_free_memory_ratio_bounds() {
    for ratio in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
        let config = AutoscaledPoolConfig::new().with_min_free_memory_ratio(ratio);
        assert!(config.validate().is_err(), "ratio {ratio} accepted");
    }
    let config = AutoscaledPoolConfig::new().with_min_free_memory_ratio(0.15);
    assert!(config.validate().is_ok());
}

#[test]
fn test_zero_steps_rejected() {
    assert!(AutoscaledPoolConfig::new().with_steps(0, 1).validate().is_err());
    assert!(AutoscaledPoolConfig::new().with_steps(1, 0).validate().is_err());
}

#[test]
fn test_window_settings() {
    assert!(AutoscaledPoolConfig::new()
        .with_memory_window(0, 0)
        .validate()
        .is_err());
    assert!(AutoscaledPoolConfig::new()
        .with_memory_window(3, 4)
        .validate()
        .is_err());
    assert!(AutoscaledPoolConfig::new()
        .with_memory_window(3, 3)
        .validate()
        .is_ok());
}

#[test]
fn test_zero_intervals_rejected() {
    assert!(AutoscaledPoolConfig::new().with_tick_interval_ms(0).validate().is_err());
    assert!(AutoscaledPoolConfig::new()
        .with_autoscale_every_n_ticks(0)
        .validate()
        .is_err());
    assert!(AutoscaledPoolConfig::new().with_log_every_n_ticks(0).validate().is_err());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "min_concurrency": 2,
        "max_concurrency": 50,
        "min_free_memory_ratio": 0.25,
        "tick_interval_ms": 100
    }"#;

    let config = AutoscaledPoolConfig::from_json_str(json).unwrap();
    assert_eq!(config.min_concurrency, 2);
    assert_eq!(config.max_concurrency, 50);
    assert_eq!(config.tick_interval_ms, 100);
    // Unspecified fields keep their defaults
    assert_eq!(config.scale_up_step, 10);
    assert_eq!(config.autoscale_every_n_ticks, 5);
}

#[test]
fn test_config_from_json_invalid() {
    assert!(AutoscaledPoolConfig::from_json_str(r#"{"min_concurrency": 0}"#).is_err());
    assert!(AutoscaledPoolConfig::from_json_str("not json").is_err());
}

#[test]
fn test_config_json_roundtrip_keeps_values() {
    let config = AutoscaledPoolConfig::new()
        .with_concurrency(3, 30)
        .with_neutral_band(0.1);
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(AutoscaledPoolConfig::from_json_str(&json).unwrap(), config);
}
