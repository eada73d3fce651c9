//! Integration tests for logging system

use bridge_traits::time::LogLevel;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};

#[test]
fn test_logging_config_round_trips_through_json() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_thread_info(true);

    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("\"compact\""));
    assert!(json.contains("\"debug\""));

    let parsed: LoggingConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_logging_initializes_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn);

    // The first call installs the global subscriber; every later call in the
    // same process must fail instead of silently replacing it.
    assert!(init_logging(config.clone()).is_ok());
    assert!(init_logging(config).is_err());

    tracing::warn!(target: "core_playback", "logging smoke test");
}

#[test]
fn test_invalid_filter_fails_init() {
    let config = LoggingConfig::default().with_filter("core_playback=notalevel");
    assert!(init_logging(config).is_err());
}
