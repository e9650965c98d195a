//! Engine built from a configuration file

mod common;

use common::*;
use message_sink::test_utils::CollectorSink;
use signal_engine::{EngineError, ShardedEngine, ShutdownOutcome};
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;
use torq_config::{ConfigError, SignalEngineConfig};

#[test]
fn test_shipped_config_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/signal_engine.toml");
    let config = SignalEngineConfig::load_with_env(Some(&path), Some(HashMap::new())).unwrap();

    assert!(config.validate().is_ok());
    assert_eq!(config.enabled_strategies().count(), 2);
    assert_eq!(config.session.utc_offset.as_deref(), Some("+08:00"));
}

#[test]
fn test_roster_from_file_drives_engine() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("signal_engine.toml");
    fs::write(
        &path,
        r#"
[engine]
workers = 2
history_capacity = 16

[session]
close = "15:00:00"
utc_offset = "+08:00"

[[strategies]]
id = "SHORT_BUY"
kind = "turn_count_bullish"
lookback = 1
threshold = 3

[[strategies]]
id = "DISABLED_SELL"
kind = "turn_count_bearish"
enabled = false
"#,
    )
    .unwrap();

    let config = SignalEngineConfig::load_with_env(Some(&path), Some(HashMap::new())).unwrap();
    let sink = Arc::new(CollectorSink::new());
    let engine = ShardedEngine::from_config(&config, sink.clone()).unwrap();
    assert_eq!(engine.shard_count(), 2);

    // Day 0 has no reference; days 1..3 qualify and fire on the third
    for day in 0..4 {
        engine.process(close_tick("300750", day, 50.0 - day as f64));
    }
    assert!(engine.sync());

    let signals = sink.received_signals();
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].strategy_id, "SHORT_BUY");
    assert_eq!(signals[0].price, 47.0);

    let snapshot = engine.inspect("300750").unwrap();
    assert_eq!(snapshot.history_capacity, 16);
    assert_eq!(snapshot.counter("SHORT_BUY_COUNT"), 0);
    assert_eq!(engine.shutdown(), ShutdownOutcome::Drained);
}

#[test]
fn test_invalid_config_fails_at_startup() {
    let mut config = config(2);
    config.engine.history_capacity = 3;

    let result = ShardedEngine::from_config(&config, Arc::new(CollectorSink::new()));
    assert!(matches!(
        result,
        Err(EngineError::Config(ConfigError::LookbackTooLarge { .. }))
    ));
}
