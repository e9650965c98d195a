//! Configuration sections

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use types::{SessionClock, SessionZone};

use crate::ConfigError;

/// What a shard submission does when the target queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackpressurePolicy {
    /// Wait up to `enqueue_timeout_ms`, then drop and log
    Block,
    /// Drop and log immediately
    Drop,
}

/// Sharded engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Number of shard workers; `None` uses available CPU parallelism
    pub workers: Option<usize>,
    /// Bound of each shard's inbound queue
    pub queue_capacity: usize,
    pub backpressure: BackpressurePolicy,
    pub enqueue_timeout_ms: u64,
    /// Grace period for queued ticks to drain at shutdown
    pub shutdown_grace_ms: u64,
    /// Price history kept per instrument (250 ≈ one trading year of closes)
    pub history_capacity: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            workers: None,
            queue_capacity: 10_000,
            backpressure: BackpressurePolicy::Block,
            enqueue_timeout_ms: 50,
            shutdown_grace_ms: 5_000,
            history_capacity: 250,
        }
    }
}

impl EngineSettings {
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    pub fn enqueue_timeout(&self) -> Duration {
        Duration::from_millis(self.enqueue_timeout_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

/// Session boundary used by end-of-session strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Local close time, `HH:MM:SS`
    pub close: NaiveTime,
    /// Offset such as `"+08:00"`; unset means the process local zone
    pub utc_offset: Option<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            close: NaiveTime::from_hms_opt(15, 0, 0).unwrap_or_default(),
            utc_offset: None,
        }
    }
}

impl SessionSettings {
    pub fn clock(&self) -> Result<SessionClock, ConfigError> {
        let zone = match &self.utc_offset {
            Some(offset) => offset.parse::<SessionZone>()?,
            None => SessionZone::Local,
        };
        Ok(SessionClock::new(zone, self.close))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Counts closes strictly below the close `lookback` sessions earlier
    TurnCountBullish,
    /// Counts closes strictly above the close `lookback` sessions earlier
    TurnCountBearish,
}

/// One entry of the strategy roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyDefinition {
    pub id: String,
    pub kind: StrategyKind,
    #[serde(default = "default_lookback")]
    pub lookback: usize,
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_lookback() -> usize {
    4
}

fn default_threshold() -> u32 {
    9
}

fn default_enabled() -> bool {
    true
}

impl StrategyDefinition {
    pub fn new(id: impl Into<String>, kind: StrategyKind) -> Self {
        Self {
            id: id.into(),
            kind,
            lookback: default_lookback(),
            threshold: default_threshold(),
            enabled: true,
        }
    }

    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }
}

pub(crate) fn default_strategies() -> Vec<StrategyDefinition> {
    vec![
        StrategyDefinition::new("TD_BUY_SETUP", StrategyKind::TurnCountBullish),
        StrategyDefinition::new("TD_SELL_SETUP", StrategyKind::TurnCountBearish),
    ]
}

/// Extra field names the dispatcher should try, after the built-in ones
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    pub instrument_keys: Vec<String>,
    pub price_keys: Vec<String>,
    pub avg_price_keys: Vec<String>,
    pub volume_keys: Vec<String>,
    pub time_keys: Vec<String>,
}

/// Market data relay connection used by the service binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaySettings {
    pub socket_path: String,
    pub max_connect_attempts: u32,
    pub retry_interval_ms: u64,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            socket_path: "/tmp/torq/market_data.sock".to_string(),
            max_connect_attempts: 30,
            retry_interval_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
    /// Period of the engine metrics log line; 0 disables it
    pub metrics_interval_secs: u64,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            metrics_interval_secs: 30,
        }
    }
}
