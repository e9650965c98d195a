//! Signal engine configuration loading and validation

use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

use crate::settings::{
    default_strategies, DispatchSettings, EngineSettings, LoggingSettings, RelaySettings,
    SessionSettings, StrategyDefinition,
};
use crate::ConfigError;

/// Environment variable prefix, e.g. `TORQ_SIGNALS_ENGINE__WORKERS=8`
pub const ENV_PREFIX: &str = "TORQ_SIGNALS";

/// Complete service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalEngineConfig {
    pub engine: EngineSettings,
    pub session: SessionSettings,
    pub strategies: Vec<StrategyDefinition>,
    pub dispatch: DispatchSettings,
    pub relay: RelaySettings,
    pub logging: LoggingSettings,
}

impl Default for SignalEngineConfig {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            session: SessionSettings::default(),
            strategies: default_strategies(),
            dispatch: DispatchSettings::default(),
            relay: RelaySettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl SignalEngineConfig {
    /// Load from an optional TOML file, overlaid with `TORQ_SIGNALS_*` variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Same as [`load`](Self::load) with an explicit environment map instead
    /// of the process environment
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading signal engine config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: Self = builder
            .build()
            .context("Failed to build signal engine configuration")?
            .try_deserialize()
            .context("Failed to deserialize signal engine configuration")?;

        debug!(
            workers = config.engine.worker_count(),
            strategies = config.strategies.len(),
            "Signal engine configuration loaded"
        );

        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.engine.worker_count() == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.engine.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.engine.history_capacity == 0 {
            return Err(ConfigError::ZeroHistoryCapacity);
        }

        self.session.clock()?;

        let mut seen = HashSet::new();
        for definition in &self.strategies {
            if definition.id.trim().is_empty() {
                return Err(ConfigError::EmptyStrategyId);
            }
            if !seen.insert(definition.id.as_str()) {
                return Err(ConfigError::DuplicateStrategy(definition.id.clone()));
            }
            if definition.threshold == 0 {
                return Err(ConfigError::ZeroThreshold {
                    id: definition.id.clone(),
                });
            }
            // The current tick occupies one slot, so lookback L needs L + 1 entries
            if definition.lookback >= self.engine.history_capacity {
                return Err(ConfigError::LookbackTooLarge {
                    id: definition.id.clone(),
                    lookback: definition.lookback,
                    capacity: self.engine.history_capacity,
                });
            }
        }

        Ok(())
    }

    /// Strategy definitions that are switched on
    pub fn enabled_strategies(&self) -> impl Iterator<Item = &StrategyDefinition> {
        self.strategies.iter().filter(|definition| definition.enabled)
    }

    /// Effective configuration rendered as TOML, for startup diagnostics
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration as TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BackpressurePolicy, StrategyKind};
    use chrono::NaiveTime;
    use std::fs;
    use tempfile::tempdir;

    fn empty_env() -> Option<HashMap<String, String>> {
        Some(HashMap::new())
    }

    #[test]
    fn test_defaults_without_file() {
        let config = SignalEngineConfig::load_with_env(None, empty_env()).unwrap();

        assert_eq!(config, SignalEngineConfig::default());
        assert_eq!(config.engine.history_capacity, 250);
        assert_eq!(config.engine.backpressure, BackpressurePolicy::Block);
        assert_eq!(config.session.close, NaiveTime::from_hms_opt(15, 0, 0).unwrap());
        assert_eq!(config.strategies.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("signal_engine.toml");

        let config_content = r#"
[engine]
workers = 3
queue_capacity = 128
backpressure = "drop"
history_capacity = 60

[session]
close = "16:00:00"
utc_offset = "+09:00"

[[strategies]]
id = "NINE_TURN_UP"
kind = "turn_count_bullish"
lookback = 4
threshold = 9

[[strategies]]
id = "THIRTEEN_DOWN"
kind = "turn_count_bearish"
lookback = 13
enabled = false

[dispatch]
instrument_keys = ["ticker"]

[logging]
json = true
"#;

        fs::write(&config_path, config_content).unwrap();

        let config = SignalEngineConfig::load_with_env(Some(&config_path), empty_env()).unwrap();

        assert_eq!(config.engine.worker_count(), 3);
        assert_eq!(config.engine.queue_capacity, 128);
        assert_eq!(config.engine.backpressure, BackpressurePolicy::Drop);
        assert_eq!(config.engine.enqueue_timeout_ms, 50);
        assert_eq!(config.session.close, NaiveTime::from_hms_opt(16, 0, 0).unwrap());
        assert_eq!(config.session.utc_offset.as_deref(), Some("+09:00"));
        assert_eq!(config.strategies[0].kind, StrategyKind::TurnCountBullish);
        assert_eq!(config.strategies[1].lookback, 13);
        assert_eq!(config.strategies[1].threshold, 9);
        assert_eq!(config.enabled_strategies().count(), 1);
        assert_eq!(config.dispatch.instrument_keys, vec!["ticker".to_string()]);
        assert!(config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_override() {
        let mut env = HashMap::new();
        env.insert("TORQ_SIGNALS_ENGINE__WORKERS".to_string(), "7".to_string());
        env.insert("TORQ_SIGNALS_LOGGING__LEVEL".to_string(), "debug".to_string());

        let config = SignalEngineConfig::load_with_env(None, Some(env)).unwrap();

        assert_eq!(config.engine.workers, Some(7));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        assert!(SignalEngineConfig::load_with_env(Some(&missing), empty_env()).is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = SignalEngineConfig::default();
        config.engine.workers = Some(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroWorkers));

        let mut config = SignalEngineConfig::default();
        config.engine.queue_capacity = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroQueueCapacity));

        let mut config = SignalEngineConfig::default();
        config.strategies.push(config.strategies[0].clone());
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateStrategy("TD_BUY_SETUP".to_string()))
        );

        let mut config = SignalEngineConfig::default();
        config.engine.history_capacity = 4;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::LookbackTooLarge { lookback: 4, capacity: 4, .. })
        ));

        let mut config = SignalEngineConfig::default();
        config.strategies[1].threshold = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroThreshold { .. })));

        let mut config = SignalEngineConfig::default();
        config.session.utc_offset = Some("somewhere".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSessionZone(_))
        ));
    }

    #[test]
    fn test_renders_as_toml() {
        let rendered = SignalEngineConfig::default().to_toml_string().unwrap();
        assert!(rendered.contains("history_capacity = 250"));
        assert!(rendered.contains("TD_SELL_SETUP"));
    }
}
