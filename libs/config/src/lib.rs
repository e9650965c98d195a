//! # Torq Signal Engine Configuration
//!
//! Every tunable of the signal engine lives in [`SignalEngineConfig`]:
//! worker count, queue bounds and backpressure, ring-buffer capacity, the
//! session-close boundary, the strategy roster, extra dispatch field names,
//! relay connection and logging.
//!
//! Values are fixed at startup; restart the service to change them.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use torq_config::SignalEngineConfig;
//! use std::path::Path;
//!
//! let config = SignalEngineConfig::load(Some(Path::new("config/signal_engine.toml")))?;
//! config.validate()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod error;
pub mod settings;
pub mod signal_engine;

pub use error::ConfigError;
pub use settings::{
    BackpressurePolicy, DispatchSettings, EngineSettings, LoggingSettings, RelaySettings,
    SessionSettings, StrategyDefinition, StrategyKind,
};
pub use signal_engine::{SignalEngineConfig, ENV_PREFIX};
