//! Configuration validation errors

use thiserror::Error;
use types::SessionZoneError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Worker count must be at least 1")]
    ZeroWorkers,

    #[error("Shard queue capacity must be at least 1")]
    ZeroQueueCapacity,

    #[error("Price history capacity must be at least 1")]
    ZeroHistoryCapacity,

    #[error("Strategy id must not be empty")]
    EmptyStrategyId,

    #[error("Duplicate strategy id '{0}'")]
    DuplicateStrategy(String),

    #[error("Strategy '{id}': trigger threshold must be at least 1")]
    ZeroThreshold { id: String },

    #[error("Strategy '{id}': lookback {lookback} needs more history than capacity {capacity} holds")]
    LookbackTooLarge {
        id: String,
        lookback: usize,
        capacity: usize,
    },

    #[error("Session zone: {0}")]
    InvalidSessionZone(#[from] SessionZoneError),
}
