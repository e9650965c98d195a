//! Engine startup errors
//!
//! Only construction can fail. Once running, per-tick failures are absorbed
//! by the workers and surface as log lines and metrics.

use thiserror::Error;
use torq_config::ConfigError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid engine configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to spawn worker thread for shard {shard}: {source}")]
    SpawnFailed {
        shard: usize,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
