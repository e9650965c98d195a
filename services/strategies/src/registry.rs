//! Strategy roster shared by all shard workers

use std::sync::Arc;
use torq_config::{ConfigError, SignalEngineConfig, StrategyDefinition, StrategyKind};
use tracing::info;
use types::SessionClock;

use crate::traits::Strategy;
use crate::turn_count::{TurnCountParams, TurnCountStrategy, TurnDirection};

/// Immutable, cheaply cloned list of strategies evaluated on every tick
///
/// Built once at startup. Evaluation order is the order of construction.
#[derive(Debug, Clone)]
pub struct StrategySet {
    strategies: Arc<[Arc<dyn Strategy>]>,
}

impl StrategySet {
    pub fn new(strategies: Vec<Arc<dyn Strategy>>) -> Self {
        Self {
            strategies: strategies.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Build strategies from roster entries, skipping disabled ones
    pub fn from_definitions<'a>(
        definitions: impl IntoIterator<Item = &'a StrategyDefinition>,
        session: SessionClock,
    ) -> Self {
        let strategies = definitions
            .into_iter()
            .filter(|definition| definition.enabled)
            .map(|definition| build_strategy(definition, session))
            .collect();
        Self::new(strategies)
    }

    /// Validate the configuration and build its enabled strategies
    pub fn from_config(config: &SignalEngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let set = Self::from_definitions(&config.strategies, config.session.clock()?);
        info!(strategies = ?set.ids(), "Strategy set built");
        Ok(set)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Strategy>> {
        self.strategies.iter()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.strategies.iter().map(|strategy| strategy.id()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Strategy>> {
        self.strategies.iter().find(|strategy| strategy.id() == id)
    }
}

fn build_strategy(definition: &StrategyDefinition, session: SessionClock) -> Arc<dyn Strategy> {
    let direction = match definition.kind {
        StrategyKind::TurnCountBullish => TurnDirection::Bullish,
        StrategyKind::TurnCountBearish => TurnDirection::Bearish,
    };
    let params = TurnCountParams {
        lookback: definition.lookback,
        threshold: definition.threshold,
        session,
    };
    Arc::new(TurnCountStrategy::new(definition.id.clone(), direction, params))
}
