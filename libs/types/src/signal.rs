//! Fired signal handed to the result sink

use crate::tick::Tick;
use serde::{Deserialize, Serialize};

/// A strategy trigger for one instrument.
///
/// Constructed by the shard worker at the moment a strategy reports "fired";
/// ownership passes to the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiredSignal {
    pub strategy_id: String,
    pub instrument_id: String,
    /// Price of the tick that completed the streak
    pub price: f64,
    pub event_time_ms: i64,
}

impl FiredSignal {
    pub fn from_tick(strategy_id: &str, tick: &Tick) -> Self {
        Self {
            strategy_id: strategy_id.to_string(),
            instrument_id: tick.instrument_id().to_string(),
            price: tick.price(),
            event_time_ms: tick.event_time_ms(),
        }
    }
}
