//! Tick value type

use serde::{Deserialize, Serialize};

/// One price observation for one instrument at one instant.
///
/// Built once per inbound message by the dispatch layer and moved into the
/// owning shard. Fields are read-only after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    instrument_id: String,
    price: f64,
    /// Secondary aggregate published alongside the price (running average)
    avg_price: f64,
    volume: u64,
    event_time_ms: i64,
}

impl Tick {
    pub fn new(
        instrument_id: impl Into<String>,
        price: f64,
        avg_price: f64,
        volume: u64,
        event_time_ms: i64,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            price,
            avg_price,
            volume,
            event_time_ms,
        }
    }

    pub fn instrument_id(&self) -> &str {
        &self.instrument_id
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn avg_price(&self) -> f64 {
        self.avg_price
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }

    pub fn event_time_ms(&self) -> i64 {
        self.event_time_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_accessors() {
        let tick = Tick::new("600519", 1688.5, 1680.25, 1200, 1_700_000_000_000);

        assert_eq!(tick.instrument_id(), "600519");
        assert_eq!(tick.price(), 1688.5);
        assert_eq!(tick.avg_price(), 1680.25);
        assert_eq!(tick.volume(), 1200);
        assert_eq!(tick.event_time_ms(), 1_700_000_000_000);
    }

    #[test]
    fn test_tick_serde_field_names() {
        let tick = Tick::new("AAPL", 190.0, 189.5, 10, 42);
        let json = serde_json::to_value(&tick).unwrap();

        assert_eq!(json["instrument_id"], "AAPL");
        assert_eq!(json["event_time_ms"], 42);
    }
}
