//! Per-instrument mutable state

use std::collections::BTreeMap;
use types::Tick;

use crate::counters::CounterTable;
use crate::history::PriceRing;

/// Price history and strategy counters for one instrument
///
/// Created lazily by the owning shard on the instrument's first tick and
/// kept for the life of the process. Only that shard's worker thread ever
/// touches it.
#[derive(Debug, Clone)]
pub struct InstrumentContext {
    instrument_id: String,
    history: PriceRing,
    counters: CounterTable,
    ticks_seen: u64,
    last_event_time_ms: Option<i64>,
}

impl InstrumentContext {
    pub fn new(instrument_id: impl Into<String>, history_capacity: usize) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            history: PriceRing::new(history_capacity),
            counters: CounterTable::new(),
            ticks_seen: 0,
            last_event_time_ms: None,
        }
    }

    /// Append the tick's price to history; done before strategies run, so
    /// `history().lookback(0)` is the current tick's price during evaluation
    pub fn record(&mut self, tick: &Tick) {
        self.history.push(tick.price());
        self.ticks_seen += 1;
        self.last_event_time_ms = Some(tick.event_time_ms());
    }

    pub fn instrument_id(&self) -> &str {
        &self.instrument_id
    }

    pub fn history(&self) -> &PriceRing {
        &self.history
    }

    pub fn counters(&self) -> &CounterTable {
        &self.counters
    }

    pub fn counters_mut(&mut self) -> &mut CounterTable {
        &mut self.counters
    }

    pub fn ticks_seen(&self) -> u64 {
        self.ticks_seen
    }

    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            instrument_id: self.instrument_id.clone(),
            history_len: self.history.len(),
            history_capacity: self.history.capacity(),
            latest_price: self.history.latest(),
            ticks_seen: self.ticks_seen,
            last_event_time_ms: self.last_event_time_ms,
            counters: self.counters.to_sorted(),
        }
    }
}

/// Point-in-time copy of an [`InstrumentContext`] for diagnostics and tests
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSnapshot {
    pub instrument_id: String,
    pub history_len: usize,
    pub history_capacity: usize,
    pub latest_price: Option<f64>,
    pub ticks_seen: u64,
    pub last_event_time_ms: Option<i64>,
    pub counters: BTreeMap<String, i64>,
}

impl ContextSnapshot {
    /// Counter value, zero when the strategy never wrote it
    pub fn counter(&self, key: &str) -> i64 {
        self.counters.get(key).copied().unwrap_or(0)
    }
}
