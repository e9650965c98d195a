//! Turn-counting setup strategies
//!
//! Per instrument the strategy is a three-state machine:
//!
//! ```text
//! Idle (count = 0) ──qualifying close──► Counting (1..threshold)
//!      ▲                                      │
//!      ├──────── non-qualifying close ────────┤
//!      │                                      ▼
//!      └──── fire + reset ◄──── count reaches threshold
//! ```
//!
//! A close qualifies when it compares strictly (never `<=`/`>=`) against the
//! close `lookback` sessions earlier. Prices compare exactly, without
//! epsilon, to stay consistent with signals recorded historically.

use tracing::trace;
use types::{SessionClock, Tick};

use crate::context::InstrumentContext;
use crate::error::{Result, StrategyError};
use crate::traits::Strategy;

/// Comparison direction of a turn-counting variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    /// Current close strictly below the reference close
    Bullish,
    /// Current close strictly above the reference close
    Bearish,
}

impl TurnDirection {
    pub fn holds(self, current: f64, reference: f64) -> bool {
        match self {
            TurnDirection::Bullish => current < reference,
            TurnDirection::Bearish => current > reference,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnCountParams {
    /// Sessions back the comparison reaches
    pub lookback: usize,
    /// Streak length that fires the signal
    pub threshold: u32,
    /// Ticks before the session close are ignored
    pub session: SessionClock,
}

#[derive(Debug, Clone)]
pub struct TurnCountStrategy {
    id: String,
    count_key: String,
    direction: TurnDirection,
    params: TurnCountParams,
}

impl TurnCountStrategy {
    pub fn new(id: impl Into<String>, direction: TurnDirection, params: TurnCountParams) -> Self {
        let id = id.into();
        let count_key = format!("{}_COUNT", id);
        Self {
            id,
            count_key,
            direction,
            params,
        }
    }

    pub fn bullish(id: impl Into<String>, params: TurnCountParams) -> Self {
        Self::new(id, TurnDirection::Bullish, params)
    }

    pub fn bearish(id: impl Into<String>, params: TurnCountParams) -> Self {
        Self::new(id, TurnDirection::Bearish, params)
    }

    /// Counter key this strategy owns in every [`InstrumentContext`]
    pub fn count_key(&self) -> &str {
        &self.count_key
    }

    pub fn direction(&self) -> TurnDirection {
        self.direction
    }

    pub fn params(&self) -> &TurnCountParams {
        &self.params
    }

    /// Current streak length for an instrument
    pub fn count(&self, ctx: &InstrumentContext) -> i64 {
        ctx.counters().get(&self.count_key)
    }
}

impl Strategy for TurnCountStrategy {
    fn id(&self) -> &str {
        &self.id
    }

    fn evaluate(&self, tick: &Tick, ctx: &mut InstrumentContext) -> Result<bool> {
        if !self.params.session.is_after_close(tick.event_time_ms()) {
            return Ok(false);
        }

        // History includes the current tick, so lookback L needs L + 1 entries
        let Some(reference) = ctx.history().get(self.params.lookback) else {
            return Ok(false);
        };

        let current = tick.price();
        if !current.is_finite() {
            return Err(StrategyError::NonFinitePrice {
                instrument: tick.instrument_id().to_string(),
                price: current,
            });
        }

        let counters = ctx.counters_mut();
        if !self.direction.holds(current, reference) {
            counters.reset(&self.count_key);
            return Ok(false);
        }

        let count = counters.increment(&self.count_key);
        trace!(
            strategy = %self.id,
            instrument = %tick.instrument_id(),
            count,
            current,
            reference,
            "Turn count advanced"
        );

        if count >= i64::from(self.params.threshold) {
            counters.reset(&self.count_key);
            return Ok(true);
        }

        Ok(false)
    }
}
