//! # Torq Signal Strategies
//!
//! ## Purpose
//!
//! Stateful signal detectors evaluated on every tick by the shard workers of
//! the signal engine, plus the per-instrument state they run against.
//!
//! ## Architecture Role
//!
//! ```text
//! Tick → InstrumentContext::record → for each Strategy in StrategySet
//!                 │                          │
//!          PriceRing (history)        evaluate(tick, ctx) → fired?
//!          CounterTable (state)              │
//!                                      FiredSignal → sink
//! ```
//!
//! ## Contract
//!
//! [`Strategy::evaluate`] must not block, perform I/O or allocate per tick
//! beyond its counter keys, and may only mutate the counters of the context
//! it is handed. Each [`InstrumentContext`] belongs to exactly one shard
//! worker, so no locking happens here.
//!
//! ## Strategy Family
//!
//! [`TurnCountStrategy`] implements the turn-counting setup once, with the
//! comparison direction as its only variant axis:
//!
//! - **Bullish**: close strictly below the close `lookback` sessions ago
//! - **Bearish**: close strictly above the close `lookback` sessions ago
//!
//! A streak of `threshold` consecutive qualifying closes fires once and
//! resets the counter.

pub mod context;
pub mod counters;
pub mod error;
pub mod history;
pub mod registry;
pub mod traits;
pub mod turn_count;

pub use context::{ContextSnapshot, InstrumentContext};
pub use counters::CounterTable;
pub use error::{Result, StrategyError};
pub use history::PriceRing;
pub use registry::StrategySet;
pub use traits::Strategy;
pub use turn_count::{TurnCountParams, TurnCountStrategy, TurnDirection};
