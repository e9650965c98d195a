//! Strategy contract

use std::fmt::Debug;
use types::Tick;

use crate::context::InstrumentContext;
use crate::error::Result;

/// A signal detector evaluated once per tick per instrument
///
/// Implementations are shared read-only by every shard worker; all mutable
/// state lives in the [`InstrumentContext`] counters.
pub trait Strategy: Send + Sync + Debug {
    /// Stable identifier, used to namespace counters and route signals
    fn id(&self) -> &str;

    /// Returns `Ok(true)` when the tick completes a signal
    ///
    /// "Condition not met" is `Ok(false)`. Errors are reported to the engine,
    /// which logs them and carries on with the remaining strategies.
    fn evaluate(&self, tick: &Tick, ctx: &mut InstrumentContext) -> Result<bool>;
}
