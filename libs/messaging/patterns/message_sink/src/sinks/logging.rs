use crate::{FiredSignal, SignalSink, SinkError};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Emits one structured `info` event per signal under the `signals` target
#[derive(Debug, Default)]
pub struct LoggingSink {
    recorded: AtomicU64,
}

impl LoggingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> u64 {
        self.recorded.load(Ordering::Relaxed)
    }
}

impl SignalSink for LoggingSink {
    fn record_signal(&self, signal: FiredSignal) -> Result<(), SinkError> {
        self.recorded.fetch_add(1, Ordering::Relaxed);
        info!(
            target: "signals",
            strategy = %signal.strategy_id,
            instrument = %signal.instrument_id,
            price = signal.price,
            event_time_ms = signal.event_time_ms,
            "Signal fired"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "logging"
    }
}
