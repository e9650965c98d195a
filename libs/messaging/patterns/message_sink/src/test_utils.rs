//! Test doubles for code that records signals

use crate::{FiredSignal, SignalSink, SinkError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Records every signal in memory
#[derive(Debug)]
pub struct CollectorSink {
    signals: Mutex<Vec<FiredSignal>>,
    fail_on_record: AtomicBool,
    rejected: AtomicU64,
    name: String,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::with_name("test-collector")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            signals: Mutex::new(Vec::new()),
            fail_on_record: AtomicBool::new(false),
            rejected: AtomicU64::new(0),
            name: name.into(),
        }
    }

    /// All recorded signals in arrival order
    pub fn received_signals(&self) -> Vec<FiredSignal> {
        self.signals.lock().clone()
    }

    pub fn signal_count(&self) -> usize {
        self.signals.lock().len()
    }

    /// Signals recorded for one (strategy, instrument) pair
    pub fn signals_for(&self, strategy_id: &str, instrument_id: &str) -> Vec<FiredSignal> {
        self.signals
            .lock()
            .iter()
            .filter(|s| s.strategy_id == strategy_id && s.instrument_id == instrument_id)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.signals.lock().clear();
    }

    /// Reject every following signal until switched off again
    pub fn set_failing(&self, failing: bool) {
        self.fail_on_record.store(failing, Ordering::Relaxed);
    }

    pub fn rejected_count(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

impl Default for CollectorSink {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalSink for CollectorSink {
    fn record_signal(&self, signal: FiredSignal) -> Result<(), SinkError> {
        if self.fail_on_record.load(Ordering::Relaxed) {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            return Err(SinkError::send_failed("collector configured to fail"));
        }
        self.signals.lock().push(signal);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Rejects every signal
#[derive(Debug, Default)]
pub struct FailingSink {
    attempts: AtomicU64,
}

impl FailingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }
}

impl SignalSink for FailingSink {
    fn record_signal(&self, _signal: FiredSignal) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        Err(SinkError::Closed)
    }

    fn name(&self) -> &str {
        "failing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_failure_toggle() {
        let sink = CollectorSink::new();
        let signal = FiredSignal {
            strategy_id: "S".to_string(),
            instrument_id: "I".to_string(),
            price: 1.0,
            event_time_ms: 0,
        };

        sink.set_failing(true);
        assert!(sink.record_signal(signal.clone()).is_err());
        sink.set_failing(false);
        assert!(sink.record_signal(signal).is_ok());

        assert_eq!(sink.rejected_count(), 1);
        assert_eq!(sink.signals_for("S", "I").len(), 1);
    }
}
