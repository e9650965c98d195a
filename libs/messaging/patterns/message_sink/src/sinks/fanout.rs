use crate::{FiredSignal, SignalSink, SinkError};
use std::sync::Arc;

/// Forwards every signal to all inner sinks
///
/// All sinks are attempted even when one fails; the first failure is
/// reported as [`SinkError::Partial`].
#[derive(Debug, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn SignalSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn SignalSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl SignalSink for FanoutSink {
    fn record_signal(&self, signal: FiredSignal) -> Result<(), SinkError> {
        let mut failed = 0;
        let mut first = None;

        for sink in &self.sinks {
            if let Err(e) = sink.record_signal(signal.clone()) {
                failed += 1;
                first.get_or_insert(e);
            }
        }

        match first {
            None => Ok(()),
            Some(first) => Err(SinkError::Partial {
                failed,
                total: self.sinks.len(),
                first: Box::new(first),
            }),
        }
    }

    fn name(&self) -> &str {
        "fanout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{CollectorSink, FailingSink};

    fn signal() -> FiredSignal {
        FiredSignal {
            strategy_id: "TD_BUY_SETUP".to_string(),
            instrument_id: "AAPL".to_string(),
            price: 180.0,
            event_time_ms: 0,
        }
    }

    #[test]
    fn test_reaches_every_sink_despite_failure() {
        let first = Arc::new(CollectorSink::new());
        let second = Arc::new(CollectorSink::new());
        let fanout = FanoutSink::new()
            .with_sink(first.clone())
            .with_sink(Arc::new(FailingSink::new()))
            .with_sink(second.clone());

        let err = fanout.record_signal(signal()).unwrap_err();

        assert!(matches!(err, SinkError::Partial { failed: 1, total: 3, .. }));
        assert_eq!(first.signal_count(), 1);
        assert_eq!(second.signal_count(), 1);
    }

    #[test]
    fn test_empty_fanout_accepts() {
        let fanout = FanoutSink::new();
        assert!(fanout.is_empty());
        assert!(fanout.record_signal(signal()).is_ok());
    }
}
