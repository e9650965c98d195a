//! # Signal Sinks
//!
//! Destination for [`FiredSignal`]s produced by the shard workers. Every
//! worker thread writes to the same sink, so implementations must tolerate
//! concurrent callers. The engine treats `record_signal` as fire-and-forget:
//! it logs a returned error and moves on, never retrying.
//!
//! ## Provided sinks
//!
//! - [`LoggingSink`]: one structured `info` event per signal
//! - [`ChannelSink`]: non-blocking hand-off to a downstream writer thread
//! - [`FanoutSink`]: forwards to several sinks
//! - [`test_utils::CollectorSink`] / [`test_utils::FailingSink`]: test doubles

pub mod error;
pub mod sinks;
pub mod test_utils;

use std::fmt::Debug;
use std::sync::Arc;

pub use error::SinkError;
pub use sinks::{ChannelSink, FanoutSink, LoggingSink};
pub use types::FiredSignal;

/// A destination for fired signals
pub trait SignalSink: Send + Sync + Debug {
    /// Hand one signal to the sink; must not block on downstream I/O
    fn record_signal(&self, signal: FiredSignal) -> Result<(), SinkError>;

    /// Short name for logs
    fn name(&self) -> &str {
        "unnamed"
    }
}

impl<T: SignalSink + ?Sized> SignalSink for Arc<T> {
    fn record_signal(&self, signal: FiredSignal) -> Result<(), SinkError> {
        (**self).record_signal(signal)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: SignalSink + ?Sized> SignalSink for Box<T> {
    fn record_signal(&self, signal: FiredSignal) -> Result<(), SinkError> {
        (**self).record_signal(signal)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::CollectorSink;

    fn signal(strategy: &str) -> FiredSignal {
        FiredSignal {
            strategy_id: strategy.to_string(),
            instrument_id: "600000".to_string(),
            price: 8.5,
            event_time_ms: 1,
        }
    }

    #[test]
    fn test_shared_sink_forwards() {
        let collector = Arc::new(CollectorSink::with_name("shared"));
        let shared: Arc<dyn SignalSink> = collector.clone();

        shared.record_signal(signal("A")).unwrap();
        shared.record_signal(signal("B")).unwrap();

        assert_eq!(shared.name(), "shared");
        assert_eq!(collector.signal_count(), 2);
    }

    #[test]
    fn test_boxed_sink_forwards() {
        let boxed: Box<dyn SignalSink> = Box::new(CollectorSink::new());
        assert!(boxed.record_signal(signal("A")).is_ok());
        assert_eq!(boxed.name(), "test-collector");
    }
}
