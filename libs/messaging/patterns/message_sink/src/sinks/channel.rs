use crate::{FiredSignal, SignalSink, SinkError};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Hands signals to a downstream consumer over a bounded channel
///
/// Never blocks the calling worker: a full channel yields
/// [`SinkError::BufferFull`] and the signal is dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<FiredSignal>,
    capacity: usize,
}

impl ChannelSink {
    /// Create the sink and the receiving end for the downstream writer
    pub fn bounded(capacity: usize) -> (Self, Receiver<FiredSignal>) {
        let (sender, receiver) = bounded(capacity);
        (Self { sender, capacity }, receiver)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl SignalSink for ChannelSink {
    fn record_signal(&self, signal: FiredSignal) -> Result<(), SinkError> {
        match self.sender.try_send(signal) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(signal)) => Err(SinkError::BufferFull {
                strategy_id: signal.strategy_id,
                instrument_id: signal.instrument_id,
                capacity: self.capacity,
            }),
            Err(TrySendError::Disconnected(_)) => Err(SinkError::Closed),
        }
    }

    fn name(&self) -> &str {
        "channel"
    }
}
