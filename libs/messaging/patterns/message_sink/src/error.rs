use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SinkError {
    #[error("Buffer full, signal dropped ({strategy_id} on {instrument_id}, capacity {capacity})")]
    BufferFull {
        strategy_id: String,
        instrument_id: String,
        capacity: usize,
    },

    #[error("Sink closed")]
    Closed,

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Partial failure: {failed} of {total} sinks rejected the signal ({first})")]
    Partial {
        failed: usize,
        total: usize,
        first: Box<SinkError>,
    },
}

impl SinkError {
    /// Check if a later signal could still succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            SinkError::BufferFull { .. } | SinkError::SendFailed(_) => true,
            SinkError::Closed => false,
            SinkError::Partial { first, .. } => first.is_recoverable(),
        }
    }

    pub fn send_failed(msg: impl Into<String>) -> Self {
        SinkError::SendFailed(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability() {
        assert!(SinkError::send_failed("timeout").is_recoverable());
        assert!(!SinkError::Closed.is_recoverable());

        let partial = SinkError::Partial {
            failed: 1,
            total: 2,
            first: Box::new(SinkError::Closed),
        };
        assert!(!partial.is_recoverable());
        assert!(partial.to_string().contains("1 of 2"));
    }
}
