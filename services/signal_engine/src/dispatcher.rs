//! Wire message → engine hand-off
//!
//! Synchronous, stateless apart from the decoder's field aliases. A bad
//! message (or a bad entry of a batch) is logged and skipped; nothing here
//! returns an error to the caller, so a consuming loop can never be
//! stopped by its input.

use codec::{FieldAliases, TickDecoder, TickField};
use std::sync::Arc;
use torq_config::{ConfigError, DispatchSettings, SignalEngineConfig};
use tracing::warn;

use crate::engine::{ShardedEngine, SubmitStatus};

/// Per-message accounting returned by [`Dispatcher::dispatch`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub enqueued: usize,
    /// Decoded but refused by the engine (full queue or shutdown)
    pub not_enqueued: usize,
    pub malformed: usize,
}

impl DispatchSummary {
    pub fn decoded(&self) -> usize {
        self.enqueued + self.not_enqueued
    }
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    decoder: TickDecoder,
    engine: Arc<ShardedEngine>,
}

impl Dispatcher {
    pub fn new(decoder: TickDecoder, engine: Arc<ShardedEngine>) -> Self {
        Self { decoder, engine }
    }

    /// Decoder with the configured extra keys and the session zone for
    /// zone-less timestamps
    pub fn from_config(
        config: &SignalEngineConfig,
        engine: Arc<ShardedEngine>,
    ) -> Result<Self, ConfigError> {
        let decoder = TickDecoder::new(field_aliases(&config.dispatch), config.session.clock()?);
        Ok(Self::new(decoder, engine))
    }

    pub fn engine(&self) -> &Arc<ShardedEngine> {
        &self.engine
    }

    /// Decode one wire message and submit every valid tick in it
    pub fn dispatch(&self, payload: &[u8]) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        let batch = match self.decoder.decode(payload) {
            Ok(batch) => batch,
            Err(e) => {
                warn!(error = %e, bytes = payload.len(), "Dropping malformed message");
                summary.malformed += 1;
                return summary;
            }
        };

        for (index, entry) in batch.into_iter().enumerate() {
            match entry {
                Ok(tick) => match self.engine.process(tick) {
                    SubmitStatus::Enqueued => summary.enqueued += 1,
                    SubmitStatus::Dropped | SubmitStatus::Rejected => summary.not_enqueued += 1,
                },
                Err(e) => {
                    warn!(error = %e, entry = index, "Dropping malformed tick");
                    summary.malformed += 1;
                }
            }
        }

        summary
    }

    /// Newline-delimited input; blank lines are ignored
    pub fn dispatch_line(&self, line: &str) -> DispatchSummary {
        let line = line.trim();
        if line.is_empty() {
            return DispatchSummary::default();
        }
        self.dispatch(line.as_bytes())
    }
}

/// Built-in candidate keys followed by the configured ones
pub fn field_aliases(settings: &DispatchSettings) -> FieldAliases {
    let mut aliases = FieldAliases::default();
    aliases.extend(TickField::Instrument, settings.instrument_keys.iter().cloned());
    aliases.extend(TickField::Price, settings.price_keys.iter().cloned());
    aliases.extend(TickField::AvgPrice, settings.avg_price_keys.iter().cloned());
    aliases.extend(TickField::Volume, settings.volume_keys.iter().cloned());
    aliases.extend(TickField::EventTime, settings.time_keys.iter().cloned());
    aliases
}
