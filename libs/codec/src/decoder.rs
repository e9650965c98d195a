//! Message → Tick decoding

use serde_json::{Map, Value};
use tracing::debug;
use types::{current_timestamp_ms, SessionClock, Tick};

use crate::error::DecodeError;
use crate::fields::{FieldAliases, TickField};
use crate::timestamp::parse_event_time;

/// Per-entry outcome of one inbound message
pub type DecodedBatch = Vec<Result<Tick, DecodeError>>;

/// Envelope key some producers wrap their payload in
const ENVELOPE_KEY: &str = "data";

#[derive(Debug, Clone)]
pub struct TickDecoder {
    aliases: FieldAliases,
    clock: SessionClock,
}

impl TickDecoder {
    /// `clock` supplies the zone for timestamps written without an offset
    pub fn new(aliases: FieldAliases, clock: SessionClock) -> Self {
        Self { aliases, clock }
    }

    pub fn aliases(&self) -> &FieldAliases {
        &self.aliases
    }

    /// Decode raw relay bytes
    ///
    /// The outer error covers the whole message; entries of a batch fail
    /// independently.
    pub fn decode(&self, payload: &[u8]) -> Result<DecodedBatch, DecodeError> {
        let value: Value = serde_json::from_slice(payload)
            .map_err(|e| DecodeError::invalid_json(&e, payload.len()))?;
        self.decode_message(&value)
    }

    pub fn decode_message(&self, value: &Value) -> Result<DecodedBatch, DecodeError> {
        match value {
            Value::Object(map) => {
                if self.lookup(map, TickField::Instrument).is_none() {
                    if let Some(inner @ (Value::Object(_) | Value::Array(_))) = map.get(ENVELOPE_KEY)
                    {
                        return self.decode_message(inner);
                    }
                }
                Ok(vec![self.decode_object(map)])
            }
            Value::Array(items) => Ok(items.iter().map(|item| self.decode_tick(item)).collect()),
            other => Err(DecodeError::UnexpectedShape {
                found: value_kind(other),
            }),
        }
    }

    /// Decode a single tick object
    pub fn decode_tick(&self, value: &Value) -> Result<Tick, DecodeError> {
        match value {
            Value::Object(map) => self.decode_object(map),
            other => Err(DecodeError::UnexpectedShape {
                found: value_kind(other),
            }),
        }
    }

    fn decode_object(&self, map: &Map<String, Value>) -> Result<Tick, DecodeError> {
        let instrument_id = self.instrument_id(map)?;
        let price = self.price(map, TickField::Price)?.unwrap_or(0.0);
        let avg_price = self.price(map, TickField::AvgPrice)?.unwrap_or(0.0);
        let volume = self.volume(map)?.unwrap_or(0);
        let event_time_ms = self.event_time(map, &instrument_id);

        Ok(Tick::new(instrument_id, price, avg_price, volume, event_time_ms))
    }

    /// First candidate key that is present and not null
    fn lookup<'a>(
        &self,
        map: &'a Map<String, Value>,
        field: TickField,
    ) -> Option<(&'a str, &'a Value)> {
        self.aliases.keys(field).iter().find_map(|key| {
            map.get_key_value(key.as_str())
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| (key.as_str(), value))
        })
    }

    fn instrument_id(&self, map: &Map<String, Value>) -> Result<String, DecodeError> {
        let field = TickField::Instrument;
        let (key, raw) = self
            .lookup(map, field)
            .ok_or_else(|| DecodeError::MissingField {
                field: field.label(),
                tried: self.aliases.keys(field).to_vec(),
            })?;

        match raw {
            Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(DecodeError::invalid_value(field.label(), key, other)),
        }
    }

    fn price(&self, map: &Map<String, Value>, field: TickField) -> Result<Option<f64>, DecodeError> {
        let Some((key, raw)) = self.lookup(map, field) else {
            return Ok(None);
        };

        numeric(raw)
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(Some)
            .ok_or_else(|| DecodeError::invalid_value(field.label(), key, raw))
    }

    fn volume(&self, map: &Map<String, Value>) -> Result<Option<u64>, DecodeError> {
        let field = TickField::Volume;
        let Some((key, raw)) = self.lookup(map, field) else {
            return Ok(None);
        };

        let parsed = match raw {
            Value::Number(n) => n.as_u64().or_else(|| float_volume(n.as_f64())),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<u64>()
                    .ok()
                    .or_else(|| float_volume(s.parse::<f64>().ok()))
            }
            _ => None,
        };

        parsed
            .map(Some)
            .ok_or_else(|| DecodeError::invalid_value(field.label(), key, raw))
    }

    fn event_time(&self, map: &Map<String, Value>, instrument_id: &str) -> i64 {
        match self.lookup(map, TickField::EventTime) {
            Some((key, raw)) => parse_event_time(raw, &self.clock).unwrap_or_else(|| {
                debug!(
                    instrument = %instrument_id,
                    key,
                    raw = %raw,
                    "Unparsable event time, using current time"
                );
                current_timestamp_ms()
            }),
            None => current_timestamp_ms(),
        }
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Volumes written as floats (`3.0`, `"1200.0"`) must still be whole shares
fn float_volume(value: Option<f64>) -> Option<u64> {
    value
        .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0 && *v < u64::MAX as f64)
        .map(|v| v as u64)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
