//! Candidate field names per tick attribute

/// Tick attributes resolved from inbound messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickField {
    Instrument,
    Price,
    AvgPrice,
    Volume,
    EventTime,
}

impl TickField {
    pub fn label(self) -> &'static str {
        match self {
            TickField::Instrument => "instrument id",
            TickField::Price => "price",
            TickField::AvgPrice => "average price",
            TickField::Volume => "volume",
            TickField::EventTime => "event time",
        }
    }
}

const INSTRUMENT_KEYS: &[&str] = &[
    "instrument_id",
    "instrumentId",
    "symbol",
    "code",
    "ts_code",
    "secCode",
    "stock_code",
    "ticker",
    "s",
];

const PRICE_KEYS: &[&str] = &[
    "price",
    "close",
    "last",
    "lastPrice",
    "last_price",
    "current",
    "c",
    "p",
];

const AVG_PRICE_KEYS: &[&str] = &[
    "avg_price",
    "avgPrice",
    "average",
    "averagePrice",
    "vwap",
];

const VOLUME_KEYS: &[&str] = &["volume", "vol", "qty", "quantity", "v"];

const TIME_KEYS: &[&str] = &[
    "event_time",
    "eventTime",
    "timestamp",
    "time",
    "datetime",
    "trade_time",
    "tradeTime",
    "ts",
    "T",
    "E",
];

/// Prioritized candidate keys; earlier keys win
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAliases {
    instrument: Vec<String>,
    price: Vec<String>,
    avg_price: Vec<String>,
    volume: Vec<String>,
    event_time: Vec<String>,
}

impl Default for FieldAliases {
    fn default() -> Self {
        let owned = |keys: &[&str]| keys.iter().map(|k| k.to_string()).collect();
        Self {
            instrument: owned(INSTRUMENT_KEYS),
            price: owned(PRICE_KEYS),
            avg_price: owned(AVG_PRICE_KEYS),
            volume: owned(VOLUME_KEYS),
            event_time: owned(TIME_KEYS),
        }
    }
}

impl FieldAliases {
    pub fn keys(&self, field: TickField) -> &[String] {
        match field {
            TickField::Instrument => &self.instrument,
            TickField::Price => &self.price,
            TickField::AvgPrice => &self.avg_price,
            TickField::Volume => &self.volume,
            TickField::EventTime => &self.event_time,
        }
    }

    /// Append extra candidates after the built-in ones, skipping duplicates
    pub fn extend<I, S>(&mut self, field: TickField, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = match field {
            TickField::Instrument => &mut self.instrument,
            TickField::Price => &mut self.price,
            TickField::AvgPrice => &mut self.avg_price,
            TickField::Volume => &mut self.volume,
            TickField::EventTime => &mut self.event_time,
        };
        for key in keys {
            let key = key.into();
            if !list.contains(&key) {
                list.push(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_appends_after_builtin_keys() {
        let mut aliases = FieldAliases::default();
        aliases.extend(TickField::Instrument, ["windcode", "symbol"]);

        let keys = aliases.keys(TickField::Instrument);
        assert_eq!(keys.first().map(String::as_str), Some("instrument_id"));
        assert_eq!(keys.last().map(String::as_str), Some("windcode"));
        assert_eq!(keys.iter().filter(|k| *k == "symbol").count(), 1);
    }
}
