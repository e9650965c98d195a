//! Event-time resolution
//!
//! Accepts raw epoch milliseconds (number or digit string), RFC 3339 strings
//! with an explicit offset, or zone-less `YYYY-MM-DD HH:MM:SS[.fff]` strings,
//! which are read on the session clock's zone.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;
use types::SessionClock;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
];

/// Epoch milliseconds for a timestamp value, `None` when nothing parses
pub fn parse_event_time(value: &Value, clock: &SessionClock) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(raw) => parse_time_str(raw.trim(), clock),
        _ => None,
    }
}

fn parse_time_str(raw: &str, clock: &SessionClock) -> Option<i64> {
    if raw.is_empty() {
        return None;
    }
    if raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse::<i64>().ok();
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.timestamp_millis());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .and_then(|naive| clock.naive_to_epoch_ms(naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use serde_json::json;

    fn clock() -> SessionClock {
        SessionClock::new(
            "+08:00".parse().unwrap(),
            NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_epoch_millis_number_and_string() {
        assert_eq!(
            parse_event_time(&json!(1_717_484_400_000i64), &clock()),
            Some(1_717_484_400_000)
        );
        assert_eq!(
            parse_event_time(&json!("1717484400000"), &clock()),
            Some(1_717_484_400_000)
        );
        assert_eq!(
            parse_event_time(&json!(1_717_484_400_000.0), &clock()),
            Some(1_717_484_400_000)
        );
    }

    #[test]
    fn test_formatted_strings() {
        let expected = Some(1_717_484_400_000);
        assert_eq!(parse_event_time(&json!("2024-06-04 15:00:00"), &clock()), expected);
        assert_eq!(parse_event_time(&json!("2024-06-04T15:00:00"), &clock()), expected);
        assert_eq!(parse_event_time(&json!("2024/06/04 15:00:00"), &clock()), expected);
        assert_eq!(
            parse_event_time(&json!("2024-06-04 15:00:00.250"), &clock()),
            Some(1_717_484_400_250)
        );
        assert_eq!(
            parse_event_time(&json!("2024-06-04T07:00:00Z"), &clock()),
            expected
        );
    }

    #[test]
    fn test_unparsable_values() {
        assert_eq!(parse_event_time(&json!("yesterday"), &clock()), None);
        assert_eq!(parse_event_time(&json!(""), &clock()), None);
        assert_eq!(parse_event_time(&json!(true), &clock()), None);
        assert_eq!(parse_event_time(&Value::Null, &clock()), None);
    }
}
