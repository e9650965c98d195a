//! Wall-clock helpers

use chrono::Utc;

/// Current wall-clock time as epoch milliseconds.
///
/// Used as the event-time fallback when an inbound message carries no
/// parsable timestamp.
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_timestamp_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(current_timestamp_ms() > 1_577_836_800_000);
    }
}
