//! Session clock
//!
//! Strategies only count end-of-session data. Whether a tick is "after the
//! close" depends on the exchange's local wall clock, not on UTC, so the
//! clock carries the zone the close boundary is expressed in.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, NaiveTime, TimeZone};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid UTC offset '{0}': expected a value like \"+08:00\" or \"local\"")]
pub struct SessionZoneError(pub String);

/// Time zone the session boundary is evaluated in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionZone {
    /// Process local time zone
    Local,
    Fixed(FixedOffset),
}

impl FromStr for SessionZone {
    type Err = SessionZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(SessionZone::Local);
        }
        let offset = if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
            FixedOffset::east_opt(0)
        } else {
            FixedOffset::from_str(trimmed).ok()
        };

        offset
            .map(SessionZone::Fixed)
            .ok_or_else(|| SessionZoneError(s.to_string()))
    }
}

/// Session close boundary in a specific zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    zone: SessionZone,
    close: NaiveTime,
}

impl SessionClock {
    pub fn new(zone: SessionZone, close: NaiveTime) -> Self {
        Self { zone, close }
    }

    pub fn zone(&self) -> SessionZone {
        self.zone
    }

    pub fn close(&self) -> NaiveTime {
        self.close
    }

    /// Local wall-clock reading of an epoch-millisecond timestamp
    pub fn local_time(&self, event_time_ms: i64) -> Option<NaiveTime> {
        let utc = DateTime::from_timestamp_millis(event_time_ms)?;
        let time = match self.zone {
            SessionZone::Local => utc.with_timezone(&Local).time(),
            SessionZone::Fixed(offset) => utc.with_timezone(&offset).time(),
        };
        Some(time)
    }

    /// True when the tick's local time is at or after the close boundary
    pub fn is_after_close(&self, event_time_ms: i64) -> bool {
        self.local_time(event_time_ms)
            .map(|time| time >= self.close)
            .unwrap_or(false)
    }

    /// Interpret a zone-less timestamp as a reading of this clock's zone
    pub fn naive_to_epoch_ms(&self, naive: NaiveDateTime) -> Option<i64> {
        let millis = match self.zone {
            SessionZone::Local => Local
                .from_local_datetime(&naive)
                .earliest()?
                .timestamp_millis(),
            SessionZone::Fixed(offset) => offset
                .from_local_datetime(&naive)
                .earliest()?
                .timestamp_millis(),
        };
        Some(millis)
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self {
            zone: SessionZone::Local,
            close: NaiveTime::from_hms_opt(15, 0, 0).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn shanghai_close() -> SessionClock {
        SessionClock::new(
            "+08:00".parse().unwrap(),
            NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
        )
    }

    fn ms_at(clock: &SessionClock, h: u32, m: u32, s: u32) -> i64 {
        let naive = NaiveDate::from_ymd_opt(2024, 6, 4)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap();
        clock.naive_to_epoch_ms(naive).unwrap()
    }

    #[test]
    fn test_zone_parsing() {
        assert_eq!("local".parse::<SessionZone>().unwrap(), SessionZone::Local);
        assert_eq!(
            "UTC".parse::<SessionZone>().unwrap(),
            SessionZone::Fixed(FixedOffset::east_opt(0).unwrap())
        );
        assert_eq!(
            "+08:00".parse::<SessionZone>().unwrap(),
            SessionZone::Fixed(FixedOffset::east_opt(8 * 3600).unwrap())
        );
        assert!("eight".parse::<SessionZone>().is_err());
    }

    #[test]
    fn test_close_boundary_is_inclusive() {
        let clock = shanghai_close();

        assert!(!clock.is_after_close(ms_at(&clock, 14, 59, 59)));
        assert!(clock.is_after_close(ms_at(&clock, 15, 0, 0)));
        assert!(clock.is_after_close(ms_at(&clock, 15, 0, 1)));
        assert!(clock.is_after_close(ms_at(&clock, 23, 59, 59)));
    }

    #[test]
    fn test_local_time_uses_configured_offset() {
        let clock = shanghai_close();
        // 2024-06-04T07:00:00Z is 15:00 in UTC+8
        let ms = 1_717_484_400_000;
        assert_eq!(
            clock.local_time(ms),
            Some(NaiveTime::from_hms_opt(15, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_naive_round_trip_in_fixed_zone() {
        let clock = shanghai_close();
        assert_eq!(ms_at(&clock, 15, 0, 0), 1_717_484_400_000);
    }
}
