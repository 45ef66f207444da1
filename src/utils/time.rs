//! Time helpers
//!
//! Stored timestamps are RFC 3339 strings (UTC), matching what the
//! repositories write into SurrealDB.

use chrono::{DateTime, SecondsFormat, Utc};

/// Current instant as an RFC 3339 string (UTC, millisecond precision)
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Date prefix for order numbers: `YYMMDD` of the given instant
pub fn date_prefix(now: DateTime<Utc>) -> String {
    now.format("%y%m%d").to_string()
}

/// Parse a stored RFC 3339 timestamp; None if malformed
pub fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_date_prefix_format() {
        let dt = Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0).unwrap();
        assert_eq!(date_prefix(dt), "260826");
    }

    #[test]
    fn test_now_round_trips() {
        let now = now_rfc3339();
        assert!(parse_rfc3339(&now).is_some());
    }
}
