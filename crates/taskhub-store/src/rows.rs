//! Column conversion helpers shared by the per-table modules.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use taskhub_shared::ValidationError;
use uuid::Uuid;

/// Timestamps are stored as RFC 3339 text with microsecond precision, which
/// sorts correctly as text.
pub(crate) fn fmt_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_uuid(idx: usize, raw: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// A persisted row that no longer satisfies its entity's invariants.
pub(crate) fn invalid_row(idx: usize, err: ValidationError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_round_trip_at_micros() {
        let ts = DateTime::from_timestamp_micros(1_700_000_000_123_456).unwrap();
        let text = fmt_ts(&ts);
        assert_eq!(text, "2023-11-14T22:13:20.123456Z");
        assert_eq!(parse_ts(0, &text).unwrap(), ts);
    }

    #[test]
    fn bad_uuid_reports_column() {
        match parse_uuid(3, "nope") {
            Err(rusqlite::Error::FromSqlConversionFailure(idx, _, _)) => assert_eq!(idx, 3),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
