//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parses an ISO8601/RFC3339 string as sent by the backend.
    pub fn parse_rfc3339(s: &str) -> Result<Self, ValidationError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| ValidationError::invalid_format("timestamp", e.to_string()))
    }

    /// Formats the timestamp as an RFC3339 string.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Checks if this timestamp lies in the past.
    pub fn is_past(&self) -> bool {
        self.0 < Utc::now()
    }

    /// Creates a new timestamp by adding the specified number of days.
    ///
    /// Negative values subtract days.
    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn parse_rfc3339_accepts_backend_format() {
        let ts = Timestamp::parse_rfc3339("2026-06-01T00:00:00Z").unwrap();
        assert_eq!(ts.as_datetime().year(), 2026);
        assert_eq!(ts.as_datetime().month(), 6);
    }

    #[test]
    fn parse_rfc3339_rejects_garbage() {
        assert!(Timestamp::parse_rfc3339("next tuesday").is_err());
    }

    #[test]
    fn parse_rfc3339_normalizes_offsets_to_utc() {
        let ts = Timestamp::parse_rfc3339("2026-06-01T02:00:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-06-01T00:00:00+00:00");
    }

    #[test]
    fn ordering_follows_chronology() {
        let early = Timestamp::parse_rfc3339("2025-01-01T00:00:00Z").unwrap();
        let late = Timestamp::parse_rfc3339("2026-06-01T00:00:00Z").unwrap();

        assert!(early.is_before(&late));
        assert!(late.is_after(&early));
        assert!(early < late);
    }

    #[test]
    fn add_days_moves_forward() {
        let ts = Timestamp::parse_rfc3339("2026-01-01T00:00:00Z").unwrap();
        let later = ts.add_days(30);
        assert_eq!(later.as_datetime().day(), 31);
    }

    #[test]
    fn past_timestamp_is_past() {
        let ts = Timestamp::parse_rfc3339("2001-01-01T00:00:00Z").unwrap();
        assert!(ts.is_past());
        assert!(!Timestamp::now().add_days(365).is_past());
    }

    #[test]
    fn serializes_as_rfc3339_string() {
        let ts = Timestamp::parse_rfc3339("2026-06-01T00:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("2026-06-01"));

        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}
