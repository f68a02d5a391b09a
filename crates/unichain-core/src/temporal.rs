//! # UTC Timestamps
//!
//! `Timestamp` is the block timestamp type: UTC only, truncated to seconds,
//! rendered as `YYYY-MM-DDTHH:MM:SSZ`. Non-UTC inputs are rejected at parse
//! time so that a block has exactly one canonical timestamp string.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::UniChainError;

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// The Unix epoch, used as the genesis block timestamp.
    pub fn epoch() -> Self {
        Self(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Parse an RFC 3339 string. Only the `Z` suffix is accepted; explicit
    /// offsets, including `+00:00`, are rejected.
    pub fn parse(s: &str) -> Result<Self, UniChainError> {
        if !s.ends_with('Z') {
            return Err(UniChainError::Parse(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| UniChainError::Parse(format!("invalid RFC 3339 timestamp {s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// From Unix epoch seconds.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, UniChainError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| UniChainError::Parse(format!("invalid Unix timestamp: {secs}")))
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_has_no_subseconds() {
        assert_eq!(Timestamp::now().as_datetime().nanosecond(), 0);
    }

    #[test]
    fn test_from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2024, 7, 1, 9, 30, 45).unwrap();
        let ts = Timestamp::from_utc(dt.with_nanosecond(987_654_321).unwrap());
        assert_eq!(ts.to_iso8601(), "2024-07-01T09:30:45Z");
    }

    #[test]
    fn test_epoch_renders_fixed() {
        assert_eq!(Timestamp::epoch().to_iso8601(), "1970-01-01T00:00:00Z");
        assert_eq!(Timestamp::epoch().epoch_secs(), 0);
    }

    #[test]
    fn test_parse_rejects_offsets() {
        assert!(Timestamp::parse("2024-07-01T09:30:45Z").is_ok());
        assert!(Timestamp::parse("2024-07-01T09:30:45+00:00").is_err());
        assert!(Timestamp::parse("2024-07-01T11:30:45+02:00").is_err());
        assert!(Timestamp::parse("not-a-date").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn test_parse_truncates_subseconds() {
        let ts = Timestamp::parse("2024-07-01T09:30:45.500Z").unwrap();
        assert_eq!(ts.to_string(), "2024-07-01T09:30:45Z");
    }

    #[test]
    fn test_epoch_secs_roundtrip() {
        let ts = Timestamp::parse("2024-07-01T09:30:45Z").unwrap();
        assert_eq!(Timestamp::from_epoch_secs(ts.epoch_secs()).unwrap(), ts);
    }

    #[test]
    fn test_serde_is_iso_string() {
        let ts = Timestamp::parse("2024-07-01T09:30:45Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2024-07-01T09:30:45Z\"");
        assert_eq!(serde_json::from_str::<Timestamp>(&json).unwrap(), ts);
    }
}
