//! UTC-aware instant primitives.
//!
//! All timestamps that cross a component boundary in this workspace are
//! [`UtcInstant`] — a thin wrapper over `chrono::DateTime<Utc>` constructed
//! only from already-UTC-aware sources. There is no `From<NaiveDateTime>`
//! impl: naive timestamps must be rejected at the boundary, not silently
//! assumed to be UTC.

use chrono::{DateTime, NaiveDate, Utc};

/// A UTC-aware instant. Cheap to copy; wraps `chrono::DateTime<Utc>`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcInstant(DateTime<Utc>);

/// Error returned when a timestamp cannot be accepted as UTC-aware input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaiveTimestampRejected;

impl std::fmt::Display for NaiveTimestampRejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timestamp is not UTC-aware; naive timestamps are rejected")
    }
}

impl std::error::Error for NaiveTimestampRejected {}

impl UtcInstant {
    /// Construct directly from a `chrono::DateTime<Utc>`. This is the
    /// canonical, infallible constructor: anything already typed as
    /// `DateTime<Utc>` is by definition UTC-aware.
    #[inline]
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        UtcInstant(dt)
    }

    /// Parse an RFC3339 string, rejecting any offset other than `Z`/`+00:00`
    /// implicitly handled by `chrono` (the parsed instant is converted to
    /// UTC regardless of offset — RFC3339 always carries an explicit offset,
    /// so there is no "naive" case to reject here; naive rejection applies
    /// to call sites constructing from `NaiveDateTime`, which this module
    /// intentionally provides no path for).
    pub fn parse_rfc3339(s: &str) -> Result<Self, NaiveTimestampRejected> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| UtcInstant(dt.with_timezone(&Utc)))
            .map_err(|_| NaiveTimestampRejected)
    }

    #[inline]
    pub fn as_utc(self) -> DateTime<Utc> {
        self.0
    }

    #[inline]
    pub fn date(self) -> NaiveDate {
        self.0.date_naive()
    }

    pub fn to_rfc3339(self) -> String {
        self.0.to_rfc3339()
    }

    pub fn duration_since(self, earlier: UtcInstant) -> chrono::Duration {
        self.0 - earlier.0
    }
}

impl std::fmt::Display for UtcInstant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl serde::Serialize for UtcInstant {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl<'de> serde::Deserialize<'de> for UtcInstant {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        UtcInstant::parse_rfc3339(&s).map_err(serde::de::Error::custom)
    }
}

/// `true` if `later`'s UTC calendar date is strictly after `earlier`'s.
///
/// Day rollover throughout this workspace is always computed this way —
/// never via local time, never via elapsed-wallclock heuristics.
pub fn utc_date_advanced(earlier: UtcInstant, later: UtcInstant) -> bool {
    later.date() > earlier.date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> UtcInstant {
        UtcInstant::from_utc(Utc.with_ymd_and_hms(y, m, d, h, mi, s).unwrap())
    }

    #[test]
    fn date_advances_across_midnight() {
        let a = utc(2026, 7, 28, 23, 59, 59);
        let b = utc(2026, 7, 29, 0, 0, 0);
        assert!(utc_date_advanced(a, b));
        assert!(!utc_date_advanced(b, a));
    }

    #[test]
    fn same_date_does_not_advance() {
        let a = utc(2026, 7, 28, 1, 0, 0);
        let b = utc(2026, 7, 28, 23, 0, 0);
        assert!(!utc_date_advanced(a, b));
    }

    #[test]
    fn rfc3339_roundtrip() {
        let original = utc(2026, 1, 2, 3, 4, 5);
        let s = original.to_rfc3339();
        let parsed = UtcInstant::parse_rfc3339(&s).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn rejects_garbage_timestamp() {
        assert!(UtcInstant::parse_rfc3339("not-a-date").is_err());
    }
}
