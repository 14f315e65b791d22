//! DateTime parsing and normalization helpers.
//!
//! Upstream date-heuristic extraction hands us loosely formatted date
//! strings; the store compares timestamps at UTC second precision.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse a datetime string in various common formats into a UTC [`DateTime`].
///
/// Supported formats (attempted in order):
/// 1. RFC 3339 / ISO 8601 with timezone: `"2024-01-15T10:30:00Z"`, `"2024-01-15T10:30:00+05:00"`
/// 2. ISO 8601 with sub-seconds but no timezone (assumed UTC): `"2024-01-15T10:30:00.123"`
/// 3. ISO 8601 without timezone (assumed UTC): `"2024-01-15T10:30:00"`
/// 4. Date only (midnight UTC): `"2024-01-15"`
/// 5. US date format (midnight UTC): `"01/15/2024"`
///
/// Returns `None` for empty input or unrecognised formats.
pub fn parse_flexible_datetime(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&ndt));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&ndt));
    }

    if let Ok(nd) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return nd
            .and_hms_opt(0, 0, 0)
            .map(|ndt| Utc.from_utc_datetime(&ndt));
    }

    if let Ok(nd) = NaiveDate::parse_from_str(s, "%m/%d/%Y") {
        return nd
            .and_hms_opt(0, 0, 0)
            .map(|ndt| Utc.from_utc_datetime(&ndt));
    }

    None
}

/// Drop sub-second precision from a timestamp.
///
/// Stored and proposed timestamps are compared at second precision, so both
/// sides pass through here before equality checks.
pub fn truncate_to_seconds(dt: &DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_opt(dt.timestamp(), 0)
        .single()
        .unwrap_or(*dt)
}

/// Format a [`DateTime<Utc>`] as a store datetime literal.
///
/// Output format: `"2024-01-15T10:30:00"` (ISO 8601, second precision, UTC).
pub fn format_store_timestamp(dt: &DateTime<Utc>) -> String {
    truncate_to_seconds(dt)
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}
