//! ISO-8601 text form of `last_visited`.
//!
//! Timestamps are stored as UTC without an offset suffix, e.g.
//! `2025-09-03T10:00:00`, with a fractional part only when it is non-zero.
//! Values written by other tools with a trailing `Z` or an explicit offset
//! are accepted on read and normalized to UTC.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.naive_utc().format(NAIVE_FORMAT).to_string()
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw.trim_end_matches('Z'), NAIVE_FORMAT)?;
    Ok(Utc.from_utc_datetime(&naive))
}
