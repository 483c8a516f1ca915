//! Timestamp parsing for reference data.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use featlab_core::{Error, Result, TimestampMs};

/// Integer epochs at or above this magnitude are read as milliseconds.
const EPOCH_MS_THRESHOLD: u64 = 100_000_000_000;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a timestamp cell into milliseconds since the epoch (UTC).
///
/// Accepts RFC 3339, naive date-times (treated as UTC), bare dates and integer
/// epochs in seconds or milliseconds.
pub fn parse_timestamp(raw: &str) -> Result<TimestampMs> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(Error::data("empty timestamp"));
    }

    if let Ok(n) = s.parse::<i64>() {
        return epoch_millis(n)
            .ok_or_else(|| Error::data(format!("epoch timestamp out of range: {raw}")));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp_millis());
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    Err(Error::data(format!("unrecognized timestamp: {raw}")))
}

/// Integer epoch in seconds or milliseconds, `None` outside the calendar range.
fn epoch_millis(n: i64) -> Option<TimestampMs> {
    let ms = if n.unsigned_abs() >= EPOCH_MS_THRESHOLD {
        n
    } else {
        n.checked_mul(1000)?
    };
    DateTime::<Utc>::from_timestamp_millis(ms).map(|_| ms)
}
