//! Timestamp utilities
//!
//! Stored timestamps are RFC 3339 strings; in-memory liveness markers are
//! Unix milliseconds so they fit in an atomic.

use chrono::{DateTime, TimeZone, Utc};

use crate::{Error, Result};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp for storage (RFC 3339, UTC)
pub fn to_storage(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339()
}

/// Parse a timestamp written by [`to_storage`]
pub fn from_storage(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::InvalidTimestamp(format!("'{}': {}", value, e)))
}

/// Convert a timestamp to Unix milliseconds
pub fn to_unix_millis(timestamp: &DateTime<Utc>) -> i64 {
    timestamp.timestamp_millis()
}

/// Convert Unix milliseconds back to a timestamp
///
/// Returns `None` for values chrono cannot represent.
pub fn from_unix_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}
