//! Data model for browser history queries
//!
//! Visit timestamps in the history database use the WebKit epoch
//! (microseconds since 1601-01-01 UTC). This module owns the conversion to
//! and from conventional local time, the `VisitRecord` row type, and the
//! `QueryWindow` time filter.

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seconds between the WebKit epoch (1601-01-01) and the Unix epoch
const WEBKIT_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

/// Microseconds per second, the unit both visit fields are stored in
const MICROS_PER_SEC: i64 = 1_000_000;

/// Timestamp format used for parsing `--since` and rendering visit times
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Error for a `--since` value that is neither a date nor a date-time
#[derive(Debug, Error)]
pub enum WindowParseError {
    #[error("Invalid time filter: '{0}'. Expected YYYY-MM-DD or YYYY-MM-DD hh:mm")]
    InvalidSince(String),
}

/// A single visit row from the history database
///
/// Immutable once constructed; `visit_time` is already rendered in local
/// time and `visit_duration_seconds` is already converted from microseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRecord {
    /// Visited URL
    pub url: String,
    /// Page title recorded for the URL
    pub title: String,
    /// Visit time in local wall-clock time
    #[serde(with = "visit_time_format")]
    pub visit_time: NaiveDateTime,
    /// How long the page was open, in seconds
    pub visit_duration_seconds: f64,
}

impl std::fmt::Display for VisitRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | {:.1}s | {} | {}",
            self.visit_time.format(TIMESTAMP_FORMAT),
            self.visit_duration_seconds,
            self.url,
            self.title
        )
    }
}

/// Serde helpers rendering `visit_time` as `YYYY-MM-DD HH:MM:SS`
mod visit_time_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Half-open time filter: only visits strictly after `since` match
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryWindow {
    /// Lower bound (exclusive), in local time
    pub since: NaiveDateTime,
}

impl QueryWindow {
    /// Creates a window starting at the given local time
    pub fn since(since: NaiveDateTime) -> Self {
        Self { since }
    }

    /// Default window: start of yesterday (local midnight minus 24 hours)
    pub fn start_of_yesterday() -> Self {
        let midnight = Local::now().date_naive().and_time(NaiveTime::MIN);
        Self {
            since: midnight - chrono::Duration::days(1),
        }
    }

    /// Parses a `--since` argument
    ///
    /// Accepts `YYYY-MM-DD hh:mm` or a bare `YYYY-MM-DD` (interpreted as
    /// local midnight).
    pub fn parse(raw: &str) -> Result<Self, WindowParseError> {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M") {
            return Ok(Self::since(dt));
        }
        if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(Self::since(date.and_time(NaiveTime::MIN)));
        }
        Err(WindowParseError::InvalidSince(raw.to_string()))
    }
}

impl Default for QueryWindow {
    fn default() -> Self {
        Self::start_of_yesterday()
    }
}

/// Converts a stored WebKit timestamp to seconds since the Unix epoch
pub fn unix_secs_from_webkit(micros: i64) -> i64 {
    micros / MICROS_PER_SEC - WEBKIT_EPOCH_OFFSET_SECS
}

/// Converts a stored WebKit timestamp to local wall-clock time
///
/// Out-of-range values clamp to the Unix epoch rather than failing; the
/// history database should never contain them, but a clamped row is more
/// useful than an aborted query.
pub fn local_from_webkit(micros: i64) -> NaiveDateTime {
    let unix = unix_secs_from_webkit(micros);
    DateTime::from_timestamp(unix, 0)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .with_timezone(&Local)
        .naive_local()
}

/// Converts a local wall-clock time to seconds since the Unix epoch
///
/// Used to push the window filter into the SQL query as a bound parameter.
/// During a DST fold the earlier of the two candidate instants is used.
pub fn unix_secs_from_local(dt: NaiveDateTime) -> i64 {
    Local
        .from_local_datetime(&dt)
        .earliest()
        .map(|d| d.timestamp())
        .unwrap_or_else(|| dt.and_utc().timestamp())
}

/// Converts a local wall-clock time to a WebKit timestamp
pub fn webkit_from_local(dt: NaiveDateTime) -> i64 {
    (unix_secs_from_local(dt) + WEBKIT_EPOCH_OFFSET_SECS) * MICROS_PER_SEC
}

/// Converts a stored duration in microseconds to seconds
pub fn duration_secs_from_micros(micros: i64) -> f64 {
    micros as f64 / MICROS_PER_SEC as f64
}
