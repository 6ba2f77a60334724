//! Date and time conversions
//!
//! Dates are stored as days since 1970-01-01 and timestamps as milliseconds
//! since the Unix epoch, both in UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// `yyyy-MM-dd`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical timestamp rendering: `yyyy-MM-dd HH:mm:ss.SSS`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Primary timestamp input pattern
pub const TIMESTAMP_INPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Published timestamp input pattern: `yyyy-MM-dd'T'HH:mm:ss.SSS'Z'`
pub const PUBLISHED_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Date a time of day is anchored to
pub const EPOCH_DATE_PREFIX: &str = "1970-01-01 ";

/// Days from 0001-01-01 to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub fn epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

pub fn epoch_millis(timestamp: NaiveDateTime) -> i64 {
    timestamp.and_utc().timestamp_millis()
}

pub fn timestamp_from_millis(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

/// Drop sub-millisecond precision
pub fn truncate_to_millis(timestamp: NaiveDateTime) -> Option<NaiveDateTime> {
    timestamp_from_millis(epoch_millis(timestamp))
}

/// Remove any number of wrapping single quotes
pub fn strip_single_quotes(input: &str) -> &str {
    input.trim_start_matches('\'').trim_end_matches('\'')
}

/// Parse with the primary pattern, then the published one
pub fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input, TIMESTAMP_INPUT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(input, PUBLISHED_TIMESTAMP_FORMAT))
        .ok()
}

/// Parse `yyyy-MM-dd`, then take the date of a published timestamp
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(input, PUBLISHED_TIMESTAMP_FORMAT)
                .ok()
                .map(|ts| ts.date())
        })
}
