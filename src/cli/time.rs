use chrono::{NaiveDate, NaiveDateTime};

use crate::prelude::*;

const FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M",
];

/// Parse a local date and time in any of the accepted formats.
///
/// A bare `YYYY-MM-DD` date means its midnight.
pub fn parse_local_date_time(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0))
        .with_context(|| format!("`{value}` is not a recognized local date and time"))
}
