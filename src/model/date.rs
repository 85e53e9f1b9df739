//! Canonicalizes transaction dates to the `M/D/YYYY` display format used in the sheet.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Returned in place of a date when the input cannot be understood.
pub const INVALID_DATE: &str = "Invalid Date";

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
];

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
];

/// Normalizes an optional date string, using today's local date when it is absent or blank.
///
/// Never fails: unparseable input yields [`INVALID_DATE`], so callers that care must check for it.
pub fn normalize_date(input: Option<&str>) -> String {
    normalize_date_on(input, Local::now().date_naive())
}

/// Like [`normalize_date`] but with an explicit value for "today".
pub fn normalize_date_on(input: Option<&str>, today: NaiveDate) -> String {
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        None => display(today),
        Some(s) => match parse_date(s) {
            Some(date) => display(date),
            None => INVALID_DATE.to_string(),
        },
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
}

fn display(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}
