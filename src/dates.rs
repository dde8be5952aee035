/// Calendar date helpers shared by import, sorting and cleaning.
///
/// Dates are plain `chrono::NaiveDate` values. Parsing accepts the layouts that
/// show up in case exports (ISO dates, US month/day/year, timestamps with a
/// time part); anything else is reported as unparseable and left to the
/// caller to replace with a sentinel.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date substituted for missing cells in date-typed columns.
pub const EPOCH_SENTINEL: NaiveDate = match NaiveDate::from_ymd_opt(1970, 1, 1) {
    Some(date) => date,
    None => panic!("1970-01-01 is a valid date"),
};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    // Two-digit years first: %Y would read "20" as the year 20.
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d-%m-%Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%d %b %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Parse a date string, trying the supported layouts in order.
///
/// Returns `None` for empty input and for anything no layout accepts.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Parse only the strict ISO layout (`YYYY-MM-DD`).
///
/// Used during import type inference, where guessing at ambiguous layouts
/// would turn free text into dates.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.len() != 10 || trimmed.as_bytes().get(4) != Some(&b'-') {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

/// Format a date as ISO 8601 (`YYYY-MM-DD`).
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Whether a column name signals date semantics.
pub fn is_date_column(name: &str) -> bool {
    name.to_lowercase().contains("date")
}
