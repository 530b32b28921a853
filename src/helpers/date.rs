//! Date helper functions

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Format a date as "Month DD, YYYY"
///
/// chrono's `%B` uses its built-in English month names, not the host locale.
///
/// # Examples
/// ```ignore
/// format_date(&NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()) // -> "March 05, 2024"
/// ```
pub fn format_date<D: Datelike>(date: &D) -> String {
    calendar_date(date)
        .map(|d| d.format("%B %d, %Y").to_string())
        .unwrap_or_default()
}

/// Format a date in ISO 8601 calendar form
pub fn iso_date<D: Datelike>(date: &D) -> String {
    calendar_date(date)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn calendar_date<D: Datelike>(date: &D) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), date.day())
}

/// Parse a frontmatter date string, keeping only the calendar date
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d"];
    for fmt in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // RFC 3339 / ISO 8601 with offset
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}
