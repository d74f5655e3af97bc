//! Calendar helpers shared by both heatmaps.
//!
//! Dates travel through the pipeline as `YYYY-MM-DD` strings (they are the
//! column keys of every extract), so parsing is strict about that shape.

use chrono::{Datelike, Days, NaiveDate};

use crate::error::{Error, Result};

/// Parse a strict `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(Error::invalid_date(value));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| Error::invalid_date(value))
}

/// Format a date as `YYYY-MM-DD`.
#[inline]
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Add whole days to a date. `None` on calendar overflow.
#[inline]
pub fn add_days(date: NaiveDate, days: u32) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(u64::from(days)))
}

/// Map an ISO date to its reporting column label, e.g. `"W 01"`.
///
/// Weeks follow ISO-8601: the week that holds the date's Thursday decides
/// both the week number and the week-year, so the first days of January can
/// land in week 52/53 and the last days of December in week 01.
/// Input that is not a date comes back unchanged.
pub fn week_label(value: &str) -> String {
    match parse_iso_date(value) {
        Ok(date) => format!("W {:02}", date.iso_week().week()),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_label_monday_new_year() {
        // 2024-01-01 is a Monday, so it opens ISO week 1 of 2024.
        assert_eq!(week_label("2024-01-01"), "W 01");
    }

    #[test]
    fn test_week_label_december_in_next_year() {
        // 2024-12-30 is a Monday whose Thursday is 2025-01-02.
        assert_eq!(week_label("2024-12-30"), "W 01");
        assert_eq!(week_label("2025-12-29"), "W 01");
    }

    #[test]
    fn test_week_label_january_in_previous_year() {
        // 2021-01-01 is a Friday: still in 2020's week 53.
        assert_eq!(week_label("2021-01-01"), "W 53");
        // 2023-01-01 is a Sunday: 2022's week 52.
        assert_eq!(week_label("2023-01-01"), "W 52");
    }

    #[test]
    fn test_week_label_mid_year() {
        assert_eq!(week_label("2024-06-14"), "W 24");
        assert_eq!(week_label("2024-12-29"), "W 52");
    }

    #[test]
    fn test_week_label_passthrough() {
        assert_eq!(week_label("not a date"), "not a date");
        assert_eq!(week_label("2024-13-01"), "2024-13-01");
        assert_eq!(week_label(""), "");
    }

    #[test]
    fn test_parse_iso_date_is_strict() {
        assert!(parse_iso_date("2024-02-29").is_ok());
        assert!(parse_iso_date("2023-02-29").is_err());
        assert!(parse_iso_date("2024-2-9").is_err());
        assert!(parse_iso_date(" 2024-02-09").is_err());
        assert!(parse_iso_date("2024/02/09").is_err());
    }

    #[test]
    fn test_add_days_and_format() {
        let start = parse_iso_date("2024-12-30").unwrap();
        let later = add_days(start, 7).unwrap();
        assert_eq!(format_iso_date(later), "2025-01-06");
        assert_eq!(format_iso_date(add_days(start, 0).unwrap()), "2024-12-30");
    }
}
