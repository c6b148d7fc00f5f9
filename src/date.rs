//! PDF date parsing
//!
//! Dates in the document information dictionary use the form
//! `D:YYYYMMDDHHmmSSOHH'mm'`, where every field after the year is optional
//! and `O` is one of `+`, `-` or `Z`.

use chrono::{DateTime, FixedOffset, NaiveDate};

/// Parse a PDF date string into a timestamp with its UTC offset
///
/// Missing fields default to the start of their range (month 1, day 1,
/// midnight). A missing offset is treated as UTC.
///
/// # Example
///
/// ```
/// use pdf_manager::date::parse_pdf_date;
///
/// let date = parse_pdf_date("D:20240315093000+01'00'").unwrap();
/// assert_eq!(date.to_rfc3339(), "2024-03-15T09:30:00+01:00");
/// ```
pub fn parse_pdf_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    let raw = raw.strip_prefix("D:").unwrap_or(raw);

    let digits_end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, zone) = raw.split_at(digits_end);

    if digits.len() < 4 || digits.len() > 14 || digits.len() % 2 != 0 {
        return None;
    }

    let field = |start: usize, default: u32| -> Option<u32> {
        match digits.get(start..start + 2) {
            Some(s) => s.parse().ok(),
            None => Some(default),
        }
    };

    let year: i32 = digits[..4].parse().ok()?;
    let month = field(4, 1)?;
    let day = field(6, 1)?;
    let hour = field(8, 0)?;
    let minute = field(10, 0)?;
    let second = field(12, 0)?;

    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    let offset = parse_offset(zone)?;

    naive.and_local_timezone(offset).single()
}

/// Parse the `OHH'mm'` suffix of a PDF date
fn parse_offset(zone: &str) -> Option<FixedOffset> {
    let zone = zone.trim();
    let mut chars = zone.chars();

    let sign = match chars.next() {
        None | Some('Z') | Some('z') => return FixedOffset::east_opt(0),
        Some('+') => 1,
        Some('-') => -1,
        Some(_) => return None,
    };

    let rest: String = chars.filter(|c| c.is_ascii_digit()).collect();
    let hours: i32 = match rest.get(..2) {
        Some(h) => h.parse().ok()?,
        None => return None,
    };
    let minutes: i32 = match rest.get(2..4) {
        Some(m) => m.parse().ok()?,
        None => 0,
    };

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Format a parsed PDF date for display
pub fn format_pdf_date(date: &DateTime<FixedOffset>) -> String {
    date.format("%Y-%m-%d %H:%M:%S %:z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_full_date_with_offset() {
        let date = parse_pdf_date("D:20231105142233-05'00'").unwrap();
        assert_eq!(date.year(), 2023);
        assert_eq!(date.month(), 11);
        assert_eq!(date.day(), 5);
        assert_eq!(date.hour(), 14);
        assert_eq!(date.minute(), 22);
        assert_eq!(date.second(), 33);
        assert_eq!(date.offset().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn test_utc_marker() {
        let date = parse_pdf_date("D:20240101000000Z").unwrap();
        assert_eq!(date.offset().local_minus_utc(), 0);
        assert_eq!(format_pdf_date(&date), "2024-01-01 00:00:00 +00:00");
    }

    #[test]
    fn test_year_only_defaults() {
        let date = parse_pdf_date("D:1999").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (1999, 1, 1));
        assert_eq!(date.hour(), 0);
    }

    #[test]
    fn test_missing_prefix_is_accepted() {
        assert!(parse_pdf_date("20240229").is_some());
    }

    #[test]
    fn test_offset_with_minutes() {
        let date = parse_pdf_date("D:20240315093000+05'30'").unwrap();
        assert_eq!(date.offset().local_minus_utc(), 5 * 3600 + 30 * 60);
    }

    #[test]
    fn test_invalid_dates() {
        assert!(parse_pdf_date("").is_none());
        assert!(parse_pdf_date("D:20").is_none());
        assert!(parse_pdf_date("D:20231301").is_none()); // month 13
        assert!(parse_pdf_date("D:20230230").is_none()); // Feb 30
        assert!(parse_pdf_date("yesterday").is_none());
        assert!(parse_pdf_date("D:2024010112?").is_none());
    }
}
