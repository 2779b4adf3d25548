//! Date parsing and formatting for front matter, filters and feeds.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Parse from "YYYY-MM-DD" or RFC 3339 ("YYYY-MM-DDTHH:MM:SSZ", "...+02:00").
///
/// Plain dates are taken as midnight UTC.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if s.len() == 10 {
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a UTC offset such as "+08:00", "-0530" or "Z".
pub fn parse_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// RFC 2822 timestamp in the given offset, as used by RSS `pubDate`.
pub fn to_rfc2822(date: &DateTime<Utc>, offset: &FixedOffset) -> String {
    date.with_timezone(offset).to_rfc2822()
}

/// "YYYY-MM-DD" in the given offset, as used by sitemap `lastmod`.
pub fn to_ymd(date: &DateTime<Utc>, offset: &FixedOffset) -> String {
    date.with_timezone(offset).format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_plain_date() {
        let dt = parse_date("2024-12-25").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 12, 25));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (0, 0, 0));
    }

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_date("2024-06-15T14:30:45Z").unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (14, 30, 45));

        // Offsets are normalized to UTC
        let dt = parse_date("2024-06-15T14:30:45+02:00").unwrap();
        assert_eq!(dt.hour(), 12);
    }

    #[test]
    fn test_parse_invalid_dates() {
        assert!(parse_date("2024-13-01").is_none());
        assert!(parse_date("2024-04-31").is_none());
        assert!(parse_date("2023-02-29").is_none());
        assert!(parse_date("1900-02-29").is_none());
        assert!(parse_date("2024-06-15T24:00:00Z").is_none());
        assert!(parse_date("yesterday").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_parse_leap_years() {
        assert!(parse_date("2024-02-29").is_some());
        assert!(parse_date("2000-02-29").is_some());
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("+08:00").unwrap().local_minus_utc(), 8 * 3600);
        assert_eq!(parse_offset("-0530").unwrap().local_minus_utc(), -(5 * 3600 + 30 * 60));
        assert_eq!(parse_offset("Z").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_offset("UTC").unwrap().local_minus_utc(), 0);
        assert!(parse_offset("08:00").is_none());
        assert!(parse_offset("+25:00").is_none());
        assert!(parse_offset("+8").is_none());
    }

    #[test]
    fn test_to_rfc2822_uses_offset() {
        let dt = parse_date("2024-01-15T10:30:45Z").unwrap();
        let utc = parse_offset("+00:00").unwrap();
        assert_eq!(to_rfc2822(&dt, &utc), "Mon, 15 Jan 2024 10:30:45 +0000");

        let tokyo = parse_offset("+09:00").unwrap();
        assert_eq!(to_rfc2822(&dt, &tokyo), "Mon, 15 Jan 2024 19:30:45 +0900");
    }

    #[test]
    fn test_to_ymd_crosses_midnight() {
        let dt = parse_date("2024-01-15T20:00:00Z").unwrap();
        let tokyo = parse_offset("+09:00").unwrap();
        assert_eq!(to_ymd(&dt, &tokyo), "2024-01-16");
    }
}
