//! Single-value format checks used by form validation.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

static UNSIGNED_INT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid integer regex"));
static NATIONAL_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{7,8}[A-Za-z]$").expect("valid national id regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9\s()+\-]{9,}$").expect("valid phone regex"));

const BIRTH_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const BIRTH_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parses an ASCII-digit string and checks it lies in `min..=max`.
///
/// Returns `None` for signs, decimals, non-ASCII digits or values out of range.
pub fn parse_in_range(value: &str, min: u32, max: u32) -> Option<u32> {
    let value = value.trim();
    if !UNSIGNED_INT_RE.is_match(value) {
        return None;
    }
    // Overlong digit strings overflow and are out of range anyway.
    let parsed = value.parse::<u32>().ok()?;
    (min..=max).contains(&parsed).then_some(parsed)
}

/// 7-8 digits followed by one ASCII letter.
pub fn is_national_id(value: &str) -> bool {
    NATIONAL_ID_RE.is_match(value.trim())
}

/// At least 9 characters of digits, whitespace, `(`, `)`, `+` or `-`.
pub fn is_phone(value: &str) -> bool {
    PHONE_RE.is_match(value.trim())
}

/// Whether day/month/year name an existing calendar day.
pub fn is_real_date(day: u32, month: u32, year: u32) -> bool {
    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
        .is_some()
}

/// Parses a birth date in any of the accepted date or date-time layouts.
pub fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    for format in BIRTH_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    for format in BIRTH_DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|datetime| datetime.date_naive())
}

#[cfg(test)]
mod tests {
    use super::{is_national_id, is_phone, is_real_date, parse_birth_date, parse_in_range};

    #[test]
    fn parse_in_range_accepts_leading_zeros_and_bounds() {
        assert_eq!(parse_in_range("07", 1, 31), Some(7));
        assert_eq!(parse_in_range("0", 0, 23), Some(0));
        assert_eq!(parse_in_range("2100", 1900, 2100), Some(2100));
    }

    #[test]
    fn parse_in_range_rejects_non_integers() {
        assert_eq!(parse_in_range("-1", 0, 23), None);
        assert_eq!(parse_in_range("1.5", 0, 23), None);
        assert_eq!(parse_in_range("１２", 0, 23), None);
        assert_eq!(parse_in_range("99999999999999999999", 0, 23), None);
        assert_eq!(parse_in_range("32", 1, 31), None);
    }

    #[test]
    fn national_id_pattern() {
        assert!(is_national_id("12345678A"));
        assert!(is_national_id("1234567z"));
        assert!(!is_national_id("123456"));
        assert!(!is_national_id("123456789A"));
        assert!(!is_national_id("12345678"));
    }

    #[test]
    fn phone_pattern() {
        assert!(is_phone("600123456"));
        assert!(is_phone("+34 (600) 12-34"));
        assert!(!is_phone("60012345"));
        assert!(!is_phone("600-abc-456"));
    }

    #[test]
    fn real_date_checks_month_lengths_and_leap_years() {
        assert!(is_real_date(29, 2, 2024));
        assert!(!is_real_date(29, 2, 2023));
        assert!(!is_real_date(31, 4, 2024));
        assert!(is_real_date(31, 12, 2100));
    }

    #[test]
    fn birth_date_accepts_supported_layouts() {
        assert!(parse_birth_date("1990-01-01").is_some());
        assert!(parse_birth_date("1990/01/31").is_some());
        assert!(parse_birth_date("01/31/1990").is_some());
        assert!(parse_birth_date("1990-01-01T08:30").is_some());
        assert!(parse_birth_date("1990-01-01T08:30:00+02:00").is_some());
        assert!(parse_birth_date("not a date").is_none());
        assert!(parse_birth_date("1990-02-30").is_none());
    }
}
