//! Display helpers: score colours, date ranges, timestamps, search names.

use crate::types::CoreError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y%m%d";
const DISPLAY_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Colour for a match score: red at 0, blue at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

pub fn score_color(score: f32) -> Rgb {
    let s = if score.is_finite() { score.clamp(0.0, 1.0) } else { 0.0 };
    Rgb {
        r: (255.0 * (1.0 - s)).round() as u8,
        g: 20,
        b: (255.0 * s).round() as u8,
    }
}

/// Inclusive range of days, written `YYYYMMDD-YYYYMMDD` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::ReversedDateRange(format!(
                "{}-{}",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT)
            )));
        }
        Ok(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

impl FromStr for DateRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidDateRange(s.to_string());
        let (start, end) = s.split_once('-').ok_or_else(invalid)?;
        let is_day = |part: &str| part.len() == 8 && part.bytes().all(|b| b.is_ascii_digit());
        if !is_day(start) || !is_day(end) {
            return Err(invalid());
        }
        let start = parse_day(start).map_err(|_| invalid())?;
        let end = parse_day(end).map_err(|_| invalid())?;
        DateRange::new(start, end)
    }
}

/// Parse a `YYYYMMDD` day.
pub fn parse_day(s: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| CoreError::InvalidDateRange(s.to_string()))
}

/// Render a detection timestamp in a fixed UTC offset.
///
/// Timestamps without an offset are taken as UTC.
pub fn format_timestamp(iso: &str, offset_hours: i32) -> Result<String, CoreError> {
    let offset = offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or(CoreError::InvalidOffset(offset_hours))?;
    let instant = parse_timestamp(iso)?;
    Ok(instant.with_timezone(&offset).format(DISPLAY_FORMAT).to_string())
}

fn parse_timestamp(iso: &str) -> Result<DateTime<Utc>, CoreError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(iso) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| CoreError::InvalidTimestamp(iso.to_string()))
}

/// Personnel names are stored upper-case; searches are normalised to match.
pub fn normalize_search_name(input: &str) -> String {
    input.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_score_color_endpoints() {
        assert_eq!(score_color(0.0).to_string(), "rgb(255, 20, 0)");
        assert_eq!(score_color(1.0).to_string(), "rgb(0, 20, 255)");
        assert_eq!(score_color(0.5).to_string(), "rgb(128, 20, 128)");
    }

    #[test]
    fn test_score_color_clamps() {
        assert_eq!(score_color(1.7), score_color(1.0));
        assert_eq!(score_color(-0.2), score_color(0.0));
        assert_eq!(score_color(f32::NAN), score_color(0.0));
    }

    #[test]
    fn test_date_range_display_and_parse() {
        let r = DateRange::new(day(2024, 1, 5), day(2024, 2, 29)).unwrap();
        assert_eq!(r.to_string(), "20240105-20240229");
        assert_eq!("20240105-20240229".parse::<DateRange>().unwrap(), r);
        assert!(r.contains(day(2024, 2, 1)));
        assert!(!r.contains(day(2024, 3, 1)));
    }

    #[test]
    fn test_single_day_range() {
        let r = DateRange::single(day(2024, 6, 1));
        assert_eq!(r.to_string(), "20240601-20240601");
        assert_eq!("20240601-20240601".parse::<DateRange>().unwrap(), r);
    }

    #[test]
    fn test_date_range_rejects_bad_input() {
        let bad_inputs = [
            "",
            "2024010520240229",
            "2024015-20240229",
            "20240105-2024022a",
            "20241305-20241306",
            "20240105_20240229",
        ];
        for bad in bad_inputs {
            assert!(bad.parse::<DateRange>().is_err(), "{bad:?} should not parse");
        }
        assert!(matches!(
            "20240301-20240201".parse::<DateRange>(),
            Err(CoreError::ReversedDateRange(_))
        ));
    }

    #[test]
    fn test_format_timestamp_naive_is_utc() {
        let s = format_timestamp("2024-06-01T09:30:00", 8).unwrap();
        assert_eq!(s, "01/06/2024, 17:30:00");
        let s = format_timestamp("2024-06-01T20:15:07.123456", 8).unwrap();
        assert_eq!(s, "02/06/2024, 04:15:07");
    }

    #[test]
    fn test_format_timestamp_with_offset() {
        let s = format_timestamp("2024-06-01T09:30:00+08:00", 8).unwrap();
        assert_eq!(s, "01/06/2024, 09:30:00");
    }

    #[test]
    fn test_format_timestamp_errors() {
        assert!(matches!(format_timestamp("yesterday", 8), Err(CoreError::InvalidTimestamp(_))));
        assert_eq!(format_timestamp("2024-06-01T09:30:00", 30), Err(CoreError::InvalidOffset(30)));
    }

    #[test]
    fn test_normalize_search_name() {
        assert_eq!(normalize_search_name("  john doe "), "JOHN DOE");
    }
}
