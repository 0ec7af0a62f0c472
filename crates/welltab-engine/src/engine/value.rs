//! Parsing and formatting of cell text: numbers, dates and times of day.

use chrono::{NaiveDate, NaiveTime, Timelike};
use std::fmt;
use std::str::FromStr;

/// Parse cell text as a finite number. Surrounding whitespace is ignored.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Fixed-point rendering with `decimals` digits after the point.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, value);
    // avoid "-0.000"
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_string()
    } else {
        s
    }
}

/// Accepted date layouts, tried in order. Day-first wins over month-first.
pub const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%m/%d/%Y", "%m-%d-%Y",
];

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Parse a time of day: `h:mm:ss`, `h:mm:ss.fff` or `m:ss`.
///
/// Two-part values are minutes and seconds, so `"12:30"` is 12 min 30 s.
pub fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    let trimmed = text.trim();
    let parts: Vec<&str> = trimmed.split(':').collect();
    match parts.as_slice() {
        [_, _, seconds] => {
            if seconds.contains('.') {
                NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f").ok()
            } else {
                NaiveTime::parse_from_str(trimmed, "%H:%M:%S").ok()
            }
        }
        [minutes, seconds] => {
            let minutes = parse_digits(minutes, 1, 2)?;
            let seconds = parse_digits(seconds, 2, 2)?;
            NaiveTime::from_hms_opt(0, minutes, seconds)
        }
        _ => None,
    }
}

fn parse_digits(s: &str, min_len: usize, max_len: usize) -> Option<u32> {
    if s.len() < min_len || s.len() > max_len || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Seconds since midnight, with millisecond precision.
pub fn seconds_of_day(time: NaiveTime) -> f64 {
    time.num_seconds_from_midnight() as f64 + f64::from(time.nanosecond() / 1_000_000) / 1000.0
}

/// Output unit of elapsed-time columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TimeUnit {
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "m")]
    Minutes,
    #[default]
    #[serde(rename = "h")]
    Hours,
}

impl TimeUnit {
    pub fn convert_seconds(self, seconds: f64) -> f64 {
        match self {
            TimeUnit::Seconds => seconds,
            TimeUnit::Minutes => seconds / 60.0,
            TimeUnit::Hours => seconds / 3600.0,
        }
    }

    /// Unit text used in headers and column definitions.
    pub fn label(self) -> &'static str {
        match self {
            TimeUnit::Seconds => "s",
            TimeUnit::Minutes => "min",
            TimeUnit::Hours => "h",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s" | "sec" | "second" | "seconds" => Ok(TimeUnit::Seconds),
            "m" | "min" | "minute" | "minutes" => Ok(TimeUnit::Minutes),
            "h" | "hr" | "hour" | "hours" => Ok(TimeUnit::Hours),
            other => Err(format!("Unknown time unit: {}", other)),
        }
    }
}

/// Rough shape of a cell's content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Empty,
    Number,
    DateTime,
    Text,
}

pub fn classify(text: &str) -> ValueKind {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        ValueKind::Empty
    } else if parse_number(trimmed).is_some() {
        ValueKind::Number
    } else if parse_date(trimmed).is_some()
        || parse_time_of_day(trimmed).is_some()
        || parse_date_time(trimmed).is_some()
    {
        ValueKind::DateTime
    } else {
        ValueKind::Text
    }
}

/// `"<date> <time>"` or ISO `"<date>T<time>"`.
fn parse_date_time(text: &str) -> Option<(NaiveDate, NaiveTime)> {
    let (date, time) = text.split_once([' ', 'T'])?;
    Some((parse_date(date)?, parse_time_of_day(time)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 28.5 "), Some(28.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("-4"), Some(-4.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(1.5, 3), "1.500");
        assert_eq!(format_fixed(2.0 / 3.0, 2), "0.67");
        assert_eq!(format_fixed(-0.0001, 3), "0.000");
        assert_eq!(format_fixed(-1.26, 1), "-1.3");
        assert_eq!(format_fixed(42.0, 0), "42");
    }

    #[test]
    fn test_parse_date_formats() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        for text in ["2024-03-05", "2024/3/5", "05/03/2024", "5-3-2024"] {
            assert_eq!(parse_date(text), Some(d), "{text}");
        }
        // day-first before month-first
        assert_eq!(parse_date("12/10/2024"), NaiveDate::from_ymd_opt(2024, 10, 12));
        // only month-first fits
        assert_eq!(parse_date("12/31/2024"), NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_parse_time_of_day_formats() {
        assert_eq!(parse_time_of_day("08:30:15"), NaiveTime::from_hms_opt(8, 30, 15));
        assert_eq!(parse_time_of_day("8:30:15"), NaiveTime::from_hms_opt(8, 30, 15));
        assert_eq!(
            parse_time_of_day("08:30:15.250"),
            NaiveTime::from_hms_milli_opt(8, 30, 15, 250)
        );
        assert_eq!(parse_time_of_day("12:30"), NaiveTime::from_hms_opt(0, 12, 30));
        assert_eq!(parse_time_of_day("2:05"), NaiveTime::from_hms_opt(0, 2, 5));
        assert_eq!(parse_time_of_day("2:5"), None);
        assert_eq!(parse_time_of_day("25:00:00"), None);
        assert_eq!(parse_time_of_day("noon"), None);
        assert_eq!(parse_time_of_day(""), None);
    }

    #[test]
    fn test_seconds_of_day_keeps_millis() {
        let t = NaiveTime::from_hms_milli_opt(0, 1, 2, 500).unwrap();
        assert_eq!(seconds_of_day(t), 62.5);
    }

    #[test]
    fn test_time_unit_conversion() {
        assert_eq!(TimeUnit::Seconds.convert_seconds(90.0), 90.0);
        assert_eq!(TimeUnit::Minutes.convert_seconds(90.0), 1.5);
        assert_eq!(TimeUnit::Hours.convert_seconds(5400.0), 1.5);
        assert_eq!("min".parse::<TimeUnit>(), Ok(TimeUnit::Minutes));
        assert_eq!(TimeUnit::Minutes.label(), "min");
        assert!("fortnight".parse::<TimeUnit>().is_err());
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("  "), ValueKind::Empty);
        assert_eq!(classify("3.2"), ValueKind::Number);
        assert_eq!(classify("2024-01-01"), ValueKind::DateTime);
        assert_eq!(classify("2024-01-01 10:00:00"), ValueKind::DateTime);
        assert_eq!(classify("well A"), ValueKind::Text);
    }
}
