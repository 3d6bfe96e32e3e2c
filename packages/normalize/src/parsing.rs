//! Cell coercion helpers used by the normalizer.
//!
//! Every function returns `None` for values that are missing or cannot be
//! coerced; the caller decides what a missing value turns into.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use enforceiq_stop_models::CellValue;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M", "%I:%M %p"];

/// Parses a date-and-time string in one of the supported layouts.
#[must_use]
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Parses a calendar date, accepting a full datetime as well.
#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| parse_datetime(s).map(|dt| dt.date()))
}

/// Parses a time of day, accepting a full datetime as well.
#[must_use]
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .or_else(|| parse_datetime(s).map(|dt| dt.time()))
}

/// Renders any non-missing scalar as text.
#[must_use]
pub fn coerce_text(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Null => None,
        CellValue::Text(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Coerces a cell to a boolean. Unrecognized text is treated as missing.
#[must_use]
pub fn coerce_bool(cell: &CellValue) -> Option<bool> {
    match cell {
        CellValue::Bool(b) => Some(*b),
        CellValue::Int(i) => Some(*i != 0),
        CellValue::Float(x) if x.is_nan() => None,
        CellValue::Float(x) => Some(*x != 0.0),
        CellValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Ages above this are treated as data-entry errors.
pub const MAX_AGE_YEARS: f64 = 150.0;

/// Coerces a cell to a finite number of years in `0..=MAX_AGE_YEARS`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn coerce_age(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::Int(i) => *i as f64,
        CellValue::Float(x) => *x,
        CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (value.is_finite() && (0.0..=MAX_AGE_YEARS).contains(&value)).then_some(value)
}

/// Coerces a cell to a calendar date.
#[must_use]
pub fn coerce_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Text(s) => parse_date(s.trim()),
        _ => None,
    }
}

/// Coerces a cell to a time of day.
#[must_use]
pub fn coerce_time(cell: &CellValue) -> Option<NaiveTime> {
    match cell {
        CellValue::Time(t) => Some(*t),
        CellValue::DateTime(dt) => Some(dt.time()),
        CellValue::Text(s) => parse_time(s.trim()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dates_in_several_layouts() {
        let expected = NaiveDate::from_ymd_opt(2005, 1, 2).unwrap();
        assert_eq!(parse_date("2005-01-02"), Some(expected));
        assert_eq!(parse_date("2005/01/02"), Some(expected));
        assert_eq!(parse_date("01/02/2005"), Some(expected));
        assert_eq!(parse_date("2005-01-02 23:15:00"), Some(expected));
        assert_eq!(parse_date("2005-01-02T23:15:00.000"), Some(expected));
    }

    #[test]
    fn rejects_invalid_date() {
        assert!(parse_date("not-a-date").is_none());
        assert!(parse_date("2005-13-40").is_none());
    }

    #[test]
    fn parses_times() {
        let expected = NaiveTime::from_hms_opt(1, 55, 0).unwrap();
        assert_eq!(parse_time("01:55:00"), Some(expected));
        assert_eq!(parse_time("01:55"), Some(expected));
        assert_eq!(parse_time("2005-01-02 01:55:00"), Some(expected));
        assert!(parse_time("25:99").is_none());
    }

    #[test]
    fn coerces_booleans() {
        assert_eq!(coerce_bool(&CellValue::Bool(true)), Some(true));
        assert_eq!(coerce_bool(&CellValue::Int(0)), Some(false));
        assert_eq!(coerce_bool(&CellValue::Text("TRUE".to_string())), Some(true));
        assert_eq!(coerce_bool(&CellValue::Text(" no ".to_string())), Some(false));
        assert_eq!(coerce_bool(&CellValue::Text("maybe".to_string())), None);
        assert_eq!(coerce_bool(&CellValue::Null), None);
    }

    #[test]
    fn coerces_ages() {
        assert_eq!(coerce_age(&CellValue::Int(30)), Some(30.0));
        assert_eq!(coerce_age(&CellValue::Text("41.5".to_string())), Some(41.5));
        assert_eq!(coerce_age(&CellValue::Text("old".to_string())), None);
        assert_eq!(coerce_age(&CellValue::Int(-3)), None);
        assert_eq!(coerce_age(&CellValue::Float(f64::NAN)), None);
        assert_eq!(coerce_age(&CellValue::Text("1e30".to_string())), None);
        assert_eq!(coerce_age(&CellValue::Int(151)), None);
        assert_eq!(coerce_age(&CellValue::Int(150)), Some(150.0));
    }

    #[test]
    fn renders_scalars_as_text() {
        assert_eq!(coerce_text(&CellValue::Int(7)), Some("7".to_string()));
        assert_eq!(coerce_text(&CellValue::Null), None);
    }
}
