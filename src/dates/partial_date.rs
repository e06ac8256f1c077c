//! Partial dates: `YYYY`, `YYYY-M` and `YYYY-M-D`.
//!
//! A partial date names a bucket of days rather than an instant. Comparison
//! operators on a bucket are implemented through its inclusive range and the
//! days just outside it (`> 2024-06` means `>= 2024-07-01`).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Earliest accepted year.
pub const MIN_YEAR: i32 = 1900;
/// Latest accepted year.
pub const MAX_YEAR: i32 = 2100;

const ISO_DATE: &str = "%Y-%m-%d";

static FULL_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());
static YEAR_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").unwrap());
static YEAR_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})$").unwrap());

/// How much of the date was specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePrecision {
    Year,
    Month,
    Day,
}

/// A parsed, calendar-valid partial date. `day` is only set when `month` is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPartialDate {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

impl ParsedPartialDate {
    pub fn precision(&self) -> DatePrecision {
        match (self.month, self.day) {
            (Some(_), Some(_)) => DatePrecision::Day,
            (Some(_), None) => DatePrecision::Month,
            _ => DatePrecision::Year,
        }
    }

    /// First day covered.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month.unwrap_or(1), self.day.unwrap_or(1))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Last day covered.
    pub fn last_day(&self) -> NaiveDate {
        match (self.month, self.day) {
            (Some(_), Some(_)) => self.first_day(),
            (Some(month), None) => last_day_of_month(self.year, month),
            _ => NaiveDate::from_ymd_opt(self.year, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }
}

/// Inclusive `YYYY-MM-DD` range covered by a partial date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

fn capture_number<T: std::str::FromStr>(caps: &regex::Captures<'_>, index: usize) -> Option<T> {
    caps.get(index)?.as_str().parse().ok()
}

/// Parse a partial date, trying full date, then year-month, then year.
///
/// Returns `None` for unmatched input, a year outside 1900..=2100, a month
/// outside 1..=12, or a day that does not exist in that month (leap years
/// included).
pub fn parse_partial_date(value: &str) -> Option<ParsedPartialDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let parsed = if let Some(caps) = FULL_DATE.captures(value) {
        ParsedPartialDate {
            year: capture_number(&caps, 1)?,
            month: Some(capture_number(&caps, 2)?),
            day: Some(capture_number(&caps, 3)?),
        }
    } else if let Some(caps) = YEAR_MONTH.captures(value) {
        ParsedPartialDate {
            year: capture_number(&caps, 1)?,
            month: Some(capture_number(&caps, 2)?),
            day: None,
        }
    } else if let Some(caps) = YEAR_ONLY.captures(value) {
        ParsedPartialDate {
            year: capture_number(&caps, 1)?,
            month: None,
            day: None,
        }
    } else {
        return None;
    };

    if !(MIN_YEAR..=MAX_YEAR).contains(&parsed.year) {
        return None;
    }
    if let Some(month) = parsed.month {
        if !(1..=12).contains(&month) {
            return None;
        }
        if let Some(day) = parsed.day {
            NaiveDate::from_ymd_opt(parsed.year, month, day)?;
        }
    }

    Some(parsed)
}

pub fn is_valid_partial_date(value: &str) -> bool {
    parse_partial_date(value).is_some()
}

/// True for a valid year or year-month; false for full dates and garbage.
pub fn is_partial_date(value: &str) -> bool {
    parse_partial_date(value).is_some_and(|d| d.day.is_none())
}

/// Short label: `Jun 15`, `Jun 2024` or `2024`.
///
/// Input that is not a partial date is tried as a generic timestamp and shown
/// as `Mon D`; if that fails too the input is returned unchanged.
pub fn format_partial_date_for_display(value: &str) -> String {
    if let Some(parsed) = parse_partial_date(value) {
        let first = parsed.first_day();
        return match parsed.precision() {
            DatePrecision::Day => first.format("%b %-d").to_string(),
            DatePrecision::Month => first.format("%b %Y").to_string(),
            DatePrecision::Year => parsed.year.to_string(),
        };
    }

    match parse_generic_date(value.trim()) {
        Some(date) => date.format("%b %-d").to_string(),
        None => value.to_string(),
    }
}

fn parse_generic_date(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in ["%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }
    None
}

/// Inclusive range of days covered, normalized to `YYYY-MM-DD`.
pub fn partial_date_range(value: &str) -> Option<DateRange> {
    let parsed = parse_partial_date(value)?;
    Some(DateRange {
        start: parsed.first_day().format(ISO_DATE).to_string(),
        end: parsed.last_day().format(ISO_DATE).to_string(),
    })
}

/// First day after the range (`2024-06` -> `2024-07-01`, `2024` -> `2025-01-01`).
pub fn next_boundary(value: &str) -> Option<String> {
    let parsed = parse_partial_date(value)?;
    let next = parsed.last_day().succ_opt()?;
    Some(next.format(ISO_DATE).to_string())
}

/// Last day before the range (`2024-01` -> `2023-12-31`).
pub fn previous_boundary(value: &str) -> Option<String> {
    let parsed = parse_partial_date(value)?;
    let previous = parsed.first_day().pred_opt()?;
    Some(previous.format(ISO_DATE).to_string())
}
