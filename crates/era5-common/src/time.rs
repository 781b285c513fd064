//! Calendar and climatological instants for ERA5 grids.
//!
//! ERA5 files are stored either for a real calendar hour (`2020-01-15 06:00`)
//! or for a time-averaged ("tavg") hour that represents the same calendar
//! day and hour averaged across many years. Tavg instants carry no year; they
//! are anchored to a fixed non-leap reference year so that arithmetic on them
//! wraps around the calendar instead of drifting into another year.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Year used internally to represent tavg instants.
pub const TAVG_REFERENCE_YEAR: i32 = 1981;

/// Days per month in a non-leap year.
pub const MONTH_DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("Invalid date: {year:?}-{month:02}-{day:02} {hour:02}:00")]
    InvalidDate {
        year: Option<i32>,
        month: u32,
        day: u32,
        hour: u32,
    },

    #[error("Time step must be positive, got {0} seconds")]
    InvalidStep(i64),
}

/// An hourly instant, either on the real calendar or climatological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Era5DateTime {
    inner: NaiveDateTime,
    tavg: bool,
}

impl Era5DateTime {
    /// Create a calendar instant.
    pub fn new(year: i32, month: u32, day: u32, hour: u32) -> Result<Self, TimeParseError> {
        let inner = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .ok_or(TimeParseError::InvalidDate {
                year: Some(year),
                month,
                day,
                hour,
            })?;
        Ok(Self { inner, tavg: false })
    }

    /// Create a time-averaged instant for a calendar day and hour.
    pub fn tavg(month: u32, day: u32, hour: u32) -> Result<Self, TimeParseError> {
        let inner = NaiveDate::from_ymd_opt(TAVG_REFERENCE_YEAR, month, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .ok_or(TimeParseError::InvalidDate {
                year: None,
                month,
                day,
                hour,
            })?;
        Ok(Self { inner, tavg: true })
    }

    /// Wrap a naive calendar datetime. Minutes and seconds are kept as-is.
    pub fn from_naive(inner: NaiveDateTime) -> Self {
        Self { inner, tavg: false }
    }

    /// The climatological counterpart of this instant (same month/day/hour).
    pub fn as_tavg(&self) -> Result<Self, TimeParseError> {
        if self.tavg {
            return Ok(*self);
        }
        Self::tavg(self.month(), self.day(), self.hour())
    }

    /// Calendar year, or `None` for tavg instants.
    pub fn year(&self) -> Option<i32> {
        if self.tavg {
            None
        } else {
            Some(self.inner.year())
        }
    }

    pub fn month(&self) -> u32 {
        self.inner.month()
    }

    pub fn day(&self) -> u32 {
        self.inner.day()
    }

    pub fn hour(&self) -> u32 {
        self.inner.hour()
    }

    pub fn minute(&self) -> u32 {
        self.inner.minute()
    }

    pub fn is_tavg(&self) -> bool {
        self.tavg
    }

    /// The underlying naive datetime (reference year for tavg instants).
    pub fn naive(&self) -> NaiveDateTime {
        self.inner
    }

    /// Shift by a signed duration.
    ///
    /// Tavg instants stay inside the reference year: `TAVG-12-31 23:00`
    /// shifted by one hour becomes `TAVG-01-01 00:00`.
    pub fn shift(&self, delta: Duration) -> Option<Self> {
        let shifted = self.inner.checked_add_signed(delta)?;
        if !self.tavg {
            return Some(Self::from_naive(shifted));
        }
        let inner = shifted.with_year(TAVG_REFERENCE_YEAR)?;
        Some(Self { inner, tavg: true })
    }

    /// Date-only rendering, e.g. `TAVG-01-15` or `2020-01-15`.
    pub fn date_string(&self) -> String {
        format!("{}-{:02}-{:02}", self.year_label(), self.month(), self.day())
    }

    /// `TAVG` or the four-digit year.
    pub fn year_label(&self) -> String {
        match self.year() {
            Some(year) => format!("{:04}", year),
            None => "TAVG".to_string(),
        }
    }

    /// Parse an instant from one of the accepted textual forms.
    ///
    /// Accepted: `TAVG-MM-DD HH:MM`, `YYYY-MM-DD HH:MM[:SS]`, `MM-DD HH:MM`,
    /// `YYYY-MM-DD`, `MM-DD`, `YYYY-MM` (and `TAVG-` variants of the
    /// year-less forms). Year-less forms are climatological.
    pub fn parse(s: &str) -> Result<Self, TimeParseError> {
        let trimmed = s.trim();
        let invalid = || TimeParseError::InvalidFormat(s.to_string());

        let (mut body, mut tavg) = match trimmed.get(..5) {
            Some(prefix) if prefix.eq_ignore_ascii_case("TAVG-") => {
                (format!("{}-{}", TAVG_REFERENCE_YEAR, &trimmed[5..]), true)
            }
            _ => (trimmed.to_string(), false),
        };

        let date_part = body.split_whitespace().next().ok_or_else(invalid)?;
        let pieces: Vec<&str> = date_part.split('-').collect();
        if !tavg && pieces.len() == 2 && pieces[0].len() == 2 {
            body = format!("{}-{}", TAVG_REFERENCE_YEAR, body);
            tavg = true;
        }

        let date_part = body.split_whitespace().next().ok_or_else(invalid)?;
        let is_year_month = date_part.split('-').count() == 2;

        let inner = if is_year_month {
            NaiveDate::parse_from_str(&format!("{}-01", body), "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        } else {
            NaiveDateTime::parse_from_str(&body, "%Y-%m-%d %H:%M")
                .or_else(|_| NaiveDateTime::parse_from_str(&body, "%Y-%m-%d %H:%M:%S"))
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(&body, "%Y-%m-%d")
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                })
        }
        .ok_or_else(invalid)?;

        Ok(Self { inner, tavg })
    }
}

impl FromStr for Era5DateTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Era5DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}:{:02}:00",
            self.date_string(),
            self.hour(),
            self.minute()
        )
    }
}

/// Inclusive, stepped iteration between two instants.
///
/// Iteration stops after `end`, or as soon as a step would move backwards
/// (a tavg range wrapping past the end of the year).
#[derive(Debug, Clone)]
pub struct DateTimeRange {
    next: Option<Era5DateTime>,
    end: Era5DateTime,
    step: Duration,
}

impl DateTimeRange {
    pub fn new(
        start: Era5DateTime,
        end: Era5DateTime,
        step: Duration,
    ) -> Result<Self, TimeParseError> {
        if step <= Duration::zero() {
            return Err(TimeParseError::InvalidStep(step.num_seconds()));
        }
        Ok(Self {
            next: Some(start),
            end,
            step,
        })
    }
}

impl Iterator for DateTimeRange {
    type Item = Era5DateTime;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if current > self.end {
            return None;
        }
        self.next = current.shift(self.step).filter(|next| *next > current);
        Some(current)
    }
}

/// All instants between `start` and `end` (inclusive) separated by `step`.
pub fn datetime_range(
    start: Era5DateTime,
    end: Era5DateTime,
    step: Duration,
) -> Result<Vec<Era5DateTime>, TimeParseError> {
    Ok(DateTimeRange::new(start, end, step)?.collect())
}

/// The full climatological year, `TAVG-01-01 00:00` through `TAVG-12-31 23:00`.
pub fn climatology_range(step: Duration) -> Result<DateTimeRange, TimeParseError> {
    DateTimeRange::new(
        Era5DateTime::tavg(1, 1, 0)?,
        Era5DateTime::tavg(12, 31, 23)?,
        step,
    )
}

/// Zero-based day of the (non-leap) year for a calendar day.
pub fn date_to_day_of_year(day: u32, month: u32) -> Option<u32> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let month_index = (month - 1) as usize;
    if day == 0 || day > MONTH_DAYS[month_index] {
        return None;
    }
    Some(MONTH_DAYS[..month_index].iter().sum::<u32>() + day - 1)
}

/// Inverse of [`date_to_day_of_year`], returning `(day, month)`.
pub fn day_of_year_to_date(mut index: u32) -> Option<(u32, u32)> {
    for (month, days) in MONTH_DAYS.iter().enumerate() {
        if index < *days {
            return Some((index + 1, month as u32 + 1));
        }
        index -= days;
    }
    None
}

/// Compact `YYYYMMDD` number for a calendar date.
pub fn date_as_number(day: u32, month: u32, year: i32) -> i64 {
    10_000 * year as i64 + 100 * month as i64 + day as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tavg() {
        let dt = Era5DateTime::parse("TAVG-01-15 06:00").unwrap();
        assert!(dt.is_tavg());
        assert_eq!(dt.year(), None);
        assert_eq!((dt.month(), dt.day(), dt.hour()), (1, 15, 6));
    }

    #[test]
    fn test_parse_calendar_forms() {
        let dt = Era5DateTime::parse("2020-03-04 12:00").unwrap();
        assert_eq!(dt.year(), Some(2020));
        assert_eq!(dt.hour(), 12);

        let date_only = Era5DateTime::parse("2020-03-04").unwrap();
        assert_eq!(date_only.hour(), 0);

        let year_month = Era5DateTime::parse("2020-03").unwrap();
        assert_eq!((year_month.month(), year_month.day()), (3, 1));
    }

    #[test]
    fn test_parse_yearless_is_tavg() {
        let dt = Era5DateTime::parse("07-04 18:00").unwrap();
        assert!(dt.is_tavg());
        assert_eq!((dt.month(), dt.day(), dt.hour()), (7, 4, 18));
        assert!(Era5DateTime::parse("07-04").unwrap().is_tavg());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Era5DateTime::parse("tomorrow").is_err());
        assert!(Era5DateTime::parse("").is_err());
        assert!(Era5DateTime::parse("TAVG-02-29 00:00").is_err());
    }

    #[test]
    fn test_display() {
        let dt = Era5DateTime::tavg(1, 2, 3).unwrap();
        assert_eq!(dt.to_string(), "TAVG-01-02 03:00:00");
        let dt = Era5DateTime::new(2019, 12, 31, 23).unwrap();
        assert_eq!(dt.to_string(), "2019-12-31 23:00:00");
    }

    #[test]
    fn test_tavg_shift_wraps_year() {
        let dt = Era5DateTime::tavg(12, 31, 23).unwrap();
        let next = dt.shift(Duration::hours(1)).unwrap();
        assert!(next.is_tavg());
        assert_eq!((next.month(), next.day(), next.hour()), (1, 1, 0));
    }

    #[test]
    fn test_calendar_shift_crosses_year() {
        let dt = Era5DateTime::new(2019, 12, 31, 23).unwrap();
        let next = dt.shift(Duration::hours(1)).unwrap();
        assert_eq!(next.year(), Some(2020));
    }

    #[test]
    fn test_range_is_inclusive() {
        let start = Era5DateTime::new(2020, 1, 1, 0).unwrap();
        let end = Era5DateTime::new(2020, 1, 1, 3).unwrap();
        let range = datetime_range(start, end, Duration::hours(1)).unwrap();
        assert_eq!(range.len(), 4);
        assert_eq!(range.first(), Some(&start));
        assert_eq!(range.last(), Some(&end));
    }

    #[test]
    fn test_range_rejects_non_positive_step() {
        let start = Era5DateTime::new(2020, 1, 1, 0).unwrap();
        assert!(datetime_range(start, start, Duration::zero()).is_err());
    }

    #[test]
    fn test_climatology_range_covers_year() {
        let hours = climatology_range(Duration::hours(1)).unwrap().count();
        assert_eq!(hours, 365 * 24);
        let days = climatology_range(Duration::days(1)).unwrap().count();
        assert_eq!(days, 365);
    }

    #[test]
    fn test_day_of_year_roundtrip() {
        assert_eq!(date_to_day_of_year(1, 1), Some(0));
        assert_eq!(date_to_day_of_year(31, 12), Some(364));
        assert_eq!(date_to_day_of_year(29, 2), None);
        assert_eq!(day_of_year_to_date(59), Some((1, 3)));
        assert_eq!(day_of_year_to_date(365), None);
    }

    #[test]
    fn test_date_as_number() {
        assert_eq!(date_as_number(4, 7, 2021), 20210704);
    }
}
