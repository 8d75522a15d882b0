#![forbid(unsafe_code)]

//! Date/time resolution and composition.
//!
//! A [`Resolution`] is the finest unit a date/time control exposes. It
//! shapes what a user can enter: fields finer than the resolution are zeroed
//! (or reset to the first day/month) on input. Values that arrive from a
//! record are never truncated.
//!
//! Composition overlays a time part onto a date part: the date supplies
//! year/month/day, the time supplies hour/minute/second, and a missing time
//! part means midnight.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Granularity of a date/time control, ordered finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Resolution {
    Second,
    #[default]
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl Resolution {
    /// Whether a time part is shown at all.
    #[must_use]
    pub fn is_time_used(self) -> bool {
        self < Self::Day
    }

    #[must_use]
    pub fn is_hour_used(self) -> bool {
        self <= Self::Hour
    }

    #[must_use]
    pub fn is_minute_used(self) -> bool {
        self <= Self::Minute
    }

    #[must_use]
    pub fn is_second_used(self) -> bool {
        self == Self::Second
    }

    /// Clamp to a resolution a time-only control can display.
    #[must_use]
    pub fn clamp_to_time(self) -> Self {
        self.min(Self::Hour)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "second" | "sec" => Ok(Self::Second),
            "minute" | "min" => Ok(Self::Minute),
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(format!("unknown resolution `{other}`")),
        }
    }
}

/// Zero the time fields finer than `resolution`.
#[must_use]
pub fn truncate_time(time: NaiveTime, resolution: Resolution) -> NaiveTime {
    let hour = if resolution.is_hour_used() { time.hour() } else { 0 };
    let minute = if resolution.is_minute_used() { time.minute() } else { 0 };
    let second = if resolution.is_second_used() { time.second() } else { 0 };
    NaiveTime::from_hms_opt(hour, minute, second).unwrap_or(NaiveTime::MIN)
}

/// Reset the date fields finer than `resolution` to their first value.
#[must_use]
pub fn truncate_date(date: NaiveDate, resolution: Resolution) -> NaiveDate {
    let (month, day) = match resolution {
        Resolution::Year => (1, 1),
        Resolution::Month => (date.month(), 1),
        _ => (date.month(), date.day()),
    };
    NaiveDate::from_ymd_opt(date.year(), month, day).unwrap_or(date)
}

/// Overlay `time` onto `date`.
///
/// Returns `None` when there is no date part. A missing time part yields
/// midnight.
#[must_use]
pub fn compose(date: Option<NaiveDate>, time: Option<NaiveTime>) -> Option<NaiveDateTime> {
    date.map(|d| d.and_time(time.unwrap_or(NaiveTime::MIN)))
}

/// Hour specifiers that start the time portion of a combined pattern.
const HOUR_SPECIFIERS: [&str; 4] = ["%H", "%I", "%k", "%l"];

/// Split a combined chrono pattern into `(date_pattern, time_pattern)`.
///
/// The split happens at the first hour specifier. Both halves are trimmed;
/// the time pattern is `None` when the pattern has no hour specifier.
#[must_use]
pub fn split_date_time_pattern(pattern: &str) -> (String, Option<String>) {
    let start = HOUR_SPECIFIERS
        .iter()
        .filter_map(|spec| pattern.find(spec))
        .min();
    match start {
        Some(pos) => (
            pattern[..pos].trim().to_owned(),
            Some(pattern[pos..].trim().to_owned()),
        ),
        None => (pattern.trim().to_owned(), None),
    }
}
