#![forbid(unsafe_code)]

//! Checked chrono format patterns.
//!
//! chrono reports a bad specifier only when the value is rendered, and
//! `to_string` panics on it. Controls validate patterns once when they are
//! set and render through [`render`], which never panics.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveTime};

/// A date or time pattern chrono cannot render.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date/time pattern `{pattern}`")]
pub struct PatternError {
    pub pattern: String,
}

/// Reject patterns containing unknown specifiers.
pub fn check(pattern: &str) -> Result<(), PatternError> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(PatternError {
            pattern: pattern.to_owned(),
        });
    }
    Ok(())
}

/// Whether the pattern renders a 12-hour clock.
#[must_use]
pub fn uses_am_pm(pattern: &str) -> bool {
    ["%p", "%P", "%I", "%l", "%r"]
        .iter()
        .any(|spec| pattern.contains(spec))
}

pub(crate) fn render_date(date: NaiveDate, pattern: &str) -> String {
    render(|out| write!(out, "{}", date.format(pattern)))
}

pub(crate) fn render_time(time: NaiveTime, pattern: &str) -> String {
    render(|out| write!(out, "{}", time.format(pattern)))
}

fn render(write: impl FnOnce(&mut String) -> std::fmt::Result) -> String {
    let mut out = String::new();
    if write(&mut out).is_err() {
        out.clear();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_patterns() {
        for pattern in ["%Y-%m-%d", "%d.%m.%Y %H:%M", "%I:%M %p", "%H:%M:%S"] {
            assert!(check(pattern).is_ok(), "{pattern}");
        }
    }

    #[test]
    fn rejects_unknown_specifier() {
        assert_eq!(
            check("%Y-%Q"),
            Err(PatternError {
                pattern: "%Y-%Q".into()
            })
        );
    }

    #[test]
    fn detects_twelve_hour_clock() {
        assert!(uses_am_pm("%I:%M %p"));
        assert!(!uses_am_pm("%H:%M"));
    }

    #[test]
    fn render_does_not_panic_on_bad_pattern() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(render_date(date, "%d/%m/%Y"), "05/03/2024");
        assert_eq!(render_date(date, "%Q"), "");
    }
}
