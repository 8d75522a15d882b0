#![forbid(unsafe_code)]

//! Validators and validation state.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDateTime;
use fform_core::Value;

/// Global counter for validator handles.
static VALIDATOR_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Handle returned by `add_validator`, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValidatorId(u64);

impl ValidatorId {
    pub(crate) fn next() -> Self {
        Self(VALIDATOR_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Why a value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The value is absent but the field is required.
    #[error("{message}")]
    RequiredValueMissing { message: String },
    /// A validator rejected the value.
    #[error("{message}")]
    Invalid { message: String },
}

impl ValidationError {
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::RequiredValueMissing { message } | Self::Invalid { message } => message,
        }
    }
}

/// Whether the binding's last synchronization or validation succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationOutcome {
    #[default]
    Valid,
    Invalid { reason: String },
}

impl ValidationOutcome {
    #[must_use]
    pub fn invalid(reason: impl fmt::Display) -> Self {
        Self::Invalid {
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid { reason } => Some(reason),
        }
    }
}

/// Checks a non-absent value.
pub trait Validator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError>;
}

impl<F> Validator for F
where
    F: Fn(&Value) -> Result<(), ValidationError>,
{
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        self(value)
    }
}

/// Accepts date-times (and dates) inside an inclusive range.
///
/// Values of other types pass untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRangeValidator {
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    message: Option<String>,
}

impl DateRangeValidator {
    #[must_use]
    pub fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self {
            start,
            end,
            message: None,
        }
    }

    /// Replace the generated message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn reject(&self, bound: &str, limit: NaiveDateTime) -> ValidationError {
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| format!("value must not be {bound} {limit}"));
        ValidationError::invalid(message)
    }
}

impl Validator for DateRangeValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let at = match value {
            Value::DateTime(dt) => *dt,
            Value::Date(d) => d.and_time(chrono::NaiveTime::MIN),
            _ => return Ok(()),
        };
        if let Some(start) = self.start {
            if at < start {
                return Err(self.reject("before", start));
            }
        }
        if let Some(end) = self.end {
            if at > end {
                return Err(self.reject("after", end));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    #[test]
    fn closure_is_a_validator() {
        let positive = |v: &Value| match v.as_int() {
            Some(i) if i > 0 => Ok(()),
            _ => Err(ValidationError::invalid("must be positive")),
        };
        assert!(positive.validate(&Value::Int(1)).is_ok());
        assert_eq!(
            positive.validate(&Value::Int(0)).unwrap_err().message(),
            "must be positive"
        );
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let v = DateRangeValidator::new(Some(at(2024, 1, 1)), Some(at(2024, 12, 31)));
        assert!(v.validate(&Value::from(at(2024, 1, 1))).is_ok());
        assert!(v.validate(&Value::from(at(2024, 12, 31))).is_ok());
        assert!(v.validate(&Value::from(at(2023, 12, 31))).is_err());
        assert!(v.validate(&Value::from(at(2025, 1, 1))).is_err());
    }

    #[test]
    fn date_range_ignores_other_types() {
        let v = DateRangeValidator::new(Some(at(2024, 1, 1)), None);
        assert!(v.validate(&Value::Int(5)).is_ok());
    }

    #[test]
    fn date_range_custom_message() {
        let v = DateRangeValidator::new(None, Some(at(2024, 1, 1))).with_message("too late");
        let err = v.validate(&Value::from(at(2030, 1, 1))).unwrap_err();
        assert_eq!(err, ValidationError::invalid("too late"));
    }

    #[test]
    fn outcome_reason() {
        assert_eq!(ValidationOutcome::Valid.reason(), None);
        let o = ValidationOutcome::invalid("bad");
        assert!(!o.is_valid());
        assert_eq!(o.reason(), Some("bad"));
    }
}
