#![forbid(unsafe_code)]

//! Dynamically typed attribute values.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Declared type of an attribute, or native type of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ValueType {
    Bool,
    Int,
    Decimal,
    Text,
    Date,
    Time,
    DateTime,
}

impl ValueType {
    /// All value types, in declaration order.
    pub const ALL: [ValueType; 7] = [
        Self::Bool,
        Self::Int,
        Self::Decimal,
        Self::Text,
        Self::Date,
        Self::Time,
        Self::DateTime,
    ];

    /// Lower-case name used in error messages and configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Decimal => "decimal",
            Self::Text => "text",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date_time",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single attribute value.
///
/// `Null` is the "no value" state for every type. A value is considered
/// *absent* when it is `Null` or an empty `Text`; see [`Value::is_absent`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Decimal(f64),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl Value {
    /// The runtime type of this value, or `None` for `Null`.
    #[must_use]
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(ValueType::Bool),
            Self::Int(_) => Some(ValueType::Int),
            Self::Decimal(_) => Some(ValueType::Decimal),
            Self::Text(_) => Some(ValueType::Text),
            Self::Date(_) => Some(ValueType::Date),
            Self::Time(_) => Some(ValueType::Time),
            Self::DateTime(_) => Some(ValueType::DateTime),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether the value counts as "not filled in" for required checks.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Whether this value may be stored in an attribute declared as `ty`.
    #[must_use]
    pub fn conforms_to(&self, ty: ValueType) -> bool {
        self.value_type().is_none_or(|actual| actual == ty)
    }

    #[must_use]
    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Self::Time(t) => Some(*t),
            Self::DateTime(dt) => Some(dt.time()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Self::Time(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_covers_null_and_empty_text() {
        assert!(Value::Null.is_absent());
        assert!(Value::from("").is_absent());
        assert!(!Value::from(" ").is_absent());
        assert!(!Value::Int(0).is_absent());
    }

    #[test]
    fn null_conforms_to_every_type() {
        for ty in ValueType::ALL {
            assert!(Value::Null.conforms_to(ty));
        }
        assert!(Value::Int(3).conforms_to(ValueType::Int));
        assert!(!Value::Int(3).conforms_to(ValueType::Text));
    }

    #[test]
    fn option_conversion() {
        let none: Option<i64> = None;
        assert_eq!(Value::from(none), Value::Null);
        assert_eq!(Value::from(Some(7_i64)), Value::Int(7));
    }

    #[test]
    fn date_time_projections() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 5)
            .and_then(|d| d.and_hms_opt(14, 30, 0))
            .unwrap();
        let v = Value::from(dt);
        assert_eq!(v.as_date(), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(v.as_time(), NaiveTime::from_hms_opt(14, 30, 0));
        assert_eq!(v.value_type(), Some(ValueType::DateTime));
    }
}
