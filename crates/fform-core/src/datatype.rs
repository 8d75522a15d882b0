#![forbid(unsafe_code)]

//! Datatypes and text round-trip coercion.
//!
//! A [`Datatype`] knows how to render values of one [`ValueType`] to their
//! canonical text and how to parse that text back. When a control's native
//! type differs from an attribute's declared type, a [`Coercion`] converts
//! between the two by formatting with the source datatype and parsing with
//! the target datatype.
//!
//! Canonical text forms of the standard datatypes:
//!
//! | Type | Format |
//! |------|--------|
//! | `date` | `%Y-%m-%d` |
//! | `time` | `%H:%M:%S` |
//! | `date_time` | `%Y-%m-%d %H:%M:%S` |
//! | `bool` | `true` / `false` |
//!
//! `Null` formats to the empty string, and the empty string parses to `Null`
//! for every standard datatype except `text`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::CoercionError;
use crate::value::{Value, ValueType};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Text format/parse capability for one value type.
pub trait Datatype {
    /// The value type this datatype produces.
    fn value_type(&self) -> ValueType;

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        self.value_type().name()
    }

    /// Canonical text of `value`.
    fn format(&self, value: &Value) -> String;

    /// Parse canonical text into a value of [`Datatype::value_type`].
    fn parse(&self, text: &str) -> Result<Value, CoercionError>;
}

fn format_any(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Decimal(d) => d.to_string(),
        Value::Text(s) => s.clone(),
        Value::Date(d) => d.format(DATE_FORMAT).to_string(),
        Value::Time(t) => t.format(TIME_FORMAT).to_string(),
        Value::DateTime(dt) => dt.format(DATE_TIME_FORMAT).to_string(),
    }
}

/// Standard datatype for one [`ValueType`], using the canonical formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardDatatype(ValueType);

impl StandardDatatype {
    #[must_use]
    pub const fn new(value_type: ValueType) -> Self {
        Self(value_type)
    }
}

impl Datatype for StandardDatatype {
    fn value_type(&self) -> ValueType {
        self.0
    }

    fn format(&self, value: &Value) -> String {
        format_any(value)
    }

    fn parse(&self, text: &str) -> Result<Value, CoercionError> {
        let target = self.0;
        if target == ValueType::Text {
            return Ok(Value::Text(text.to_owned()));
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Value::Null);
        }
        let fail = |reason: String| CoercionError::new(text, target, reason);
        match target {
            ValueType::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(fail("expected `true` or `false`".into())),
            },
            ValueType::Int => trimmed
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| fail(e.to_string())),
            ValueType::Decimal => trimmed
                .parse::<f64>()
                .map(Value::Decimal)
                .map_err(|e| fail(e.to_string())),
            ValueType::Date => parse_date(trimmed)
                .map(Value::Date)
                .map_err(|e| fail(e.to_string())),
            ValueType::Time => parse_time(trimmed)
                .map(Value::Time)
                .map_err(|e| fail(e.to_string())),
            ValueType::DateTime => parse_date_time(trimmed)
                .map(Value::DateTime)
                .map_err(|e| fail(e.to_string())),
            ValueType::Text => Ok(Value::Text(text.to_owned())),
        }
    }
}

/// Date, or the date portion of a date-time.
fn parse_date(text: &str) -> chrono::ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).or_else(|err| {
        NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT)
            .map(|dt| dt.date())
            .map_err(|_| err)
    })
}

/// Time (with or without seconds), or the time portion of a date-time.
fn parse_time(text: &str) -> chrono::ParseResult<NaiveTime> {
    NaiveTime::parse_from_str(text, TIME_FORMAT)
        .or_else(|err| NaiveTime::parse_from_str(text, "%H:%M").map_err(|_| err))
        .or_else(|err| {
            NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT)
                .map(|dt| dt.time())
                .map_err(|_| err)
        })
}

/// Date-time, or a bare date at midnight.
fn parse_date_time(text: &str) -> chrono::ParseResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT).or_else(|err| {
        NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map(|d| d.and_time(NaiveTime::MIN))
            .map_err(|_| err)
    })
}

/// Registry of datatypes keyed by value type.
///
/// [`Datatypes::standard`] pre-registers a [`StandardDatatype`] for every
/// value type; [`Datatypes::register`] replaces the entry for a type.
#[derive(Clone)]
pub struct Datatypes {
    by_type: HashMap<ValueType, Arc<dyn Datatype>>,
}

impl Datatypes {
    #[must_use]
    pub fn standard() -> Self {
        let by_type = ValueType::ALL
            .into_iter()
            .map(|ty| (ty, Arc::new(StandardDatatype::new(ty)) as Arc<dyn Datatype>))
            .collect();
        Self { by_type }
    }

    /// Replace the datatype registered for `datatype.value_type()`.
    pub fn register(&mut self, datatype: Arc<dyn Datatype>) -> &mut Self {
        self.by_type.insert(datatype.value_type(), datatype);
        self
    }

    /// The datatype for `ty`.
    #[must_use]
    pub fn get(&self, ty: ValueType) -> Arc<dyn Datatype> {
        self.by_type
            .get(&ty)
            .cloned()
            .unwrap_or_else(|| Arc::new(StandardDatatype::new(ty)))
    }
}

impl Default for Datatypes {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Datatypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.by_type.values().map(|d| d.name().to_owned()).collect();
        names.sort();
        f.debug_struct("Datatypes").field("types", &names).finish()
    }
}

/// Conversion between a control's native type and an attribute's declared
/// type, resolved once per binding.
#[derive(Clone)]
pub enum Coercion {
    /// Native and declared types match; values pass through.
    Identity,
    /// Values cross over via canonical text.
    ViaText {
        native: Arc<dyn Datatype>,
        declared: Arc<dyn Datatype>,
    },
}

impl Coercion {
    #[must_use]
    pub fn resolve(native: ValueType, declared: ValueType, datatypes: &Datatypes) -> Self {
        if native == declared {
            Self::Identity
        } else {
            Self::ViaText {
                native: datatypes.get(native),
                declared: datatypes.get(declared),
            }
        }
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// Convert a control value into the attribute's declared type.
    pub fn to_declared(&self, value: Value) -> Result<Value, CoercionError> {
        match self {
            Self::Identity => Ok(value),
            Self::ViaText { native, declared } => convert(value, native.as_ref(), declared.as_ref()),
        }
    }

    /// Convert an attribute value into the control's native type.
    pub fn to_native(&self, value: Value) -> Result<Value, CoercionError> {
        match self {
            Self::Identity => Ok(value),
            Self::ViaText { native, declared } => convert(value, declared.as_ref(), native.as_ref()),
        }
    }
}

fn convert(value: Value, from: &dyn Datatype, to: &dyn Datatype) -> Result<Value, CoercionError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    if value.value_type() == Some(to.value_type()) {
        return Ok(value);
    }
    to.parse(&from.format(&value))
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("Identity"),
            Self::ViaText { native, declared } => f
                .debug_struct("ViaText")
                .field("native", &native.name())
                .field("declared", &declared.name())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, s))
            .unwrap()
    }

    #[test]
    fn date_time_to_date_truncates() {
        let c = Coercion::resolve(ValueType::DateTime, ValueType::Date, &Datatypes::standard());
        let out = c.to_declared(Value::from(dt(2024, 3, 5, 14, 30, 0))).unwrap();
        assert_eq!(out, Value::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()));
    }

    #[test]
    fn date_to_date_time_is_midnight() {
        let c = Coercion::resolve(ValueType::DateTime, ValueType::Date, &Datatypes::standard());
        let back = c
            .to_native(Value::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()))
            .unwrap();
        assert_eq!(back, Value::from(dt(2024, 3, 5, 0, 0, 0)));
    }

    #[test]
    fn date_time_to_text_uses_canonical_form() {
        let c = Coercion::resolve(ValueType::DateTime, ValueType::Text, &Datatypes::standard());
        let out = c.to_declared(Value::from(dt(2024, 3, 5, 14, 30, 0))).unwrap();
        assert_eq!(out, Value::from("2024-03-05 14:30:00"));
    }

    #[test]
    fn date_time_to_int_fails() {
        let c = Coercion::resolve(ValueType::DateTime, ValueType::Int, &Datatypes::standard());
        let err = c.to_declared(Value::from(dt(2024, 3, 5, 0, 0, 0))).unwrap_err();
        assert_eq!(err.target, ValueType::Int);
        assert_eq!(err.text, "2024-03-05 00:00:00");
    }

    #[test]
    fn null_passes_through_every_coercion() {
        let c = Coercion::resolve(ValueType::DateTime, ValueType::Int, &Datatypes::standard());
        assert_eq!(c.to_declared(Value::Null).unwrap(), Value::Null);
        assert_eq!(c.to_native(Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn identity_when_types_match() {
        let c = Coercion::resolve(ValueType::Int, ValueType::Int, &Datatypes::standard());
        assert!(c.is_identity());
        assert_eq!(c.to_declared(Value::Int(4)).unwrap(), Value::Int(4));
    }

    #[test]
    fn empty_text_parses_to_null() {
        let int = StandardDatatype::new(ValueType::Int);
        assert_eq!(int.parse("  ").unwrap(), Value::Null);
        let text = StandardDatatype::new(ValueType::Text);
        assert_eq!(text.parse("").unwrap(), Value::from(""));
    }

    #[test]
    fn time_accepts_short_form() {
        let t = StandardDatatype::new(ValueType::Time);
        assert_eq!(
            t.parse("14:30").unwrap(),
            Value::Time(NaiveTime::from_hms_opt(14, 30, 0).unwrap())
        );
    }

    #[derive(Debug)]
    struct YearOnly;

    impl Datatype for YearOnly {
        fn value_type(&self) -> ValueType {
            ValueType::Int
        }

        fn name(&self) -> &str {
            "year"
        }

        fn format(&self, value: &Value) -> String {
            value.as_int().map(|y| y.to_string()).unwrap_or_default()
        }

        fn parse(&self, text: &str) -> Result<Value, CoercionError> {
            text.get(..4)
                .and_then(|y| y.parse().ok())
                .map(Value::Int)
                .ok_or_else(|| CoercionError::new(text, ValueType::Int, "no leading year"))
        }
    }

    #[test]
    fn registered_datatype_overrides_standard() {
        let mut registry = Datatypes::standard();
        registry.register(Arc::new(YearOnly));
        let c = Coercion::resolve(ValueType::DateTime, ValueType::Int, &registry);
        let out = c.to_declared(Value::from(dt(2024, 3, 5, 14, 30, 0))).unwrap();
        assert_eq!(out, Value::Int(2024));
        assert_eq!(registry.get(ValueType::Int).name(), "year");
    }
}
