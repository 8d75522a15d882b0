#![forbid(unsafe_code)]

//! Time-of-day input.
//!
//! A [`TimeField`] shows hours, optionally minutes, and optionally seconds.
//! Its resolution is clamped to `Hour..=Second`; fields finer than the
//! resolution are zeroed on user input. Times pushed in through
//! [`Control::set_value`] are stored as given.
//!
//! # Example
//!
//! ```ignore
//! let mut field = TimeField::new().with_format("%I:%M %p")?;
//! field.enter_text("02:30 PM")?;
//! assert_eq!(field.time(), NaiveTime::from_hms_opt(14, 30, 0));
//! ```

use chrono::NaiveTime;
use fform_core::temporal::truncate_time;
use fform_core::{CoercionError, Control, Resolution, Value, ValueType};

use crate::pattern::{self, PatternError};

/// Default 24-hour pattern.
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";

/// Patterns tried after the configured one when parsing typed input.
const FALLBACK_TIME_FORMATS: [&str; 3] = ["%H:%M:%S", "%H:%M", "%I:%M %p"];

/// Time-of-day control.
#[derive(Debug, Clone)]
pub struct TimeField {
    time: Option<NaiveTime>,
    resolution: Resolution,
    format: String,
    editable: bool,
    visible: bool,
    enabled: bool,
}

impl Default for TimeField {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeField {
    #[must_use]
    pub fn new() -> Self {
        Self {
            time: None,
            resolution: Resolution::Minute,
            format: DEFAULT_TIME_FORMAT.to_owned(),
            editable: true,
            visible: true,
            enabled: true,
        }
    }

    /// Builder form of [`TimeField::set_format`].
    pub fn with_format(mut self, pattern: &str) -> Result<Self, PatternError> {
        self.set_format(pattern)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.set_resolution(resolution);
        self
    }

    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn set_format(&mut self, pattern: &str) -> Result<(), PatternError> {
        pattern::check(pattern)?;
        self.format = pattern.to_owned();
        Ok(())
    }

    /// Whether the format uses a 12-hour clock with an AM/PM marker.
    #[must_use]
    pub fn is_am_pm_used(&self) -> bool {
        pattern::uses_am_pm(&self.format)
    }

    #[must_use]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Set the resolution for later input, clamped to `Hour..=Second`.
    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.resolution = resolution.clamp_to_time();
    }

    #[must_use]
    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    /// User edit, truncated to the resolution. Ignored when the field is
    /// not editable.
    pub fn set_time(&mut self, time: Option<NaiveTime>) {
        if self.editable {
            self.time = time.map(|t| truncate_time(t, self.resolution));
        }
    }

    /// Store `time` untouched, regardless of editability.
    pub(crate) fn assign(&mut self, time: Option<NaiveTime>) {
        self.time = time;
    }

    /// Parse typed input with the field's format, then common fallbacks.
    ///
    /// Empty input means "no time". The result is truncated to the
    /// resolution.
    pub fn parse_input(&self, text: &str) -> Result<Option<NaiveTime>, CoercionError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        NaiveTime::parse_from_str(text, &self.format)
            .ok()
            .or_else(|| {
                FALLBACK_TIME_FORMATS
                    .iter()
                    .find_map(|pattern| NaiveTime::parse_from_str(text, pattern).ok())
            })
            .map(|t| Some(truncate_time(t, self.resolution)))
            .ok_or_else(|| {
                CoercionError::new(
                    text,
                    ValueType::Time,
                    format!("expected a time like `{}`", self.format),
                )
            })
    }

    /// Parse `text` and store it as a user edit.
    pub fn enter_text(&mut self, text: &str) -> Result<(), CoercionError> {
        let time = self.parse_input(text)?;
        self.set_time(time);
        Ok(())
    }

    /// The time rendered with the field's format; empty when unset.
    #[must_use]
    pub fn display_text(&self) -> String {
        self.time
            .map(|t| pattern::render_time(t, &self.format))
            .unwrap_or_default()
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl Control for TimeField {
    fn native_type(&self) -> ValueType {
        ValueType::Time
    }

    fn value(&self) -> Value {
        self.time.map_or(Value::Null, Value::Time)
    }

    fn set_value(&mut self, value: Value) {
        if !self.editable {
            return;
        }
        match value {
            Value::Time(t) => self.assign(Some(t)),
            Value::DateTime(dt) => self.assign(Some(dt.time())),
            Value::Null => self.assign(None),
            #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
            other => {
                #[cfg(feature = "tracing")]
                tracing::warn!(value = %other, "time field ignored non-time value");
            }
        }
    }

    fn is_editable(&self) -> bool {
        self.editable
    }

    fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
