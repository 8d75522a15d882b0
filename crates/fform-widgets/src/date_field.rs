#![forbid(unsafe_code)]

//! Composite date + time input.
//!
//! A [`DateField`] is a date part plus an embedded [`TimeField`]. Its value
//! is the date part's calendar date overlaid with the time part's time of
//! day:
//!
//! | Date part | Time part | Value |
//! |-----------|-----------|-------|
//! | 2024-03-05 | 14:30 | 2024-03-05 14:30:00 |
//! | 2024-03-05 | unset | 2024-03-05 00:00:00 |
//! | unset | any | absent |
//!
//! The field's [`Resolution`] applies to what the user enters: picked dates
//! and typed times are cut to it, and the time part is shown (and editable)
//! only for resolutions finer than `Day`. A value pushed in through
//! [`Control::set_value`] is kept exactly, so a record holding seconds reads
//! back unchanged through a minute-resolution field.
//!
//! # Locale and configuration
//!
//! [`DateField::with_config`] takes the initial resolution, popup behavior,
//! and combined pattern from a [`BindingConfig`]. When the config has no
//! pattern, the [`LocaleProvider`]'s locale picks one.

use chrono::{NaiveDate, NaiveTime};
use fform_core::temporal::{compose, split_date_time_pattern, truncate_date};
use fform_core::{
    CoercionError, Control, DesignerMetadata, ElementsGroup, Resolution, Value, ValueType,
};
use fform_runtime::{BindingConfig, DateFormats, LocaleProvider};

use crate::pattern::{self, PatternError};
use crate::time_field::{DEFAULT_TIME_FORMAT, TimeField};

/// Default date pattern (ISO 8601).
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

const FALLBACK_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y-%m-%d %H:%M:%S"];

/// Date picker with an optional time-of-day part.
#[derive(Debug, Clone)]
pub struct DateField {
    date: Option<NaiveDate>,
    time_field: TimeField,
    resolution: Resolution,
    date_format: String,
    date_time_format: String,
    close_when_date_selected: bool,
    caption: Option<String>,
    description: Option<String>,
    editable: bool,
    visible: bool,
    enabled: bool,
}

impl Default for DateField {
    fn default() -> Self {
        Self::new()
    }
}

impl DateField {
    /// ISO patterns, minute resolution.
    #[must_use]
    pub fn new() -> Self {
        Self {
            date: None,
            time_field: TimeField::new(),
            resolution: Resolution::Minute,
            date_format: DEFAULT_DATE_FORMAT.to_owned(),
            date_time_format: format!("{DEFAULT_DATE_FORMAT} {DEFAULT_TIME_FORMAT}"),
            close_when_date_selected: false,
            caption: None,
            description: None,
            editable: true,
            visible: true,
            enabled: true,
        }
    }

    /// Build from explicit configuration and locale.
    ///
    /// An unusable configured pattern falls back to the locale default.
    #[must_use]
    pub fn with_config(config: &BindingConfig, locale: &dyn LocaleProvider) -> Self {
        let mut field = Self::new();
        field.close_when_date_selected = config.close_on_date_selected;
        field.set_resolution(config.resolution);

        if let Some(pattern) = config.date_time_format.as_deref() {
            match field.set_date_format(pattern) {
                Ok(()) => return field,
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        err = %_err,
                        "configured date pattern rejected, using locale default"
                    );
                }
            }
        }
        let pattern = DateFormats::for_locale(&locale.locale()).date_time();
        if let Err(_err) = field.set_date_format(&pattern) {
            #[cfg(feature = "tracing")]
            tracing::warn!(err = %_err, "locale date pattern rejected, keeping ISO");
        }
        field
    }

    #[must_use]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Set the resolution used for later input. The time part follows it
    /// for resolutions finer than `Day`. The current value is not touched.
    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.resolution = resolution;
        if resolution.is_time_used() {
            self.time_field.set_resolution(resolution);
        }
    }

    /// The combined pattern last passed to [`DateField::set_date_format`].
    #[must_use]
    pub fn date_format(&self) -> &str {
        &self.date_time_format
    }

    /// Pattern of the date part alone.
    #[must_use]
    pub fn date_pattern(&self) -> &str {
        &self.date_format
    }

    /// Set a combined date/time pattern such as `"%d.%m.%Y %H:%M"`.
    ///
    /// The pattern is split at its first hour specifier. Without one, the
    /// time part is hidden by forcing the resolution to `Day`. Nothing
    /// changes if the pattern is invalid.
    pub fn set_date_format(&mut self, pattern: &str) -> Result<(), PatternError> {
        pattern::check(pattern)?;
        let (date, time) = split_date_time_pattern(pattern);
        pattern::check(&date)?;
        match time {
            Some(time) => {
                self.time_field.set_format(&time)?;
                self.set_resolution(self.resolution);
            }
            None => self.set_resolution(Resolution::Day),
        }
        self.date_format = date;
        self.date_time_format = pattern.to_owned();
        Ok(())
    }

    #[must_use]
    pub fn close_when_date_selected(&self) -> bool {
        self.close_when_date_selected
    }

    pub fn set_close_when_date_selected(&mut self, close: bool) {
        self.close_when_date_selected = close;
    }

    /// Calendar pick. Returns whether the popup should close.
    pub fn select_date(&mut self, date: NaiveDate) -> bool {
        self.set_date(Some(date));
        self.close_when_date_selected
    }

    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    #[must_use]
    pub fn time(&self) -> Option<NaiveTime> {
        self.time_field.time()
    }

    /// User edit of the date part. Ignored when not editable.
    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        if self.editable {
            self.date = date.map(|d| truncate_date(d, self.resolution));
        }
    }

    /// User edit of the time part. Ignored when not editable or when the
    /// resolution hides the time part.
    pub fn set_time(&mut self, time: Option<NaiveTime>) {
        if self.is_time_visible() {
            self.time_field.set_time(time);
        }
    }

    #[must_use]
    pub fn time_field(&self) -> &TimeField {
        &self.time_field
    }

    #[must_use]
    pub fn is_time_visible(&self) -> bool {
        self.resolution.is_time_used()
    }

    /// Date part, then time part when visible and set, separated by a space.
    #[must_use]
    pub fn display_text(&self) -> String {
        let Some(date) = self.date else {
            return String::new();
        };
        let mut text = pattern::render_date(date, &self.date_format);
        if self.is_time_visible() {
            let time = self.time_field.display_text();
            if !time.is_empty() {
                text.push(' ');
                text.push_str(&time);
            }
        }
        text
    }

    /// Parse typed date input with the date pattern, falling back to ISO.
    pub fn parse_date_input(&self, text: &str) -> Result<Option<NaiveDate>, CoercionError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(text, &self.date_format)
            .ok()
            .or_else(|| {
                FALLBACK_DATE_FORMATS
                    .iter()
                    .find_map(|pattern| NaiveDate::parse_from_str(text, pattern).ok())
            })
            .map(Some)
            .ok_or_else(|| {
                CoercionError::new(
                    text,
                    ValueType::Date,
                    format!("expected a date like `{}`", self.date_format),
                )
            })
    }

    /// Parse `text` and store it as the date part.
    pub fn enter_date_text(&mut self, text: &str) -> Result<(), CoercionError> {
        let date = self.parse_date_input(text)?;
        self.set_date(date);
        Ok(())
    }

    /// Parse `text` and store it as the time part.
    pub fn enter_time_text(&mut self, text: &str) -> Result<(), CoercionError> {
        let time = self.time_field.parse_input(text)?;
        self.set_time(time);
        Ok(())
    }

    #[must_use]
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = Some(caption.into());
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.time_field.set_visible(visible);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.time_field.set_enabled(enabled);
    }
}

impl Control for DateField {
    fn native_type(&self) -> ValueType {
        ValueType::DateTime
    }

    fn value(&self) -> Value {
        compose(self.date, self.time_field.time()).map_or(Value::Null, Value::DateTime)
    }

    fn set_value(&mut self, value: Value) {
        if !self.editable {
            return;
        }
        let (date, time) = match value {
            Value::DateTime(dt) => (Some(dt.date()), Some(dt.time())),
            Value::Date(d) => (Some(d), None),
            Value::Null => (None, None),
            #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
            other => {
                #[cfg(feature = "tracing")]
                tracing::warn!(value = %other, "date field ignored non-date value");
                return;
            }
        };
        self.date = date;
        self.time_field.assign(time);
    }

    fn is_editable(&self) -> bool {
        self.editable
    }

    fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
        self.time_field.set_editable(editable);
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

const DATE_FIELD_GROUPS: &[ElementsGroup] = &[ElementsGroup::new("validators")
    .icon("icons/validator.svg")
    .documentation_url("https://doc.frankenforms.dev/%VERSION%/gui_validator.html")];

impl DesignerMetadata for DateField {
    fn xml_element() -> &'static str {
        "dateField"
    }

    fn element_groups() -> &'static [ElementsGroup] {
        DATE_FIELD_GROUPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use fform_runtime::FixedLocale;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn at(d: NaiveDate, t: NaiveTime) -> Value {
        Value::DateTime(NaiveDateTime::new(d, t))
    }

    #[test]
    fn composes_date_and_time() {
        let mut field = DateField::new();
        field.set_date(Some(date(2024, 3, 5)));
        field.set_time(Some(hms(14, 30, 0)));
        assert_eq!(field.value(), at(date(2024, 3, 5), hms(14, 30, 0)));
    }

    #[test]
    fn missing_time_means_midnight() {
        let mut field = DateField::new();
        field.set_date(Some(date(2024, 3, 5)));
        assert_eq!(field.value(), at(date(2024, 3, 5), hms(0, 0, 0)));
    }

    #[test]
    fn missing_date_is_absent() {
        let mut field = DateField::new();
        field.set_time(Some(hms(8, 0, 0)));
        assert_eq!(field.value(), Value::Null);
    }

    #[test]
    fn pattern_without_hour_forces_day() {
        let mut field = DateField::new();
        field.set_date_format("%d.%m.%Y").unwrap();
        assert_eq!(field.resolution(), Resolution::Day);
        assert!(!field.is_time_visible());
        field.set_date(Some(date(2024, 3, 5)));
        field.set_time(Some(hms(9, 15, 0)));
        assert_eq!(field.value(), at(date(2024, 3, 5), hms(0, 0, 0)));
        assert_eq!(field.display_text(), "05.03.2024");
    }

    #[test]
    fn pattern_is_split_at_hour() {
        let mut field = DateField::new();
        field.set_date_format("%m/%d/%Y %I:%M %p").unwrap();
        assert_eq!(field.date_pattern(), "%m/%d/%Y");
        assert_eq!(field.time_field().format(), "%I:%M %p");
        assert_eq!(field.date_format(), "%m/%d/%Y %I:%M %p");
        assert!(field.time_field().is_am_pm_used());

        field.set_date(Some(date(2024, 3, 5)));
        field.set_time(Some(hms(14, 30, 0)));
        assert_eq!(field.display_text(), "03/05/2024 02:30 PM");
    }

    #[test]
    fn invalid_pattern_changes_nothing() {
        let mut field = DateField::new();
        assert!(field.set_date_format("%d.%Q %H").is_err());
        assert_eq!(field.date_pattern(), DEFAULT_DATE_FORMAT);
        assert_eq!(field.resolution(), Resolution::Minute);
    }

    #[test]
    fn month_resolution_truncates_date() {
        let mut field = DateField::new();
        field.set_resolution(Resolution::Month);
        field.set_date(Some(date(2024, 3, 5)));
        assert_eq!(field.date(), Some(date(2024, 3, 1)));
    }

    #[test]
    fn pushed_value_survives_coarse_resolution() {
        let mut field = DateField::new();
        field.set_resolution(Resolution::Month);
        field.set_value(at(date(2024, 3, 5), hms(14, 30, 45)));
        assert_eq!(field.value(), at(date(2024, 3, 5), hms(14, 30, 45)));
        assert!(!field.is_time_visible());

        field.set_time(Some(hms(9, 0, 0)));
        assert_eq!(field.time(), Some(hms(14, 30, 45)));
    }

    #[test]
    fn set_value_splits_parts() {
        let mut field = DateField::new();
        field.set_value(at(date(2024, 3, 5), hms(14, 30, 0)));
        assert_eq!(field.date(), Some(date(2024, 3, 5)));
        assert_eq!(field.time(), Some(hms(14, 30, 0)));

        field.set_value(Value::Date(date(2025, 1, 2)));
        assert_eq!(field.time(), None);

        field.set_value(Value::Null);
        assert_eq!(field.date(), None);
    }

    #[test]
    fn read_only_ignores_value_and_parts() {
        let mut field = DateField::new();
        field.set_editable(false);
        field.set_value(at(date(2024, 3, 5), hms(1, 0, 0)));
        field.set_date(Some(date(2024, 3, 5)));
        field.set_time(Some(hms(1, 0, 0)));
        assert_eq!(field.value(), Value::Null);
        assert!(!field.time_field().is_editable());
    }

    #[test]
    fn config_and_locale_choose_defaults() {
        let config = BindingConfig::default().close_on_date_selected(true);
        let field = DateField::with_config(&config, &FixedLocale::new("de-DE"));
        assert_eq!(field.date_format(), "%d.%m.%Y %H:%M");
        assert!(field.close_when_date_selected());
        assert_eq!(field.resolution(), Resolution::Minute);

        let config = BindingConfig::default()
            .resolution(Resolution::Second)
            .date_time_format("%Y/%m/%d %H:%M:%S");
        let field = DateField::with_config(&config, &FixedLocale::new("de-DE"));
        assert_eq!(field.date_pattern(), "%Y/%m/%d");
        assert_eq!(field.resolution(), Resolution::Second);
    }

    #[test]
    fn bad_configured_pattern_falls_back_to_locale() {
        let config = BindingConfig::default().date_time_format("%Q");
        let field = DateField::with_config(&config, &FixedLocale::new("ja"));
        assert_eq!(field.date_pattern(), "%Y/%m/%d");
    }

    #[test]
    fn select_date_reports_close_policy() {
        let mut field = DateField::new();
        assert!(!field.select_date(date(2024, 3, 5)));
        field.set_close_when_date_selected(true);
        assert!(field.select_date(date(2024, 3, 6)));
        assert_eq!(field.date(), Some(date(2024, 3, 6)));
    }

    #[test]
    fn typed_input_uses_locale_pattern() {
        let mut field =
            DateField::with_config(&BindingConfig::default(), &FixedLocale::new("en-US"));
        field.enter_date_text("03/05/2024").unwrap();
        field.enter_time_text("02:30 PM").unwrap();
        assert_eq!(field.value(), at(date(2024, 3, 5), hms(14, 30, 0)));
        assert_eq!(field.parse_date_input("2024-03-05"), Ok(Some(date(2024, 3, 5))));
        assert!(field.parse_date_input("yesterday").is_err());
    }

    #[test]
    fn designer_metadata_lists_validators() {
        assert_eq!(DateField::xml_element(), "dateField");
        let groups = DateField::element_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[0].documentation_url_for("2.4.1").as_deref(),
            Some("https://doc.frankenforms.dev/2.4/gui_validator.html")
        );
    }
}
