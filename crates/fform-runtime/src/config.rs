#![forbid(unsafe_code)]

//! Binding configuration.
//!
//! [`BindingConfig`] is handed to controls and bindings at construction time.
//! With the `policy-config` feature it can be loaded from TOML or JSON:
//!
//! ```toml
//! close_on_date_selected = true
//! resolution = "minute"
//! required_message = "Please fill in this field"
//! date_time_format = "%d.%m.%Y %H:%M"
//! ```
//!
//! Missing keys fall back to [`BindingConfig::default`].

use fform_core::Resolution;

/// Construction-time settings for bindings and date controls.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "policy-config", derive(serde::Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct BindingConfig {
    /// Close the calendar popup as soon as a date is picked.
    pub close_on_date_selected: bool,
    /// Initial resolution of date/time controls.
    pub resolution: Resolution,
    /// Message for missing required values; a generic one is used when unset.
    pub required_message: Option<String>,
    /// Combined date/time pattern; the locale default is used when unset.
    pub date_time_format: Option<String>,
}

impl BindingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn close_on_date_selected(mut self, close: bool) -> Self {
        self.close_on_date_selected = close;
        self
    }

    #[must_use]
    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    #[must_use]
    pub fn required_message(mut self, message: impl Into<String>) -> Self {
        self.required_message = Some(message.into());
        self
    }

    #[must_use]
    pub fn date_time_format(mut self, pattern: impl Into<String>) -> Self {
        self.date_time_format = Some(pattern.into());
        self
    }
}

/// Failure to load a [`BindingConfig`].
#[cfg(feature = "policy-config")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid TOML binding config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON binding config: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "policy-config")]
impl BindingConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BindingConfig::default();
        assert!(!config.close_on_date_selected);
        assert_eq!(config.resolution, Resolution::Minute);
        assert_eq!(config.required_message, None);
    }

    #[test]
    fn builder_sets_fields() {
        let config = BindingConfig::new()
            .close_on_date_selected(true)
            .resolution(Resolution::Day)
            .required_message("needed")
            .date_time_format("%Y");
        assert!(config.close_on_date_selected);
        assert_eq!(config.resolution, Resolution::Day);
        assert_eq!(config.required_message.as_deref(), Some("needed"));
        assert_eq!(config.date_time_format.as_deref(), Some("%Y"));
    }

    #[cfg(feature = "policy-config")]
    #[test]
    fn loads_partial_toml() {
        let config = BindingConfig::from_toml_str(
            r#"
            close_on_date_selected = true
            resolution = "second"
            "#,
        )
        .unwrap();
        assert!(config.close_on_date_selected);
        assert_eq!(config.resolution, Resolution::Second);
        assert_eq!(config.required_message, None);
    }

    #[cfg(feature = "policy-config")]
    #[test]
    fn loads_json() {
        let config =
            BindingConfig::from_json_str(r#"{"required_message": "fill me"}"#).unwrap();
        assert_eq!(config.required_message.as_deref(), Some("fill me"));
        assert_eq!(config.resolution, Resolution::Minute);
    }

    #[cfg(feature = "policy-config")]
    #[test]
    fn rejects_unknown_resolution() {
        assert!(matches!(
            BindingConfig::from_toml_str(r#"resolution = "week""#),
            Err(ConfigError::Toml(_))
        ));
    }
}
