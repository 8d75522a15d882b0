#![forbid(unsafe_code)]

//! Single-line text input.
//!
//! Input is normalized on the way in: optionally trimmed, then cut to the
//! maximum length in grapheme clusters. Text that ends up empty is stored
//! as "no value".

use fform_core::{Control, Value, ValueType};
use unicode_segmentation::UnicodeSegmentation;

/// Plain text control.
#[derive(Debug, Clone)]
pub struct TextField {
    text: Option<String>,
    max_length: Option<usize>,
    trim: bool,
    editable: bool,
    visible: bool,
    enabled: bool,
}

impl Default for TextField {
    fn default() -> Self {
        Self::new()
    }
}

impl TextField {
    #[must_use]
    pub fn new() -> Self {
        Self {
            text: None,
            max_length: None,
            trim: false,
            editable: true,
            visible: true,
            enabled: true,
        }
    }

    /// Limit input to `max` grapheme clusters.
    #[must_use]
    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Strip leading and trailing whitespace from input.
    #[must_use]
    pub fn with_trimming(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    #[must_use]
    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// User edit. Ignored when not editable.
    pub fn set_text(&mut self, text: &str) {
        if self.editable {
            self.text = self.normalize(text);
        }
    }

    pub fn clear(&mut self) {
        self.set_text("");
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn normalize(&self, text: &str) -> Option<String> {
        let text = if self.trim { text.trim() } else { text };
        let text = match self.max_length {
            Some(max) => text.graphemes(true).take(max).collect(),
            None => text.to_owned(),
        };
        (!text.is_empty()).then_some(text)
    }
}

impl Control for TextField {
    fn native_type(&self) -> ValueType {
        ValueType::Text
    }

    fn value(&self) -> Value {
        self.text.clone().map_or(Value::Null, Value::Text)
    }

    fn set_value(&mut self, value: Value) {
        if !self.editable {
            return;
        }
        self.text = match value {
            Value::Null => None,
            Value::Text(text) => self.normalize(&text),
            other => self.normalize(&other.to_string()),
        };
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
