#![forbid(unsafe_code)]

//! Descriptive metadata for visual screen designers.
//!
//! A control lists the groups of nested elements it accepts in declarative
//! screen markup (columns, actions, validators, ...) so that a designer tool
//! can enumerate them. Nothing here participates in binding at runtime.

/// Placeholder replaced by the `major.minor` version in documentation URLs.
pub const VERSION_PLACEHOLDER: &str = "%VERSION%";

/// A nested group of elements of a UI control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementsGroup {
    /// XML tag of the group.
    pub xml_element: &'static str,
    /// Hierarchy icon, SVG or PNG path. Empty when none.
    pub icon: &'static str,
    /// Documentation page; may contain [`VERSION_PLACEHOLDER`]. Empty when none.
    pub documentation_url: &'static str,
}

impl ElementsGroup {
    #[must_use]
    pub const fn new(xml_element: &'static str) -> Self {
        Self {
            xml_element,
            icon: "",
            documentation_url: "",
        }
    }

    #[must_use]
    pub const fn icon(mut self, icon: &'static str) -> Self {
        self.icon = icon;
        self
    }

    #[must_use]
    pub const fn documentation_url(mut self, url: &'static str) -> Self {
        self.documentation_url = url;
        self
    }

    /// Documentation URL for an artifact `version` such as `"1.2.3"`.
    ///
    /// Returns `None` when the group has no documentation URL.
    #[must_use]
    pub fn documentation_url_for(&self, version: &str) -> Option<String> {
        if self.documentation_url.is_empty() {
            return None;
        }
        Some(
            self.documentation_url
                .replace(VERSION_PLACEHOLDER, &minor_version(version)),
        )
    }
}

/// `major.minor` of a dotted version string.
#[must_use]
pub fn minor_version(version: &str) -> String {
    version.split('.').take(2).collect::<Vec<_>>().join(".")
}

/// Implemented by controls that expose nested element groups to designers.
pub trait DesignerMetadata {
    /// XML tag of the control itself.
    fn xml_element() -> &'static str;

    fn element_groups() -> &'static [ElementsGroup] {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALIDATORS: ElementsGroup = ElementsGroup::new("validators")
        .icon("icons/validator.svg")
        .documentation_url("https://docs.example.org/forms/%VERSION%/validators.html");

    #[test]
    fn documentation_url_uses_minor_version() {
        assert_eq!(
            VALIDATORS.documentation_url_for("7.2.11").as_deref(),
            Some("https://docs.example.org/forms/7.2/validators.html")
        );
    }

    #[test]
    fn missing_documentation_url() {
        assert_eq!(ElementsGroup::new("columns").documentation_url_for("1.0"), None);
    }

    #[test]
    fn minor_version_of_short_versions() {
        assert_eq!(minor_version("3"), "3");
        assert_eq!(minor_version("3.1"), "3.1");
    }
}
