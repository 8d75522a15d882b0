#![forbid(unsafe_code)]

//! Dotted attribute paths.
//!
//! An [`AttributePath`] is an ordered, non-empty list of attribute names. All
//! but the last segment name reference attributes; the last one names the
//! value being addressed. Paths are immutable once parsed and cheap to clone.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::error::InvalidPathError;

/// Address of a (possibly nested) attribute inside a record.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AttributePath {
    segments: Rc<[String]>,
}

impl AttributePath {
    /// Parse a dotted path such as `"customer.address.city"`.
    ///
    /// Surrounding whitespace of each segment is ignored.
    pub fn parse(text: &str) -> Result<Self, InvalidPathError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(InvalidPathError::Empty);
        }
        let mut segments = Vec::new();
        for raw in text.split('.') {
            let segment = raw.trim();
            if segment.is_empty() {
                return Err(InvalidPathError::EmptySegment {
                    path: text.to_owned(),
                });
            }
            segments.push(segment.to_owned());
        }
        Ok(Self {
            segments: segments.into(),
        })
    }

    /// Build a path from already-split segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, InvalidPathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(InvalidPathError::Empty);
        }
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(InvalidPathError::EmptySegment {
                path: segments.join("."),
            });
        }
        Ok(Self {
            segments: segments.into(),
        })
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First segment.
    #[must_use]
    pub fn head(&self) -> &str {
        &self.segments[0]
    }

    /// Last segment, the name of the addressed value attribute.
    #[must_use]
    pub fn terminal(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Whether the path has a single segment.
    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.segments.len() == 1
    }

    /// The path without its first segment, or `None` for a direct path.
    #[must_use]
    pub fn tail(&self) -> Option<AttributePath> {
        if self.is_direct() {
            return None;
        }
        Some(Self {
            segments: self.segments[1..].to_vec().into(),
        })
    }

    /// Whether `self` is a strict prefix of `other`.
    #[must_use]
    pub fn is_strict_prefix_of(&self, other: &AttributePath) -> bool {
        self.len() < other.len() && other.segments.starts_with(&self.segments)
    }

    /// The remainder of `other` after stripping `self`, if `self` is a strict prefix.
    #[must_use]
    pub fn strip_from(&self, other: &AttributePath) -> Option<AttributePath> {
        if !self.is_strict_prefix_of(other) {
            return None;
        }
        Some(Self {
            segments: other.segments[self.len()..].to_vec().into(),
        })
    }

    /// Prepend `segment` to this path.
    #[must_use]
    pub fn prefixed(&self, segment: &str) -> AttributePath {
        let mut segments = Vec::with_capacity(self.len() + 1);
        segments.push(segment.to_owned());
        segments.extend(self.segments.iter().cloned());
        Self {
            segments: segments.into(),
        }
    }
}

impl FromStr for AttributePath {
    type Err = InvalidPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for AttributePath {
    type Error = InvalidPathError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl fmt::Debug for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttributePath({self})")
    }
}
