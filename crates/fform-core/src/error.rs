#![forbid(unsafe_code)]

//! Error types shared by records, schemas, and datatypes.
//!
//! Structural errors ([`InvalidPathError`]) are meant to propagate to whoever
//! set up a binding. Value-level errors ([`CoercionError`], [`WriteError`])
//! are recoverable and usually end up captured as binding state.

use crate::value::ValueType;

/// An attribute path that does not resolve against a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPathError {
    #[error("attribute path is empty")]
    Empty,
    #[error("attribute path `{path}` contains an empty segment")]
    EmptySegment { path: String },
    #[error("`{schema}` has no attribute `{segment}` (while resolving `{path}`)")]
    UnknownAttribute {
        schema: String,
        path: String,
        segment: String,
    },
    #[error("attribute `{segment}` of `{path}` is not a reference and cannot be traversed")]
    NotAReference { path: String, segment: String },
    #[error("attribute path `{path}` ends at a reference, not a value")]
    NotAValue { path: String },
}

/// A value that cannot be converted to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot convert `{text}` to {target}: {reason}")]
pub struct CoercionError {
    /// The canonical text that failed to parse.
    pub text: String,
    /// The type the text was being parsed into.
    pub target: ValueType,
    /// Parser diagnostic.
    pub reason: String,
}

impl CoercionError {
    #[must_use]
    pub fn new(text: impl Into<String>, target: ValueType, reason: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target,
            reason: reason.into(),
        }
    }
}

/// Failure to store a value into a record.
///
/// A failed write never mutates the record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    #[error(transparent)]
    Path(#[from] InvalidPathError),
    #[error("attribute `{path}` expects {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: ValueType,
        actual: ValueType,
    },
    #[error("reference `{segment}` is not set (while writing `{path}`)")]
    MissingReference { path: String, segment: String },
    #[error("a `{actual}` record cannot be used where `{expected}` is expected")]
    SchemaMismatch { expected: String, actual: String },
    #[error(transparent)]
    Coercion(#[from] CoercionError),
}
