#![forbid(unsafe_code)]

//! Controls for FrankenForms.
//!
//! Each control implements [`fform_core::Control`] and can be wrapped in a
//! [`fform_runtime::FieldBinding`].

pub mod date_field;
pub mod pattern;
pub mod text_field;
pub mod time_field;

pub use date_field::DateField;
pub use pattern::PatternError;
pub use text_field::TextField;
pub use time_field::TimeField;
