#![forbid(unsafe_code)]

//! Core data model for FrankenForms.
//!
//! This crate holds everything a field binding talks to on the record side:
//!
//! - [`Value`] / [`ValueType`]: the dynamically typed attribute values.
//! - [`AttributePath`]: dotted addresses into a record (`customer.city`).
//! - [`Schema`] / [`AttributeDescriptor`]: the metadata a path resolves against.
//! - [`Record`] and [`Datasource`]: mutable, shared records with path-scoped
//!   change notification.
//! - [`Datatype`] / [`Coercion`]: text round-trip conversion between a
//!   control's native type and an attribute's declared type.
//! - [`Control`]: the contract a UI control exposes to a binding.
//! - [`temporal`]: resolution granularity and date + time composition.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`) by construction.

pub mod control;
pub mod datasource;
pub mod datatype;
pub mod designer;
pub mod error;
pub mod path;
pub mod reactive;
pub mod record;
pub mod schema;
pub mod temporal;
pub mod value;

pub use control::Control;
pub use datasource::{Datasource, DatasourceEvent, DatasourceState};
pub use datatype::{Coercion, Datatype, Datatypes};
pub use designer::{DesignerMetadata, ElementsGroup};
pub use error::{CoercionError, InvalidPathError, WriteError};
pub use path::AttributePath;
pub use reactive::{Notifier, Observable, Subscription};
pub use record::{AttributeChange, Record, RecordEvent, RecordId};
pub use schema::{AttributeDescriptor, Schema, SchemaBuilder};
pub use temporal::Resolution;
pub use value::{Value, ValueType};
