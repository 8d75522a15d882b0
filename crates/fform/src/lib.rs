#![forbid(unsafe_code)]

//! FrankenForms public facade.
//!
//! Re-exports the core data model, the binding runtime, and (with the
//! default `widgets` feature) the stock controls. Most applications only
//! need the [`prelude`].
//!
//! ```ignore
//! use fform::prelude::*;
//!
//! let binding = FieldBinding::new(DateField::new(), &BindingConfig::default());
//! binding.bind(&meeting, &AttributePath::parse("starts_at")?)?;
//! ```

pub use fform_core as model;
pub use fform_runtime as runtime;
#[cfg(feature = "widgets")]
pub use fform_widgets as widgets;

pub mod prelude {
    pub use fform_core::{
        AttributeDescriptor, AttributePath, Control, Datasource, DatasourceState, Record,
        Resolution, Schema, Subscription, Value, ValueType,
    };
    pub use fform_runtime::{
        BindingConfig, DateRangeValidator, FieldBinding, FixedLocale, LocaleContext,
        LocaleProvider, SyncDirection, ValidationError, ValidationOutcome, Validator, ValueChange,
    };
    #[cfg(feature = "widgets")]
    pub use fform_widgets::{DateField, TextField, TimeField};
}
