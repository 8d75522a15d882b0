#![forbid(unsafe_code)]

//! Field bindings for FrankenForms.
//!
//! A [`FieldBinding`] keeps one [`Control`](fform_core::Control) and one
//! record attribute in sync in both directions, guarded against feedback
//! loops, with type coercion and an ordered validator chain.
//!
//! Configuration ([`BindingConfig`]) and locale ([`LocaleProvider`]) are
//! passed in explicitly; nothing here reads process-wide state.

pub mod binding;
pub mod config;
pub mod guard;
pub mod locale;
pub mod validation;

pub use binding::{
    DEFAULT_REQUIRED_MESSAGE, FieldBinding, ListenerId, SyncDirection, ValueChange,
    WeakFieldBinding,
};
pub use config::BindingConfig;
#[cfg(feature = "policy-config")]
pub use config::ConfigError;
pub use guard::{SyncGuard, SyncState, SyncToken};
pub use locale::{
    DateFormats, FixedLocale, Locale, LocaleContext, LocaleOverride, LocaleProvider,
    detect_system_locale,
};
pub use validation::{
    DateRangeValidator, ValidationError, ValidationOutcome, Validator, ValidatorId,
};
