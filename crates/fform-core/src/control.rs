#![forbid(unsafe_code)]

//! The contract a UI control exposes to a field binding.

use crate::value::{Value, ValueType};

/// An editable UI control holding one value.
///
/// A control is passive: it never reaches into records itself. The binding
/// reads [`Control::value`] after an edit and pushes record changes back
/// through [`Control::set_value`].
pub trait Control {
    /// The type of value the control produces and accepts.
    fn native_type(&self) -> ValueType;

    /// Current value. Composite controls assemble it from their parts.
    fn value(&self) -> Value;

    /// Replace the current value.
    ///
    /// Implementations ignore the call while the control is not editable;
    /// callers that must update a read-only control toggle editability
    /// around the call.
    fn set_value(&mut self, value: Value);

    fn is_editable(&self) -> bool;

    fn set_editable(&mut self, editable: bool);

    fn is_visible(&self) -> bool {
        true
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

impl<C: Control + ?Sized> Control for Box<C> {
    fn native_type(&self) -> ValueType {
        (**self).native_type()
    }

    fn value(&self) -> Value {
        (**self).value()
    }

    fn set_value(&mut self, value: Value) {
        (**self).set_value(value);
    }

    fn is_editable(&self) -> bool {
        (**self).is_editable()
    }

    fn set_editable(&mut self, editable: bool) {
        (**self).set_editable(editable);
    }

    fn is_visible(&self) -> bool {
        (**self).is_visible()
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}
