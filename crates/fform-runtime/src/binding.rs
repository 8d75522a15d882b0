#![forbid(unsafe_code)]

//! Bidirectional binding between a control and a record attribute.
//!
//! A [`FieldBinding<C>`] owns a [`Control`] and keeps its value in sync with
//! one attribute of a [`Record`] (or of the current item of a
//! [`Datasource`]).
//!
//! # Usage
//!
//! ```ignore
//! let binding = FieldBinding::new(DateField::new(), &BindingConfig::default());
//! binding.bind(&order, &AttributePath::parse("placed_at")?)?;
//!
//! // User edits flow into the record...
//! binding.edit(|field| field.set_time(Some(time)));
//! // ...and record changes flow into the control.
//! order.set("placed_at", other_value)?;
//! ```
//!
//! # State machine
//!
//! ```text
//!        edit / record change
//!   Idle ───────────────────────▶ SyncInFlight
//!    ▲                                 │
//!    └──── write + notify complete ────┘
//!          (success or failure)
//! ```
//!
//! Triggers arriving while a cycle is in flight are dropped, not queued. This
//! is what breaks the UI → record → UI feedback loop; it also means an
//! external change made from inside a listener during a cycle is lost.
//!
//! # Invariants
//!
//! 1. At most one synchronization direction is active at any instant.
//! 2. After a completed cycle the control value and the resolved record
//!    value agree, unless the cycle failed; then the record keeps its prior
//!    value and the outcome is invalid.
//! 3. Listeners run synchronously, in registration order, exactly once per
//!    completed change, and never for failed changes.
//! 4. The attribute's mandatory flag is read once at bind time.
//! 5. Coercion between native and declared types is resolved once at bind
//!    time.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `InvalidPathError` | Path not in schema | Returned from `bind`; prior binding kept |
//! | Coercion failure on edit | Declared datatype rejects text | Record unchanged, outcome invalid, input kept |
//! | Write failure on edit | Unset intermediate reference | Record unchanged, outcome invalid, input kept |
//! | Coercion failure on pull | Stored value not convertible | Control unchanged, outcome invalid |
//! | Path missing on new item | Datasource item of a differently shaped schema | Control unchanged, outcome invalid, `warn!` |

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use fform_core::{
    AttributeDescriptor, AttributePath, Coercion, Control, Datasource, DatasourceEvent,
    DatasourceState, Datatypes, InvalidPathError, Record, Subscription, Value, WriteError,
};
use tracing::{debug, trace, warn};

use crate::config::BindingConfig;
use crate::guard::{SyncGuard, SyncState};
use crate::validation::{ValidationError, ValidationOutcome, Validator, ValidatorId};

/// Message used for missing required values when none is configured.
pub const DEFAULT_REQUIRED_MESSAGE: &str = "value is required";

/// Global counter for listener handles.
static LISTENER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Handle returned by `add_value_listener`, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        Self(LISTENER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Which way a completed change flowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    UiToRecord,
    RecordToUi,
}

/// A completed value change, in the control's native type.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChange {
    pub previous: Value,
    pub value: Value,
    pub direction: SyncDirection,
}

type Listener = Rc<dyn Fn(&ValueChange)>;

enum Source {
    Record(Record),
    Datasource(Datasource),
}

impl Source {
    fn current_record(&self) -> Option<Record> {
        match self {
            Self::Record(record) => Some(record.clone()),
            Self::Datasource(ds) => ds.item(),
        }
    }
}

struct Target {
    source: Source,
    path: AttributePath,
    descriptor: AttributeDescriptor,
    coercion: Coercion,
    /// Record subscription, or datasource subscription for datasource targets.
    _subscription: Subscription,
    /// Subscription to the datasource's current item.
    item_subscription: Option<Subscription>,
}

struct BindingState {
    target: Option<Target>,
    outcome: ValidationOutcome,
    /// Last value that completed a cycle; reported as `previous` to listeners.
    committed: Value,
    required: bool,
    required_message: Option<String>,
}

struct Shared<C> {
    guard: SyncGuard,
    control: RefCell<C>,
    state: RefCell<BindingState>,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    validators: RefCell<Vec<(ValidatorId, Rc<dyn Validator>)>>,
    datatypes: Datatypes,
}

/// Shared handle to a control bound to a record attribute.
///
/// Clones refer to the same binding. The record subscription is released
/// on `unbind`, on rebinding, or when the last handle is dropped.
pub struct FieldBinding<C> {
    shared: Rc<Shared<C>>,
}

impl<C> Clone for FieldBinding<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

/// Non-owning handle to a [`FieldBinding`], for use inside listeners.
pub struct WeakFieldBinding<C> {
    shared: Weak<Shared<C>>,
}

impl<C> Clone for WeakFieldBinding<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<C> WeakFieldBinding<C> {
    #[must_use]
    pub fn upgrade(&self) -> Option<FieldBinding<C>> {
        self.shared.upgrade().map(|shared| FieldBinding { shared })
    }
}

impl<C: Control + 'static> FieldBinding<C> {
    /// Wrap `control` in an unbound binding.
    #[must_use]
    pub fn new(control: C, config: &BindingConfig) -> Self {
        Self::with_datatypes(control, config, Datatypes::standard())
    }

    /// Like [`FieldBinding::new`], with a custom datatype registry for coercion.
    #[must_use]
    pub fn with_datatypes(control: C, config: &BindingConfig, datatypes: Datatypes) -> Self {
        let committed = control.value();
        Self {
            shared: Rc::new(Shared {
                guard: SyncGuard::new(),
                control: RefCell::new(control),
                state: RefCell::new(BindingState {
                    target: None,
                    outcome: ValidationOutcome::Valid,
                    committed,
                    required: false,
                    required_message: config.required_message.clone(),
                }),
                listeners: RefCell::new(Vec::new()),
                validators: RefCell::new(Vec::new()),
                datatypes,
            }),
        }
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakFieldBinding<C> {
        WeakFieldBinding {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Bind to `path` of `record`, replacing any existing binding, and pull
    /// the current attribute value into the control.
    ///
    /// On error the existing binding is left untouched.
    pub fn bind(&self, record: &Record, path: &AttributePath) -> Result<(), InvalidPathError> {
        let _span = tracing::debug_span!("field_bind", record = %record.id(), %path).entered();

        let descriptor = record.schema().describe(path)?;
        let current = record.resolve(path)?;
        let subscription = Shared::watch_record(&self.shared, record, path);
        self.shared.attach(Target {
            source: Source::Record(record.clone()),
            path: path.clone(),
            coercion: self.shared.resolve_coercion(&descriptor),
            descriptor,
            _subscription: subscription,
            item_subscription: None,
        });
        self.shared.push_from_record(None, current);
        Ok(())
    }

    /// Bind to `path` of whatever item `datasource` currently holds.
    ///
    /// The binding follows item swaps. The current value is pulled only if
    /// the datasource is valid and has an item.
    pub fn bind_datasource(
        &self,
        datasource: &Datasource,
        path: &AttributePath,
    ) -> Result<(), InvalidPathError> {
        let _span = tracing::debug_span!(
            "field_bind",
            datasource = datasource.schema().name(),
            %path
        )
        .entered();

        let descriptor = datasource.schema().describe(path)?;
        let weak = Rc::downgrade(&self.shared);
        let watched = path.clone();
        let subscription = datasource.subscribe(move |event| {
            let DatasourceEvent::ItemChanged { current, .. } = event else {
                return;
            };
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let item_subscription = current
                .as_ref()
                .map(|record| Shared::watch_record(&shared, record, &watched));
            if let Some(target) = shared.state.borrow_mut().target.as_mut() {
                target.item_subscription = item_subscription;
            }
            match current.as_ref().map(|record| record.resolve(&watched)) {
                None => shared.push_from_record(None, Value::Null),
                Some(Ok(value)) => shared.push_from_record(None, value),
                Some(Err(err)) => {
                    warn!(%err, path = %watched, "new datasource item lacks bound attribute");
                    shared.state.borrow_mut().outcome = ValidationOutcome::invalid(&err);
                }
            }
        });

        let item = datasource.item();
        let initial = match &item {
            Some(record) if datasource.state() == DatasourceState::Valid => {
                Some(record.resolve(path)?)
            }
            _ => None,
        };
        let item_subscription = item
            .as_ref()
            .map(|record| Shared::watch_record(&self.shared, record, path));
        self.shared.attach(Target {
            source: Source::Datasource(datasource.clone()),
            path: path.clone(),
            coercion: self.shared.resolve_coercion(&descriptor),
            descriptor,
            _subscription: subscription,
            item_subscription,
        });

        if let Some(current) = initial {
            self.shared.push_from_record(None, current);
        }
        Ok(())
    }

    /// Detach from the record. The control keeps its value.
    pub fn unbind(&self) {
        if self.shared.state.borrow_mut().target.take().is_some() {
            debug!("field binding detached");
        }
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.shared.state.borrow().target.is_some()
    }

    /// The user entered `value`. Pushes it into the control and runs a
    /// UI → record cycle. No-op while a cycle is in flight.
    pub fn set_value_from_ui(&self, value: Value) {
        self.edit(|control| control.set_value(value));
    }

    /// Apply a user edit to the control (e.g. change only one sub-control)
    /// and run a UI → record cycle with the resulting value.
    ///
    /// Returns `None` without touching the control while a cycle is in flight.
    pub fn edit<R>(&self, f: impl FnOnce(&mut C) -> R) -> Option<R> {
        if self.shared.guard.is_in_flight() {
            trace!("ui edit dropped: sync in flight");
            return None;
        }
        let result = f(&mut self.shared.control.borrow_mut());
        self.shared.commit_from_ui();
        Some(result)
    }

    /// Record-side change notification. Ignored while a cycle is in flight.
    pub fn on_record_attribute_changed(&self, previous: Value, value: Value) {
        self.shared.push_from_record(Some(previous), value);
    }

    /// Check the current value: required gate first, then validators in
    /// registration order, stopping at the first failure.
    ///
    /// Skipped (returns `Ok`) when the control is hidden, read-only, or
    /// disabled. A failure also marks the binding invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let value = {
            let control = self.shared.control.borrow();
            if !control.is_visible() || !control.is_editable() || !control.is_enabled() {
                return Ok(());
            }
            control.value()
        };
        let result = self.shared.check(&value);
        if let Err(err) = &result {
            self.shared.state.borrow_mut().outcome = ValidationOutcome::invalid(err);
        }
        result
    }

    pub fn add_value_listener(&self, listener: impl Fn(&ValueChange) + 'static) -> ListenerId {
        let id = ListenerId::next();
        self.shared
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    /// Returns `false` if `id` was not registered.
    pub fn remove_value_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.shared.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn add_validator(&self, validator: impl Validator + 'static) -> ValidatorId {
        let id = ValidatorId::next();
        self.shared
            .validators
            .borrow_mut()
            .push((id, Rc::new(validator)));
        id
    }

    /// Returns `false` if `id` was not registered.
    pub fn remove_validator(&self, id: ValidatorId) -> bool {
        let mut validators = self.shared.validators.borrow_mut();
        let before = validators.len();
        validators.retain(|(existing, _)| *existing != id);
        validators.len() != before
    }

    /// The control's current value.
    #[must_use]
    pub fn value(&self) -> Value {
        self.shared.control.borrow().value()
    }

    /// Read access to the control.
    pub fn with_control<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(&self.shared.control.borrow())
    }

    pub fn set_editable(&self, editable: bool) {
        self.shared.control.borrow_mut().set_editable(editable);
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.shared.state.borrow().outcome.is_valid()
    }

    #[must_use]
    pub fn outcome(&self) -> ValidationOutcome {
        self.shared.state.borrow().outcome.clone()
    }

    #[must_use]
    pub fn sync_state(&self) -> SyncState {
        self.shared.guard.state()
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.shared.state.borrow().required
    }

    /// Override the required policy snapshotted at bind time.
    pub fn set_required(&self, required: bool) {
        self.shared.state.borrow_mut().required = required;
    }

    #[must_use]
    pub fn required_message(&self) -> Option<String> {
        self.shared.state.borrow().required_message.clone()
    }

    pub fn set_required_message(&self, message: impl Into<String>) {
        self.shared.state.borrow_mut().required_message = Some(message.into());
    }

    /// The record currently written to, if any.
    #[must_use]
    pub fn record(&self) -> Option<Record> {
        self.shared
            .state
            .borrow()
            .target
            .as_ref()
            .and_then(|t| t.source.current_record())
    }

    #[must_use]
    pub fn path(&self) -> Option<AttributePath> {
        self.shared
            .state
            .borrow()
            .target
            .as_ref()
            .map(|t| t.path.clone())
    }

    #[must_use]
    pub fn descriptor(&self) -> Option<AttributeDescriptor> {
        self.shared
            .state
            .borrow()
            .target
            .as_ref()
            .map(|t| t.descriptor.clone())
    }
}

impl<C: Control + 'static> Shared<C> {
    fn resolve_coercion(&self, descriptor: &AttributeDescriptor) -> Coercion {
        let native = self.control.borrow().native_type();
        Coercion::resolve(native, descriptor.value_type(), &self.datatypes)
    }

    fn attach(&self, target: Target) {
        let mut state = self.state.borrow_mut();
        state.required = target.descriptor.is_mandatory();
        // Replacing the target drops the previous subscriptions.
        state.target = Some(target);
    }

    /// Subscribe to `path` of `record`, forwarding to this binding while it lives.
    fn watch_record(this: &Rc<Self>, record: &Record, path: &AttributePath) -> Subscription {
        let weak = Rc::downgrade(this);
        record.on_change(path.clone(), move |previous, value| {
            if let Some(shared) = weak.upgrade() {
                shared.push_from_record(Some(previous.clone()), value.clone());
            }
        })
    }

    /// Record → UI cycle. `previous` defaults to the last committed value.
    fn push_from_record(&self, previous: Option<Value>, value: Value) {
        let Some(_token) = self.guard.try_enter() else {
            trace!(%value, "record change dropped: sync in flight");
            return;
        };

        let coercion = self
            .state
            .borrow()
            .target
            .as_ref()
            .map(|t| t.coercion.clone());
        let to_native = |v: Value| match &coercion {
            Some(c) => c.to_native(v),
            None => Ok(v),
        };
        let native = match to_native(value) {
            Ok(native) => native,
            Err(err) => {
                warn!(%err, "record value not representable in control");
                self.state.borrow_mut().outcome = ValidationOutcome::invalid(&err);
                return;
            }
        };
        let previous = match previous.map(to_native) {
            Some(Ok(previous)) => previous,
            _ => self.state.borrow().committed.clone(),
        };

        {
            let mut control = self.control.borrow_mut();
            let was_editable = control.is_editable();
            if !was_editable {
                control.set_editable(true);
            }
            control.set_value(native.clone());
            if !was_editable {
                control.set_editable(false);
            }
        }
        {
            let mut state = self.state.borrow_mut();
            state.committed = native.clone();
            state.outcome = ValidationOutcome::Valid;
        }

        debug!(%previous, value = %native, "record -> ui");
        self.notify(&ValueChange {
            previous,
            value: native,
            direction: SyncDirection::RecordToUi,
        });
    }

    /// UI → record cycle using the control's current value.
    fn commit_from_ui(&self) {
        let Some(_token) = self.guard.try_enter() else {
            trace!("ui edit dropped: sync in flight");
            return;
        };

        let value = self.control.borrow().value();
        let (previous, write) = {
            let state = self.state.borrow();
            let write = state.target.as_ref().and_then(|t| {
                t.source
                    .current_record()
                    .map(|record| (record, t.path.clone(), t.coercion.clone()))
            });
            (state.committed.clone(), write)
        };

        // No borrows are held here: the write notifies record subscribers,
        // including this binding, synchronously.
        let result = match write {
            None => Ok(()),
            Some((record, path, coercion)) => coercion
                .to_declared(value.clone())
                .map_err(WriteError::from)
                .and_then(|declared| record.write(&path, declared)),
        };

        match result {
            Ok(()) => {
                {
                    let mut state = self.state.borrow_mut();
                    state.committed = value.clone();
                    state.outcome = ValidationOutcome::Valid;
                }
                debug!(%previous, %value, "ui -> record");
                self.notify(&ValueChange {
                    previous,
                    value,
                    direction: SyncDirection::UiToRecord,
                });
            }
            Err(err) => {
                warn!(%err, %value, "ui edit rejected");
                self.state.borrow_mut().outcome = ValidationOutcome::invalid(&err);
            }
        }
    }

    fn check(&self, value: &Value) -> Result<(), ValidationError> {
        if value.is_absent() {
            let state = self.state.borrow();
            if state.required {
                return Err(ValidationError::RequiredValueMissing {
                    message: state
                        .required_message
                        .clone()
                        .unwrap_or_else(|| DEFAULT_REQUIRED_MESSAGE.to_owned()),
                });
            }
            return Ok(());
        }
        let validators: Vec<Rc<dyn Validator>> = self
            .validators
            .borrow()
            .iter()
            .map(|(_, v)| Rc::clone(v))
            .collect();
        for validator in validators {
            validator.validate(value)?;
        }
        Ok(())
    }

    fn notify(&self, change: &ValueChange) {
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener(change);
        }
    }
}

impl<C: Control + 'static> fmt::Debug for FieldBinding<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("FieldBinding")
            .field("path", &state.target.as_ref().map(|t| t.path.to_string()))
            .field("sync", &self.shared.guard.state())
            .field("outcome", &state.outcome)
            .field("required", &state.required)
            .field("listeners", &self.shared.listeners.borrow().len())
            .field("validators", &self.shared.validators.borrow().len())
            .finish()
    }
}
