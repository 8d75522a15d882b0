#![forbid(unsafe_code)]

//! Datasources: a swappable "current item" for one schema.
//!
//! Screens usually bind controls to a datasource rather than to a fixed
//! record, so that loading a different item re-targets every control at once.
//! The datasource forwards value changes of its current item and announces
//! item swaps.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::WriteError;
use crate::reactive::{Notifier, Subscription};
use crate::record::{AttributeChange, Record, RecordEvent};
use crate::schema::Schema;

/// Lifecycle state of a [`Datasource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatasourceState {
    /// Never loaded.
    #[default]
    NotInitialized,
    /// Loaded once, but the current content must not be trusted.
    Invalid,
    /// Holds a usable current item (possibly none).
    Valid,
}

/// Event emitted by a [`Datasource`].
#[derive(Debug, Clone)]
pub enum DatasourceEvent {
    ItemChanged {
        previous: Option<Record>,
        current: Option<Record>,
    },
    /// A value of the current item changed.
    ValueChanged(AttributeChange),
    StateChanged {
        previous: DatasourceState,
        current: DatasourceState,
    },
}

struct DatasourceInner {
    schema: Arc<Schema>,
    item: RefCell<Option<Record>>,
    item_subscription: RefCell<Option<Subscription>>,
    state: Cell<DatasourceState>,
    events: Notifier<DatasourceEvent>,
}

/// Shared handle to a datasource.
#[derive(Clone)]
pub struct Datasource {
    inner: Rc<DatasourceInner>,
}

impl Datasource {
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            inner: Rc::new(DatasourceInner {
                schema,
                item: RefCell::new(None),
                item_subscription: RefCell::new(None),
                state: Cell::new(DatasourceState::NotInitialized),
                events: Notifier::new(),
            }),
        }
    }

    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.inner.schema
    }

    #[must_use]
    pub fn item(&self) -> Option<Record> {
        self.inner.item.borrow().clone()
    }

    #[must_use]
    pub fn state(&self) -> DatasourceState {
        self.inner.state.get()
    }

    /// Replace the current item. The datasource becomes `Valid`.
    ///
    /// Fails when `item` belongs to a different schema.
    pub fn set_item(&self, item: Option<Record>) -> Result<(), WriteError> {
        if let Some(record) = &item {
            if record.schema().name() != self.inner.schema.name() {
                return Err(WriteError::SchemaMismatch {
                    expected: self.inner.schema.name().to_owned(),
                    actual: record.schema().name().to_owned(),
                });
            }
        }

        let subscription = item.as_ref().map(|record| {
            let events = self.inner.events.clone();
            record.subscribe(move |event| {
                if let RecordEvent::Attribute(change) = event {
                    events.notify(&DatasourceEvent::ValueChanged(change.clone()));
                }
            })
        });
        let previous = self.inner.item.replace(item.clone());
        *self.inner.item_subscription.borrow_mut() = subscription;
        self.set_state(DatasourceState::Valid);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            schema = self.inner.schema.name(),
            item = ?item.as_ref().map(Record::id),
            "datasource item changed"
        );

        if previous != item {
            self.inner.events.notify(&DatasourceEvent::ItemChanged {
                previous,
                current: item,
            });
        }
        Ok(())
    }

    /// Mark the content as untrustworthy (e.g. while reloading).
    pub fn invalidate(&self) {
        self.set_state(DatasourceState::Invalid);
    }

    fn set_state(&self, state: DatasourceState) {
        let previous = self.inner.state.replace(state);
        if previous != state {
            self.inner.events.notify(&DatasourceEvent::StateChanged {
                previous,
                current: state,
            });
        }
    }

    pub fn subscribe(&self, callback: impl Fn(&DatasourceEvent) + 'static) -> Subscription {
        self.inner.events.subscribe(callback)
    }
}

impl PartialEq for Datasource {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Datasource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Datasource")
            .field("schema", &self.inner.schema.name())
            .field("state", &self.inner.state.get())
            .field("item", &self.inner.item.borrow().as_ref().map(Record::id))
            .finish()
    }
}
