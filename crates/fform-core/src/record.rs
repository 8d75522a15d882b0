#![forbid(unsafe_code)]

//! Mutable, schema-described records with change notification.
//!
//! A [`Record`] is a shared handle: clones refer to the same record, and
//! equality is identity. Records hold values for their value attributes and
//! other records for their reference attributes, which makes nested paths
//! such as `customer.address.city` resolvable and writable.
//!
//! # Invariants
//!
//! 1. A write is type-checked against the schema before anything is stored;
//!    a failed write leaves the record untouched.
//! 2. Writing a value equal to the current one is a no-op: nothing is
//!    notified.
//! 3. Every record a write passes through is notified, innermost first, with
//!    the path relative to that record. Notification completes before
//!    `write` returns.
//! 4. No internal borrow is held while subscribers run, so subscribers may
//!    read or write the record re-entrantly.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown path | Path not in schema | `InvalidPathError` |
//! | Unset reference on resolve | Intermediate reference is `None` | Resolves to `Value::Null` |
//! | Unset reference on write | Intermediate reference is `None` | `WriteError::MissingReference` |
//! | Wrong value type | Value type differs from declared type | `WriteError::TypeMismatch` |

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;

use crate::error::{InvalidPathError, WriteError};
use crate::path::AttributePath;
use crate::reactive::{Notifier, Subscription};
use crate::schema::Schema;
use crate::value::Value;

/// Global counter for record identities.
static RECORD_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity of a record, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(u64);

impl RecordId {
    fn next() -> Self {
        Self(RECORD_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A value attribute changed.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeChange {
    /// Path relative to the record that emitted the event.
    pub path: AttributePath,
    pub previous: Value,
    pub value: Value,
}

/// Event emitted by a record.
#[derive(Debug, Clone)]
pub enum RecordEvent {
    Attribute(AttributeChange),
    /// A reference attribute now points at a different record (or none).
    Reference {
        /// Path relative to the record that emitted the event.
        path: AttributePath,
        previous: Option<Record>,
        current: Option<Record>,
    },
}

struct RecordInner {
    id: RecordId,
    schema: Arc<Schema>,
    values: RefCell<AHashMap<String, Value>>,
    references: RefCell<AHashMap<String, Record>>,
    events: Notifier<RecordEvent>,
}

/// Shared handle to a mutable record.
#[derive(Clone)]
pub struct Record {
    inner: Rc<RecordInner>,
}

impl Record {
    /// Create an empty record: every value is `Null`, every reference unset.
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            inner: Rc::new(RecordInner {
                id: RecordId::next(),
                schema,
                values: RefCell::new(AHashMap::new()),
                references: RefCell::new(AHashMap::new()),
                events: Notifier::new(),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> RecordId {
        self.inner.id
    }

    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.inner.schema
    }

    /// Resolve the value at `path`.
    ///
    /// An unset intermediate reference resolves to `Value::Null`.
    pub fn resolve(&self, path: &AttributePath) -> Result<Value, InvalidPathError> {
        self.inner.schema.describe(path)?;
        Ok(self.resolve_unchecked(path))
    }

    /// Resolve a path already validated against this record's schema.
    fn resolve_unchecked(&self, path: &AttributePath) -> Value {
        let segments = path.segments();
        let (terminal, parents) = match segments.split_last() {
            Some(split) => split,
            None => return Value::Null,
        };
        let mut owner = self.clone();
        for segment in parents {
            match owner.local_reference(segment) {
                Some(next) => owner = next,
                None => return Value::Null,
            }
        }
        owner
            .inner
            .values
            .borrow()
            .get(terminal.as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Convenience for `resolve` with a dotted path string.
    pub fn get(&self, path: &str) -> Result<Value, InvalidPathError> {
        self.resolve(&AttributePath::parse(path)?)
    }

    /// Store `value` at `path` and notify subscribers.
    pub fn write(&self, path: &AttributePath, value: Value) -> Result<(), WriteError> {
        let descriptor = self.inner.schema.describe(path)?;
        if let Some(actual) = value.value_type() {
            if actual != descriptor.value_type() {
                return Err(WriteError::TypeMismatch {
                    path: path.to_string(),
                    expected: descriptor.value_type(),
                    actual,
                });
            }
        }

        let chain = self.owner_chain(path)?;
        let Some(owner) = chain.last() else {
            return Ok(());
        };
        let previous = {
            let mut values = owner.inner.values.borrow_mut();
            let slot = values.entry(path.terminal().to_owned()).or_default();
            if *slot == value {
                return Ok(());
            }
            std::mem::replace(slot, value.clone())
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(record = %self.id(), %path, %previous, %value, "attribute written");

        for (depth, record) in chain.iter().enumerate().rev() {
            let relative = relative_path(path, depth);
            record
                .inner
                .events
                .notify(&RecordEvent::Attribute(AttributeChange {
                    path: relative,
                    previous: previous.clone(),
                    value: value.clone(),
                }));
        }
        Ok(())
    }

    /// Convenience for `write` with a dotted path string.
    pub fn set(&self, path: &str, value: impl Into<Value>) -> Result<(), WriteError> {
        self.write(&AttributePath::parse(path)?, value.into())
    }

    /// The record referenced at `path`, if set.
    pub fn reference(&self, path: &AttributePath) -> Result<Option<Record>, InvalidPathError> {
        self.inner.schema.describe_reference(path)?;
        let Ok(chain) = self.owner_chain(path) else {
            return Ok(None);
        };
        Ok(chain
            .last()
            .and_then(|owner| owner.local_reference(path.terminal())))
    }

    /// Point the reference at `path` to `target` (or clear it).
    pub fn set_reference(
        &self,
        path: &AttributePath,
        target: Option<Record>,
    ) -> Result<(), WriteError> {
        let expected = self.inner.schema.describe_reference(path)?;
        if let Some(target) = &target {
            if target.schema().name() != expected.name() {
                return Err(WriteError::SchemaMismatch {
                    expected: expected.name().to_owned(),
                    actual: target.schema().name().to_owned(),
                });
            }
        }

        let chain = self.owner_chain(path)?;
        let Some(owner) = chain.last() else {
            return Ok(());
        };
        let previous = {
            let mut references = owner.inner.references.borrow_mut();
            let key = path.terminal();
            let unchanged = match (references.get(key), &target) {
                (Some(current), Some(next)) => current == next,
                (None, None) => true,
                _ => false,
            };
            if unchanged {
                return Ok(());
            }
            match &target {
                Some(next) => references.insert(key.to_owned(), next.clone()),
                None => references.remove(key),
            }
        };

        for (depth, record) in chain.iter().enumerate().rev() {
            record.inner.events.notify(&RecordEvent::Reference {
                path: relative_path(path, depth),
                previous: previous.clone(),
                current: target.clone(),
            });
        }
        Ok(())
    }

    /// Subscribe to every event this record emits.
    pub fn subscribe(&self, callback: impl Fn(&RecordEvent) + 'static) -> Subscription {
        self.inner.events.subscribe(callback)
    }

    /// Subscribe to changes of the value at `path`.
    ///
    /// The callback receives `(previous, new)`. It fires for writes to the
    /// path itself and for reference swaps along the path that change the
    /// resolved value.
    pub fn on_change(
        &self,
        path: AttributePath,
        callback: impl Fn(&Value, &Value) + 'static,
    ) -> Subscription {
        self.subscribe(move |event| match event {
            RecordEvent::Attribute(change) => {
                if change.path == path {
                    callback(&change.previous, &change.value);
                }
            }
            RecordEvent::Reference {
                path: reference,
                previous,
                current,
            } => {
                let Some(rest) = reference.strip_from(&path) else {
                    return;
                };
                let before = previous
                    .as_ref()
                    .map_or(Value::Null, |r| r.resolve_unchecked(&rest));
                let after = current
                    .as_ref()
                    .map_or(Value::Null, |r| r.resolve_unchecked(&rest));
                if before != after {
                    callback(&before, &after);
                }
            }
        })
    }

    /// Number of live subscribers on this record.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.events.subscriber_count()
    }

    fn local_reference(&self, name: &str) -> Option<Record> {
        self.inner.references.borrow().get(name).cloned()
    }

    /// Records from `self` down to the owner of `path`'s terminal attribute.
    fn owner_chain(&self, path: &AttributePath) -> Result<Vec<Record>, WriteError> {
        let segments = path.segments();
        let mut chain = Vec::with_capacity(segments.len());
        chain.push(self.clone());
        for segment in &segments[..segments.len() - 1] {
            let next = chain
                .last()
                .and_then(|owner| owner.local_reference(segment))
                .ok_or_else(|| WriteError::MissingReference {
                    path: path.to_string(),
                    segment: segment.clone(),
                })?;
            chain.push(next);
        }
        Ok(chain)
    }
}

/// `path` with its first `depth` segments removed.
fn relative_path(path: &AttributePath, depth: usize) -> AttributePath {
    let mut relative = path.clone();
    for _ in 0..depth {
        match relative.tail() {
            Some(tail) => relative = tail,
            None => break,
        }
    }
    relative
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Record {}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.inner.id)
            .field("schema", &self.inner.schema.name())
            .finish()
    }
}
