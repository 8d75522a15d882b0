#![forbid(unsafe_code)]

//! Change-notification primitives.
//!
//! - [`Notifier<E>`]: an ordered fan-out of `Fn(&E)` callbacks.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`Observable<T>`]: a version-tracked value built on a notifier.
//!
//! # Architecture
//!
//! Subscribers are stored as `Weak` pointers; the strong pointer lives in the
//! [`Subscription`]. Dead entries are pruned lazily during notification.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 3. The subscriber list is not borrowed while callbacks run, so a callback
//!    may subscribe, unsubscribe, or notify re-entrantly.
//! 4. `Observable::set` with an equal value is a no-op (no version bump, no
//!    notifications).

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<E> = Box<dyn Fn(&E)>;

/// Ordered list of weakly held callbacks.
pub struct Notifier<E> {
    subscribers: Rc<RefCell<Vec<Weak<Callback<E>>>>>,
}

impl<E> Clone for Notifier<E> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Rc::clone(&self.subscribers),
        }
    }
}

impl<E: 'static> Notifier<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Register `callback`. It stays registered while the returned
    /// [`Subscription`] is alive.
    pub fn subscribe(&self, callback: impl Fn(&E) + 'static) -> Subscription {
        let strong: Rc<Callback<E>> = Rc::new(Box::new(callback));
        self.subscribers.borrow_mut().push(Rc::downgrade(&strong));
        Subscription { _callback: strong }
    }

    /// Invoke every live subscriber with `event`.
    pub fn notify(&self, event: &E) {
        let live: Vec<Rc<Callback<E>>> = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in live {
            callback(event);
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

impl<E: 'static> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

/// Keeps a callback registered. Drop to unsubscribe.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _callback: Rc<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

struct ObservableInner<T> {
    value: RefCell<T>,
    version: Cell<u64>,
    changes: Notifier<T>,
}

/// Shared, version-tracked value with change notification.
///
/// Clones share the same underlying value.
pub struct Observable<T> {
    inner: Rc<ObservableInner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(ObservableInner {
                value: RefCell::new(value),
                version: Cell::new(0),
                changes: Notifier::new(),
            }),
        }
    }

    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrow the value for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value, notifying subscribers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return;
            }
            *current = value.clone();
        }
        self.inner.version.set(self.inner.version.get() + 1);
        self.inner.changes.notify(&value);
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.inner.changes.subscribe(callback)
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.inner.value.borrow())
            .field("version", &self.inner.version.get())
            .finish()
    }
}
