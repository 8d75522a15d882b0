#![forbid(unsafe_code)]

//! Re-entrancy guard for synchronization cycles.
//!
//! The guard is a shared flag, not a lock: it is correct only because every
//! trigger runs to completion on one thread. `Rc<Cell<_>>` keeps the type
//! `!Send`, so the compiler rejects attempts to share it across threads.
//!
//! # Invariants
//!
//! 1. At most one [`SyncToken`] exists per guard at any instant.
//! 2. Dropping the token returns the guard to [`SyncState::Idle`], including
//!    during unwinding.
//! 3. `try_enter` while in flight returns `None`; the caller drops the
//!    trigger rather than queueing it.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// The two states of a synchronization cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    SyncInFlight,
}

/// Shared in-flight flag.
#[derive(Clone, Default)]
pub struct SyncGuard {
    in_flight: Rc<Cell<bool>>,
}

impl SyncGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> SyncState {
        if self.in_flight.get() {
            SyncState::SyncInFlight
        } else {
            SyncState::Idle
        }
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.get()
    }

    /// Enter a cycle, or `None` if one is already in flight.
    #[must_use]
    pub fn try_enter(&self) -> Option<SyncToken> {
        if self.in_flight.replace(true) {
            return None;
        }
        Some(SyncToken {
            flag: Rc::clone(&self.in_flight),
        })
    }
}

impl fmt::Debug for SyncGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncGuard")
            .field("state", &self.state())
            .finish()
    }
}

/// Proof of an in-flight cycle. Drop to return to idle.
#[must_use = "dropping the token ends the synchronization cycle"]
pub struct SyncToken {
    flag: Rc<Cell<bool>>,
}

impl Drop for SyncToken {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

impl fmt::Debug for SyncToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncToken").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_enter_is_refused() {
        let guard = SyncGuard::new();
        let token = guard.try_enter();
        assert!(token.is_some());
        assert_eq!(guard.state(), SyncState::SyncInFlight);
        assert!(guard.try_enter().is_none());
        drop(token);
        assert_eq!(guard.state(), SyncState::Idle);
        assert!(guard.try_enter().is_some());
    }

    #[test]
    fn clones_share_the_flag() {
        let a = SyncGuard::new();
        let b = a.clone();
        let _token = a.try_enter().unwrap();
        assert!(b.is_in_flight());
    }

    #[test]
    fn token_resets_on_panic() {
        let guard = SyncGuard::new();
        let g = guard.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _token = g.try_enter().unwrap();
            panic!("listener blew up");
        }));
        assert!(result.is_err());
        assert_eq!(guard.state(), SyncState::Idle);
    }
}
