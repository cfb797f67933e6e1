//! Single-occupancy holders for cancellable resources
//!
//! - [`SerialSlot`]: replaceable; each replacement disposes the previous
//!   occupant. Used for "the currently scheduled timer".
//! - [`SingleAssignmentSlot`]: assigned exactly once, possibly after it
//!   was already disposed. Used for upstream subscriptions that may finish
//!   before `subscribe` even returns.
//!
//! Occupants are always disposed after the slot's own lock is released, so
//! an occupant whose teardown re-enters the slot cannot deadlock.

use crate::disposable::{BoxDisposable, Disposable};
use parking_lot::Mutex;
use tracing::warn;

struct SerialState {
    current: Option<BoxDisposable>,
    closed: bool,
}

/// Holds at most one active handle; replacing it disposes the old one
pub struct SerialSlot {
    state: Mutex<SerialState>,
}

impl SerialSlot {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SerialState {
                current: None,
                closed: false,
            }),
        }
    }

    /// Store `next`, disposing the previous occupant
    ///
    /// Once the slot is closed nothing is stored any more: `next` is
    /// disposed on the spot so a late registration cannot outlive the slot.
    pub fn replace(&self, next: BoxDisposable) {
        let evicted = {
            let mut state = self.state.lock();
            if state.closed {
                drop(state);
                next.dispose();
                return;
            }
            state.current.replace(next)
        };

        if let Some(previous) = evicted {
            previous.dispose();
        }
    }

    /// Dispose the occupant and close the slot
    pub fn dispose_all(&self) {
        let evicted = {
            let mut state = self.state.lock();
            state.closed = true;
            state.current.take()
        };

        if let Some(previous) = evicted {
            previous.dispose();
        }
    }
}

impl Default for SerialSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl Disposable for SerialSlot {
    fn dispose(&self) {
        self.dispose_all();
    }

    fn is_disposed(&self) -> bool {
        self.state.lock().closed
    }
}

enum Assignment {
    Empty,
    Assigned(BoxDisposable),
    /// Disposed, with or without an occupant having been assigned
    Disposed { assigned: bool },
}

/// Accepts exactly one handle
pub struct SingleAssignmentSlot {
    state: Mutex<Assignment>,
}

impl SingleAssignmentSlot {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Assignment::Empty),
        }
    }

    /// Store the handle. If the slot was disposed first, the handle is
    /// disposed immediately. A second assignment is ignored and disposed.
    pub fn set(&self, handle: BoxDisposable) {
        let duplicate = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, Assignment::Empty) {
                Assignment::Empty => {
                    *state = Assignment::Assigned(handle);
                    return;
                }
                Assignment::Disposed { assigned: false } => {
                    *state = Assignment::Disposed { assigned: true };
                    false
                }
                other => {
                    *state = other;
                    true
                }
            }
        };

        if duplicate {
            warn!("SingleAssignmentSlot assigned twice; disposing extra handle");
        }
        handle.dispose();
    }
}

impl Default for SingleAssignmentSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl Disposable for SingleAssignmentSlot {
    fn dispose(&self) {
        let previous = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, Assignment::Disposed { assigned: false }) {
                Assignment::Empty => None,
                Assignment::Assigned(handle) => {
                    *state = Assignment::Disposed { assigned: true };
                    Some(handle)
                }
                already @ Assignment::Disposed { .. } => {
                    *state = already;
                    None
                }
            }
        };

        if let Some(handle) = previous {
            handle.dispose();
        }
    }

    fn is_disposed(&self) -> bool {
        matches!(*self.state.lock(), Assignment::Disposed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disposable::AnonymousDisposable;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn tracked(counter: &Arc<AtomicUsize>) -> BoxDisposable {
        let counter = counter.clone();
        Box::new(AnonymousDisposable::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
    }

    #[test]
    fn test_replace_disposes_previous() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let slot = SerialSlot::new();

        slot.replace(tracked(&first));
        assert_eq!(first.load(Ordering::SeqCst), 0);

        slot.replace(tracked(&second));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
        assert!(!slot.is_disposed());
    }

    #[test]
    fn test_dispose_all_closes_slot() {
        let occupant = Arc::new(AtomicUsize::new(0));
        let late = Arc::new(AtomicUsize::new(0));
        let slot = SerialSlot::new();

        slot.replace(tracked(&occupant));
        slot.dispose_all();
        assert_eq!(occupant.load(Ordering::SeqCst), 1);
        assert!(slot.is_disposed());

        // Late registrations are never stored
        slot.replace(tracked(&late));
        assert_eq!(late.load(Ordering::SeqCst), 1);

        slot.dispose_all();
        assert_eq!(occupant.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_replace_leaves_one_live() {
        let count = Arc::new(AtomicUsize::new(0));
        let slot = SerialSlot::new();

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..250 {
                        slot.replace(tracked(&count));
                    }
                });
            }
        });

        // 1000 registrations, all but the last evicted
        assert_eq!(count.load(Ordering::SeqCst), 999);
        slot.dispose_all();
        assert_eq!(count.load(Ordering::SeqCst), 1000);
    }

    #[test]
    fn test_single_assignment_dispose_before_set() {
        let count = Arc::new(AtomicUsize::new(0));
        let slot = SingleAssignmentSlot::new();

        slot.dispose();
        assert!(slot.is_disposed());

        slot.set(tracked(&count));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_single_assignment_set_then_dispose() {
        let count = Arc::new(AtomicUsize::new(0));
        let slot = SingleAssignmentSlot::new();

        slot.set(tracked(&count));
        assert!(!slot.is_disposed());

        slot.dispose();
        slot.dispose();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_single_assignment_rejects_second_handle() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let slot = SingleAssignmentSlot::new();

        slot.set(tracked(&first));
        slot.set(tracked(&second));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }
}
