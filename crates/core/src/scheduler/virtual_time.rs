//! Deterministic scheduler with a manually advanced clock
//!
//! Nothing runs until the clock is advanced. Actions due at the same
//! instant run in the order they were scheduled. Actions always run with
//! the scheduler's lock released, so they are free to schedule or cancel
//! further work.

use super::{Action, Scheduler};
use crate::disposable::{BoxDisposable, Disposable};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::trace;

/// Ordering key: due time, then scheduling sequence
type Key = (Duration, u64);

struct Clock {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<Key, Action>,
    /// When set, disposing a handle does not remove its action
    lossy_cancellation: bool,
}

/// Manual-clock scheduler for tests and simulations
#[derive(Clone)]
pub struct VirtualTimeScheduler {
    clock: Arc<Mutex<Clock>>,
}

impl VirtualTimeScheduler {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(Mutex::new(Clock {
                now: Duration::ZERO,
                next_seq: 0,
                queue: BTreeMap::new(),
                lossy_cancellation: false,
            })),
        }
    }

    /// Make cancellation lose every race: disposed actions still run
    ///
    /// Models a scheduler whose cancellation cannot stop a callback that
    /// is already in flight.
    pub fn set_lossy_cancellation(&self, lossy: bool) {
        self.clock.lock().lossy_cancellation = lossy;
    }

    /// Number of actions waiting to run
    pub fn pending_count(&self) -> usize {
        self.clock.lock().queue.len()
    }

    /// Advance the clock by `delta`, running everything that becomes due
    ///
    /// Returns the number of actions executed.
    pub fn advance_by(&self, delta: Duration) -> usize {
        let target = self.clock.lock().now + delta;
        self.advance_to(target)
    }

    /// Advance the clock to `target`, running everything due at or before it
    ///
    /// Moving backwards is a no-op. Returns the number of actions executed.
    pub fn advance_to(&self, target: Duration) -> usize {
        let mut executed = 0;

        while let Some(action) = self.pop_due(Some(target)) {
            action();
            executed += 1;
        }

        let mut clock = self.clock.lock();
        if clock.now < target {
            clock.now = target;
        }
        executed
    }

    /// Run every queued action, moving the clock to each due time in turn
    pub fn run_until_idle(&self) -> usize {
        let mut executed = 0;
        while let Some(action) = self.pop_due(None) {
            action();
            executed += 1;
        }
        executed
    }

    /// Remove the earliest action due at or before `limit`, moving the
    /// clock to its due time
    fn pop_due(&self, limit: Option<Duration>) -> Option<Action> {
        let mut clock = self.clock.lock();
        let (&key, _) = clock.queue.first_key_value()?;
        if limit.is_some_and(|limit| key.0 > limit) {
            return None;
        }

        let action = clock.queue.remove(&key)?;
        if clock.now < key.0 {
            clock.now = key.0;
        }
        trace!("Virtual clock running action #{} at {:?}", key.1, clock.now);
        Some(action)
    }
}

impl Default for VirtualTimeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for VirtualTimeScheduler {
    fn now(&self) -> Duration {
        self.clock.lock().now
    }

    fn schedule_relative(&self, delay: Duration, action: Action) -> BoxDisposable {
        let mut clock = self.clock.lock();
        let key = (clock.now + delay, clock.next_seq);
        clock.next_seq += 1;
        clock.queue.insert(key, action);

        Box::new(VirtualHandle {
            clock: Arc::downgrade(&self.clock),
            key,
            disposed: AtomicBool::new(false),
        })
    }
}

struct VirtualHandle {
    clock: Weak<Mutex<Clock>>,
    key: Key,
    disposed: AtomicBool,
}

impl Disposable for VirtualHandle {
    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let Some(clock) = self.clock.upgrade() else {
            return;
        };

        let removed = {
            let mut clock = clock.lock();
            if clock.lossy_cancellation {
                None
            } else {
                clock.queue.remove(&self.key)
            }
        };
        // Dropped outside the lock: captured state may own other handles
        drop(removed);
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}
