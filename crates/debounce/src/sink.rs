//! Debounce coordinator
//!
//! One `DebounceSink` exists per subscription. It sits between the
//! upstream source and the downstream observer and owns three pieces of
//! state, all behind one reentrant lock:
//!
//! - `generation`: bumped on every upstream value, never reset
//! - `pending`: the latest value not yet emitted
//! - `lifecycle`: `Active` until the first terminal event or disposal
//!
//! Each value schedules a timer that captures the generation current at
//! the time. When the timer fires it only emits if its captured generation
//! still matches. Timer cancellation is therefore allowed to lose races:
//! a stale firing finds a newer generation (or a terminal lifecycle) and
//! does nothing.
//!
//! Downstream is invoked with the lock held. The lock is reentrant and no
//! `RefCell` borrow is alive across a downstream call, so an observer may
//! call back into the sink (typically to dispose its subscription) from
//! inside its own callback.

use hush_core::{
    BoxDisposable, CompositeDisposable, Disposable, Event, Observer, ObserverRef, Scheduler,
    SchedulerExt, SerialSlot, SingleAssignmentSlot,
};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Active,
    Terminal,
}

struct SinkState<T> {
    generation: u64,
    pending: Option<T>,
    lifecycle: Lifecycle,
}

impl<T> SinkState<T> {
    /// Enter the terminal state, dropping any pending value
    ///
    /// Returns false if the state was already terminal.
    fn terminate(&mut self) -> bool {
        if self.lifecycle == Lifecycle::Terminal {
            return false;
        }
        self.lifecycle = Lifecycle::Terminal;
        self.pending = None;
        true
    }
}

/// Per-subscription debounce state machine
pub(crate) struct DebounceSink<T, E> {
    state: ReentrantMutex<RefCell<SinkState<T>>>,
    due_time: Duration,
    flush_on_complete: bool,
    scheduler: Arc<dyn Scheduler>,
    downstream: ObserverRef<T, E>,
    /// Most recently scheduled timer
    timer: Arc<SerialSlot>,
    /// Subscription to the upstream source
    upstream: Arc<SingleAssignmentSlot>,
    /// `timer` and `upstream`, released together on termination
    resources: CompositeDisposable,
    /// Handed to timer actions so a pending timer never keeps the sink alive
    this: Weak<Self>,
}

impl<T, E> DebounceSink<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn new(
        due_time: Duration,
        flush_on_complete: bool,
        scheduler: Arc<dyn Scheduler>,
        downstream: ObserverRef<T, E>,
    ) -> Arc<Self> {
        let timer = Arc::new(SerialSlot::new());
        let upstream = Arc::new(SingleAssignmentSlot::new());
        let resources = CompositeDisposable::new(vec![
            Box::new(timer.clone()) as BoxDisposable,
            Box::new(upstream.clone()),
        ]);

        Arc::new_cyclic(|this| Self {
            state: ReentrantMutex::new(RefCell::new(SinkState {
                generation: 0,
                pending: None,
                lifecycle: Lifecycle::Active,
            })),
            due_time,
            flush_on_complete,
            scheduler,
            downstream,
            timer,
            upstream,
            resources,
            this: this.clone(),
        })
    }

    /// Hand over the upstream subscription once `subscribe` returns
    ///
    /// If the sink already terminated (the source may complete
    /// synchronously during `subscribe`), the subscription is disposed
    /// straight away.
    pub(crate) fn attach_upstream(&self, subscription: BoxDisposable) {
        self.upstream.set(subscription);
    }

    /// Timer callback for the value stamped with `generation`
    pub(crate) fn on_timer_fire(&self, generation: u64) {
        let guard = self.state.lock();

        let ready = {
            let mut state = guard.borrow_mut();
            if state.lifecycle == Lifecycle::Terminal {
                trace!(generation, "Timer fired after termination; ignoring");
                return;
            }
            if state.generation != generation {
                trace!(
                    generation,
                    current = state.generation,
                    "Stale debounce timer; ignoring"
                );
                return;
            }
            state.pending.take()
        };

        if let Some(value) = ready {
            debug!(generation, "Quiet period elapsed; emitting value");
            self.downstream.on(Event::Value(value));
        }
    }

    /// External cancellation: terminate, cancel the timer, drop upstream
    ///
    /// Idempotent and safe to call from any thread, including from inside
    /// a downstream callback.
    pub(crate) fn dispose(&self) {
        {
            let guard = self.state.lock();
            let mut state = guard.borrow_mut();
            if state.terminate() {
                debug!(generation = state.generation, "Debounce subscription disposed");
            }
        }
        self.teardown();
    }

    pub(crate) fn is_terminal(&self) -> bool {
        let guard = self.state.lock();
        let state = guard.borrow();
        state.lifecycle == Lifecycle::Terminal
    }

    fn teardown(&self) {
        self.resources.dispose();
    }
}

impl<T, E> Observer<T, E> for DebounceSink<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn on(&self, event: Event<T, E>) {
        match event {
            Event::Value(value) => self.on_value(value),
            Event::Error(error) => self.on_error(error),
            Event::Completed => self.on_completed(),
        }
    }

    fn on_value(&self, value: T) {
        let guard = self.state.lock();

        let generation = {
            let mut state = guard.borrow_mut();
            if state.lifecycle == Lifecycle::Terminal {
                trace!("Value after termination; ignoring");
                return;
            }
            state.generation += 1;
            state.pending = Some(value);
            state.generation
        };

        let sink = self.this.clone();
        let handle = self
            .scheduler
            .schedule_relative_with(generation, self.due_time, move |generation| {
                if let Some(sink) = sink.upgrade() {
                    sink.on_timer_fire(generation);
                }
            });
        // Evicts (and cancels) the timer of the previous generation
        self.timer.replace(handle);
        trace!(generation, due_time = ?self.due_time, "Debounce timer armed");

        drop(guard);
    }

    fn on_error(&self, error: E) {
        let guard = self.state.lock();

        {
            let mut state = guard.borrow_mut();
            let dropped = state.pending.is_some();
            if !state.terminate() {
                return;
            }
            debug!(
                generation = state.generation,
                dropped_pending = dropped,
                "Upstream failed; terminating debounce"
            );
        }

        self.downstream.on(Event::Error(error));
        drop(guard);
        self.teardown();
    }

    fn on_completed(&self) {
        let guard = self.state.lock();

        let flushed = {
            let mut state = guard.borrow_mut();
            if state.lifecycle == Lifecycle::Terminal {
                return;
            }
            state.pending.take()
        };

        if let Some(value) = flushed {
            if self.flush_on_complete {
                debug!("Upstream completed; flushing pending value");
                self.downstream.on(Event::Value(value));
            } else {
                debug!("Upstream completed; discarding pending value");
            }
        }

        {
            // Downstream may have disposed us while receiving the flush
            let mut state = guard.borrow_mut();
            if !state.terminate() {
                return;
            }
            debug!(generation = state.generation, "Debounce completed");
        }

        self.downstream.on(Event::Completed);
        drop(guard);
        self.teardown();
    }
}

impl<T, E> Disposable for DebounceSink<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn dispose(&self) {
        DebounceSink::dispose(self)
    }

    fn is_disposed(&self) -> bool {
        self.is_terminal()
    }
}
