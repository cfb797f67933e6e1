//! Observer that records what it receives, for tests and diagnostics

use crate::event::{Event, Observer};
use crate::scheduler::Scheduler;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// One recorded notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded<T, E> {
    /// Scheduler clock reading at delivery
    pub time: Duration,
    pub event: Event<T, E>,
}

impl<T, E> Recorded<T, E> {
    pub fn new(time: Duration, event: Event<T, E>) -> Self {
        Self { time, event }
    }
}

/// Records every event together with the time it arrived
pub struct Recorder<T, E> {
    clock: Option<Arc<dyn Scheduler>>,
    events: Mutex<Vec<Recorded<T, E>>>,
}

impl<T, E> Recorder<T, E>
where
    T: Clone + Send,
    E: Clone + Send,
{
    /// Recorder stamping every event with `Duration::ZERO`
    pub fn new() -> Self {
        Self {
            clock: None,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Recorder stamping events with `scheduler.now()`
    pub fn with_clock(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            clock: Some(scheduler),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Everything received so far
    pub fn events(&self) -> Vec<Recorded<T, E>> {
        self.events.lock().clone()
    }

    /// Just the values, in arrival order
    pub fn values(&self) -> Vec<T> {
        self.events
            .lock()
            .iter()
            .filter_map(|r| r.event.value().cloned())
            .collect()
    }

    /// Number of terminal events received
    pub fn terminal_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|r| r.event.is_terminal())
            .count()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T, E> Default for Recorder<T, E>
where
    T: Clone + Send,
    E: Clone + Send,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Observer<T, E> for Recorder<T, E>
where
    T: Clone + Send,
    E: Clone + Send,
{
    fn on(&self, event: Event<T, E>) {
        let time = self
            .clock
            .as_ref()
            .map(|clock| clock.now())
            .unwrap_or(Duration::ZERO);
        self.events.lock().push(Recorded { time, event });
    }
}
