//! Hot multicast source that events are pushed into by hand

use crate::disposable::{AnonymousDisposable, BoxDisposable};
use crate::event::{Event, Observer};
use crate::source::{ObserverRef, Source};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::trace;

struct SubjectState<T, E> {
    observers: Vec<(u64, ObserverRef<T, E>)>,
    next_id: u64,
    /// Terminal event, once one has been pushed
    stopped: Option<Event<T, E>>,
}

/// Forwards every pushed event to all current subscribers
///
/// After a terminal event the subject drops its subscribers, ignores any
/// further events, and replays the terminal event to late subscribers.
/// Pushes must not happen concurrently from several threads.
pub struct Subject<T, E> {
    state: Arc<Mutex<SubjectState<T, E>>>,
}

impl<T, E> Subject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SubjectState {
                observers: Vec::new(),
                next_id: 0,
                stopped: None,
            })),
        }
    }

    /// Number of live subscribers
    pub fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }
}

impl<T, E> Default for Subject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Observer<T, E> for Subject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn on(&self, event: Event<T, E>) {
        let targets = {
            let mut state = self.state.lock();
            if state.stopped.is_some() {
                trace!("Subject ignoring event after termination");
                return;
            }
            if event.is_terminal() {
                state.stopped = Some(event.clone());
                std::mem::take(&mut state.observers)
            } else {
                state.observers.clone()
            }
        };

        // Delivered without the lock so observers may (un)subscribe
        for (_, observer) in targets {
            observer.on(event.clone());
        }
    }
}

impl<T, E> Source<T, E> for Subject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn subscribe(&self, observer: ObserverRef<T, E>) -> BoxDisposable {
        let id = {
            let mut state = self.state.lock();
            if let Some(terminal) = state.stopped.clone() {
                drop(state);
                observer.on(terminal);
                return Box::new(AnonymousDisposable::empty());
            }
            let id = state.next_id;
            state.next_id += 1;
            state.observers.push((id, observer));
            id
        };

        let state = Arc::downgrade(&self.state);
        Box::new(AnonymousDisposable::new(move || {
            if let Some(state) = state.upgrade() {
                let removed = {
                    let mut state = state.lock();
                    let index = state.observers.iter().position(|(oid, _)| *oid == id);
                    index.map(|i| state.observers.remove(i))
                };
                drop(removed);
            }
        }))
    }
}
