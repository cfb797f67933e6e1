//! Event vocabulary shared by sources and observers

use std::fmt;

/// A single notification travelling from a source to an observer
///
/// A well-behaved source emits any number of `Value`s followed by at most
/// one terminal event (`Error` or `Completed`), and nothing after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<T, E> {
    /// Next element of the sequence
    Value(T),
    /// Sequence failed; the error is opaque to operators
    Error(E),
    /// Sequence finished successfully
    Completed,
}

impl<T, E> Event<T, E> {
    /// Whether this event ends the sequence
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Event::Value(_))
    }

    /// The carried value, if this is a `Value`
    pub fn value(&self) -> Option<&T> {
        match self {
            Event::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: fmt::Display, E: fmt::Display> fmt::Display for Event<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Value(v) => write!(f, "value({})", v),
            Event::Error(e) => write!(f, "error({})", e),
            Event::Completed => f.write_str("completed"),
        }
    }
}

/// Receiver of events
///
/// Observers may be invoked from any thread, so implementations must be
/// `Send + Sync`. Sources guarantee calls to a single observer are never
/// concurrent with each other.
pub trait Observer<T, E>: Send + Sync {
    /// Deliver one event
    fn on(&self, event: Event<T, E>);

    fn on_value(&self, value: T) {
        self.on(Event::Value(value));
    }

    fn on_error(&self, error: E) {
        self.on(Event::Error(error));
    }

    fn on_completed(&self) {
        self.on(Event::Completed);
    }
}

impl<T, E, F> Observer<T, E> for F
where
    F: Fn(Event<T, E>) + Send + Sync,
{
    fn on(&self, event: Event<T, E>) {
        self(event)
    }
}
