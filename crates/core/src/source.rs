//! Event sources

use crate::disposable::BoxDisposable;
use crate::event::Observer;
use std::sync::Arc;

/// Shared observer handle, as held by sources
pub type ObserverRef<T, E> = Arc<dyn Observer<T, E>>;

/// Something an observer can subscribe to
///
/// The returned handle cancels the subscription. A source may deliver
/// events (including a terminal one) synchronously, before `subscribe`
/// returns.
pub trait Source<T, E>: Send + Sync {
    fn subscribe(&self, observer: ObserverRef<T, E>) -> BoxDisposable;
}

impl<T, E, S: Source<T, E> + ?Sized> Source<T, E> for Arc<S> {
    fn subscribe(&self, observer: ObserverRef<T, E>) -> BoxDisposable {
        (**self).subscribe(observer)
    }
}
