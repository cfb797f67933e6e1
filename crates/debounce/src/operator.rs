//! The `debounce` operator and its subscription handle

use crate::config::DebounceConfig;
use crate::sink::DebounceSink;
use hush_core::{BoxDisposable, Disposable, ObserverRef, Scheduler, Source};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Source that emits each upstream value only after `due_time` passes
/// without a newer one
///
/// Created by [`DebounceExt::debounce`]. Every subscription gets its own
/// coordinator, so one `Debounce` can be subscribed to many times.
pub struct Debounce<S, T, E> {
    source: S,
    due_time: Duration,
    flush_on_complete: bool,
    scheduler: Arc<dyn Scheduler>,
    _events: PhantomData<fn() -> (T, E)>,
}

impl<S, T, E> Debounce<S, T, E>
where
    S: Source<T, E>,
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn new(source: S, due_time: Duration, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            source,
            due_time,
            flush_on_complete: true,
            scheduler,
            _events: PhantomData,
        }
    }

    /// Whether a value pending at completion is emitted before `Completed`
    /// (the default) or dropped
    pub fn flush_on_complete(mut self, flush: bool) -> Self {
        self.flush_on_complete = flush;
        self
    }

    pub fn due_time(&self) -> Duration {
        self.due_time
    }

    /// Subscribe `observer`, returning a typed handle
    pub fn run(&self, observer: ObserverRef<T, E>) -> Subscription {
        let sink = DebounceSink::new(
            self.due_time,
            self.flush_on_complete,
            self.scheduler.clone(),
            observer,
        );
        debug!(due_time = ?self.due_time, "Subscribing debounce");

        let upstream_observer: ObserverRef<T, E> = sink.clone();
        let upstream = self.source.subscribe(upstream_observer);
        sink.attach_upstream(upstream);

        Subscription { inner: sink }
    }
}

impl<S, T, E> Source<T, E> for Debounce<S, T, E>
where
    S: Source<T, E>,
    T: Send + 'static,
    E: Send + 'static,
{
    fn subscribe(&self, observer: ObserverRef<T, E>) -> BoxDisposable {
        Box::new(self.run(observer))
    }
}

/// Handle to one debounce subscription
///
/// Dropping the handle does not cancel anything; call [`dispose`].
///
/// [`dispose`]: Subscription::dispose
#[must_use = "a debounce subscription runs until disposed or terminated"]
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<dyn Disposable>,
}

impl Subscription {
    /// Stop the subscription: no further events reach the observer, the
    /// pending timer is cancelled and the upstream subscription dropped.
    ///
    /// Idempotent, and safe to call concurrently or from inside the
    /// observer's own callback.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Whether the subscription has ended, by disposal or by a terminal
    /// event
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }
}

impl Disposable for Subscription {
    fn dispose(&self) {
        Subscription::dispose(self)
    }

    fn is_disposed(&self) -> bool {
        Subscription::is_disposed(self)
    }
}

/// Adds `debounce` to every source
pub trait DebounceExt<T, E>: Source<T, E> + Sized
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Emit a value only once `due_time` has passed without another one
    fn debounce(self, due_time: Duration, scheduler: Arc<dyn Scheduler>) -> Debounce<Self, T, E> {
        Debounce::new(self, due_time, scheduler)
    }

    /// Like [`debounce`](DebounceExt::debounce), configured from a
    /// [`DebounceConfig`]
    fn debounce_with(
        self,
        config: &DebounceConfig,
        scheduler: Arc<dyn Scheduler>,
    ) -> Debounce<Self, T, E> {
        Debounce::new(self, config.due_time(), scheduler)
            .flush_on_complete(config.flush_on_complete)
    }
}

impl<S, T, E> DebounceExt<T, E> for S
where
    S: Source<T, E>,
    T: Send + 'static,
    E: Send + 'static,
{
}
