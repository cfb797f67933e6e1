//! Deferred execution
//!
//! A scheduler runs an action once, no earlier than a relative delay from
//! now, on whatever execution context it owns. Cancellation through the
//! returned handle is best-effort: an action that is already running (or
//! about to) may still complete. Callers that need exactness must check
//! their own state when the action runs.

mod runtime;
mod virtual_time;

pub use runtime::TokioScheduler;
pub use virtual_time::VirtualTimeScheduler;

use crate::disposable::BoxDisposable;
use std::time::Duration;

/// Unit of deferred work
pub type Action = Box<dyn FnOnce() + Send + 'static>;

/// Executes actions after a relative delay
pub trait Scheduler: Send + Sync {
    /// Time elapsed on this scheduler's clock since it was created
    fn now(&self) -> Duration;

    /// Run `action` after `delay`, returning a handle that cancels it
    fn schedule_relative(&self, delay: Duration, action: Action) -> BoxDisposable;
}

/// Convenience helpers available on every scheduler, including trait objects
pub trait SchedulerExt: Scheduler {
    /// Schedule an action that receives `state` when it runs
    fn schedule_relative_with<S, F>(&self, state: S, delay: Duration, action: F) -> BoxDisposable
    where
        S: Send + 'static,
        F: FnOnce(S) + Send + 'static,
    {
        self.schedule_relative(delay, Box::new(move || action(state)))
    }
}

impl<T: Scheduler + ?Sized> SchedulerExt for T {}

impl<T: Scheduler + ?Sized> Scheduler for std::sync::Arc<T> {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn schedule_relative(&self, delay: Duration, action: Action) -> BoxDisposable {
        (**self).schedule_relative(delay, action)
    }
}
