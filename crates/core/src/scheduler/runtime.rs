//! Scheduler backed by a tokio runtime

use super::{Action, Scheduler};
use crate::disposable::{BoxDisposable, Disposable};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::trace;

/// Runs each action on a spawned tokio task after sleeping for the delay
///
/// Disposal aborts the task. If the sleep already elapsed and the action
/// is running, the abort has no effect on it.
#[derive(Clone)]
pub struct TokioScheduler {
    handle: Handle,
    origin: Instant,
}

impl TokioScheduler {
    /// Create a scheduler that spawns onto the given runtime
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            origin: Instant::now(),
        }
    }

    /// Scheduler for the runtime this thread is running in, if any
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn schedule_relative(&self, delay: Duration, action: Action) -> BoxDisposable {
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });

        trace!("Scheduled tokio task in {:?}", delay);
        Box::new(TaskHandle {
            abort: task.abort_handle(),
            disposed: AtomicBool::new(false),
        })
    }
}

/// Cancellation handle for one spawned task
struct TaskHandle {
    abort: AbortHandle,
    disposed: AtomicBool,
}

impl Disposable for TaskHandle {
    fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::AcqRel) {
            self.abort.abort();
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}
