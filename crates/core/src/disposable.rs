//! Cancellable resources
//!
//! Every handle in this crate follows the same contract: `dispose` is
//! idempotent, safe to call from any thread, and never blocks on anything
//! but brief internal locking.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// A resource that can be released
pub trait Disposable: Send + Sync {
    /// Release the resource. Calling this more than once has no effect.
    fn dispose(&self);

    /// Whether `dispose` has been called
    fn is_disposed(&self) -> bool;
}

/// Boxed handle returned by schedulers and sources
pub type BoxDisposable = Box<dyn Disposable>;

impl<D: Disposable + ?Sized> Disposable for Box<D> {
    fn dispose(&self) {
        (**self).dispose()
    }

    fn is_disposed(&self) -> bool {
        (**self).is_disposed()
    }
}

impl<D: Disposable + ?Sized> Disposable for std::sync::Arc<D> {
    fn dispose(&self) {
        (**self).dispose()
    }

    fn is_disposed(&self) -> bool {
        (**self).is_disposed()
    }
}

/// Runs a closure the first time it is disposed
pub struct AnonymousDisposable {
    action: Mutex<Option<Box<dyn FnOnce() + Send>>>,
    disposed: AtomicBool,
}

impl AnonymousDisposable {
    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            action: Mutex::new(Some(Box::new(action))),
            disposed: AtomicBool::new(false),
        }
    }

    /// A handle with nothing to release
    pub fn empty() -> Self {
        Self {
            action: Mutex::new(None),
            disposed: AtomicBool::new(false),
        }
    }
}

impl Disposable for AnonymousDisposable {
    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        // Take first so the action runs without the lock held
        let action = self.action.lock().take();
        if let Some(action) = action {
            action();
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

/// Disposes a fixed group of members together, exactly once
pub struct CompositeDisposable {
    members: Mutex<Vec<BoxDisposable>>,
    disposed: AtomicBool,
}

impl CompositeDisposable {
    pub fn new(members: Vec<BoxDisposable>) -> Self {
        Self {
            members: Mutex::new(members),
            disposed: AtomicBool::new(false),
        }
    }

}

impl Disposable for CompositeDisposable {
    fn dispose(&self) {
        let members = {
            let mut members = self.members.lock();
            if self.disposed.swap(true, Ordering::AcqRel) {
                return;
            }
            std::mem::take(&mut *members)
        };

        for member in members {
            member.dispose();
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}
