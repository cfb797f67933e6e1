//! Reactive plumbing for Hush
//!
//! This crate provides the collaborators the debounce coordinator is
//! written against:
//! - Event vocabulary and observers
//! - Disposables and single-occupancy cancellation slots
//! - Schedulers (tokio-backed and virtual time)
//! - Sources, including a hand-driven `Subject`

pub mod disposable;
pub mod event;
pub mod scheduler;
pub mod slot;
pub mod source;
pub mod subject;
pub mod testing;

// Re-exports
pub use disposable::{AnonymousDisposable, BoxDisposable, CompositeDisposable, Disposable};
pub use event::{Event, Observer};
pub use scheduler::{Action, Scheduler, SchedulerExt, TokioScheduler, VirtualTimeScheduler};
pub use slot::{SerialSlot, SingleAssignmentSlot};
pub use source::{ObserverRef, Source};
pub use subject::Subject;
