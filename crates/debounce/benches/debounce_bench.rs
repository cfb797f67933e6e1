//! Hot-path benchmarks for the debounce coordinator

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hush_core::testing::Recorder;
use hush_core::{Observer, Subject, VirtualTimeScheduler};
use hush_debounce::DebounceExt;
use std::sync::Arc;
use std::time::Duration;

fn bench_value_burst(c: &mut Criterion) {
    c.bench_function("debounce_burst_1000", |b| {
        b.iter(|| {
            let scheduler = VirtualTimeScheduler::new();
            let subject = Arc::new(Subject::<u64, ()>::new());
            let recorder = Arc::new(Recorder::<u64, ()>::new());
            let subscription = subject
                .clone()
                .debounce(Duration::from_millis(100), Arc::new(scheduler.clone()))
                .run(recorder.clone());

            // Every value re-arms the timer and evicts the previous one
            for value in 0..1000u64 {
                subject.on_value(black_box(value));
            }
            scheduler.run_until_idle();
            subscription.dispose();

            black_box(recorder.len())
        });
    });
}

fn bench_spaced_values(c: &mut Criterion) {
    c.bench_function("debounce_spaced_1000", |b| {
        b.iter(|| {
            let scheduler = VirtualTimeScheduler::new();
            let subject = Arc::new(Subject::<u64, ()>::new());
            let recorder = Arc::new(Recorder::<u64, ()>::new());
            let subscription = subject
                .clone()
                .debounce(Duration::from_millis(10), Arc::new(scheduler.clone()))
                .run(recorder.clone());

            // Every value outlives its quiet period and is emitted
            for value in 0..1000u64 {
                subject.on_value(black_box(value));
                scheduler.advance_by(Duration::from_millis(10));
            }
            subscription.dispose();

            black_box(recorder.len())
        });
    });
}

criterion_group!(benches, bench_value_burst, bench_spaced_values);
criterion_main!(benches);
