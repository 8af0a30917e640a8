use std::sync::Arc;
use std::time::{Duration, Instant};

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use fader_core::mocks::{FixedPosition, NeverTouched, NullMotor};
use fader_core::{ControllerCfg, GestureCfg, PositionController, TouchGestureRecognizer};
use fader_traits::MonotonicClock;

pub fn bench_tick(c: &mut Criterion) {
    c.bench_function("controller_tick_async", |b| {
        b.iter_batched(
            || {
                let mut ctl = PositionController::new(
                    FixedPosition(20.0),
                    NeverTouched,
                    NullMotor,
                    Arc::new(MonotonicClock::new()),
                    ControllerCfg::default(),
                );
                ctl.set_target(80);
                ctl
            },
            |mut ctl| {
                for _ in 0..100 {
                    black_box(ctl.tick().ok());
                }
            },
            BatchSize::SmallInput,
        );
    });
}

pub fn bench_gestures(c: &mut Criterion) {
    // One second of taps sampled at 1 kHz
    let t0 = Instant::now();
    let samples: Vec<(bool, Instant)> = (0..1000u64)
        .map(|ms| ((ms / 100) % 2 == 0, t0 + Duration::from_millis(ms)))
        .collect();
    c.bench_function("gesture_sample_1k", |b| {
        b.iter(|| {
            let mut g = TouchGestureRecognizer::new(GestureCfg::default());
            for &(touched, at) in &samples {
                black_box(g.sample(touched, 40.0, at));
            }
        });
    });
}

criterion_group!(benches, bench_tick, bench_gestures);
criterion_main!(benches);
