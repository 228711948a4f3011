use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use conviction_math::{accumulate, peak_conviction, reference_trajectory, RampPolicy};
use conviction_types::{Fixed, SignedFixed};

const ALPHA: Fixed = Fixed::from_raw(9_000_000);
const X0: SignedFixed = SignedFixed::from_raw(10_001_000);
const DEPLETING: SignedFixed = SignedFixed::from_raw(-60_000);

fn bench_closed_form(c: &mut Criterion) {
    let mut group = c.benchmark_group("accumulate");

    for steps in [10u64, 1_000, 100_000, 10_000_000] {
        for policy in [RampPolicy::Unbounded, RampPolicy::FloorAtZero] {
            group.bench_with_input(
                BenchmarkId::new(format!("{policy:?}"), steps),
                &steps,
                |b, &steps| {
                    b.iter(|| {
                        black_box(accumulate(
                            Fixed::ZERO,
                            black_box(X0),
                            black_box(DEPLETING),
                            ALPHA,
                            black_box(steps),
                            policy,
                        ))
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_iterative(c: &mut Criterion) {
    let mut group = c.benchmark_group("reference_trajectory");

    for steps in [10u64, 1_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("step_by_step", steps), &steps, |b, &steps| {
            b.iter(|| {
                black_box(reference_trajectory(
                    Fixed::ZERO,
                    black_box(X0),
                    black_box(DEPLETING),
                    ALPHA,
                    black_box(steps),
                    RampPolicy::Unbounded,
                ))
            });
        });
    }

    group.finish();
}

fn bench_peak(c: &mut Criterion) {
    let mut group = c.benchmark_group("peak_conviction");

    for steps in [10u64, 1_000, 100_000, 10_000_000] {
        group.bench_with_input(BenchmarkId::new("window", steps), &steps, |b, &steps| {
            b.iter(|| {
                black_box(peak_conviction(
                    Fixed::ZERO,
                    black_box(X0),
                    black_box(DEPLETING),
                    ALPHA,
                    black_box(steps),
                    RampPolicy::FloorAtZero,
                ))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_closed_form, bench_iterative, bench_peak);
criterion_main!(benches);
