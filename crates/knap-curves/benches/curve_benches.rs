//! Criterion benchmarks for the reference curves.
//!
//! Covers: Hill evaluation and derivative on both sides of saturation,
//! logistic derivative.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use knap_core::traits::ResponseFunction;
use knap_curves::{HillCurve, LogisticCurve};

fn bench_hill(c: &mut Criterion) {
    let curve = HillCurve::new(397_650.0, 0.5085, 0.92).unwrap();

    c.bench_function("hill_evaluate", |b| {
        b.iter(|| curve.evaluate(black_box(1_000_000.0)))
    });
    c.bench_function("hill_derivative_below_half", |b| {
        b.iter(|| curve.derivative(black_box(10_000.0)))
    });
    c.bench_function("hill_derivative_saturated", |b| {
        b.iter(|| curve.derivative(black_box(50_000_000.0)))
    });
}

fn bench_logistic(c: &mut Criterion) {
    let curve = LogisticCurve::new(5_000.0, 0.4, 3.0).unwrap();

    c.bench_function("logistic_derivative", |b| {
        b.iter(|| curve.derivative(black_box(2_500.0)))
    });
}

criterion_group!(benches, bench_hill, bench_logistic);
criterion_main!(benches);
