//! Criterion benchmarks for the allocator.
//!
//! Covers: a seven-channel media plan, a wide synthetic plan, and a single
//! channel's marginal-price root search.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use knap_curves::HillCurve;
use knap_solver::{spend_at_marginal, Allocator};

fn media_plan() -> Vec<HillCurve> {
    [
        (397_650.0, 0.508_521_7, 0.92, 9.168_728e-6 / 87.985_09),
        (1_336_580.0, 0.941_772, 0.996_416_7, 7.202_334e-7),
        (5.509_022, 5_000.0, 0.99, 2.982_394e-4 / 219.0),
        (3_191.663, 10_000.0, 0.75, 1.353_697e-3 / 65.0),
        (237_349.3, 0.995_435_4, 0.7, 9.501_362e-6 / 12.476_45),
        (2_961.220_9, 100.0, 0.5, 3.669_801e-3 / 87.985_09),
        (664_196.7, 0.662_257, 0.92, 1.275_716e-6 / 87.985_09),
    ]
    .into_iter()
    .map(|(cap, ec50, steep, m)| {
        HillCurve::new(cap, ec50, steep)
            .and_then(|c| c.with_multiplier(m))
            .unwrap()
    })
    .collect()
}

fn bench_media_plan(c: &mut Criterion) {
    let curves = media_plan();
    let allocator = Allocator::default();

    c.bench_function("solve_media_plan", |b| {
        b.iter(|| allocator.solve(black_box(&curves), black_box(70_874_156.0)))
    });
}

fn bench_wide_plan(c: &mut Criterion) {
    let curves: Vec<HillCurve> = (0..64)
        .map(|i| {
            let cap = 100.0 + i as f64 * 7.0;
            let ec50 = 0.3 + (i % 5) as f64 * 0.1;
            let steep = 0.6 + (i % 4) as f64 * 0.1;
            HillCurve::new(cap, ec50, steep).unwrap()
        })
        .collect();
    let allocator = Allocator::default();

    c.bench_function("solve_64_channels", |b| {
        b.iter(|| allocator.solve(black_box(&curves), black_box(5_000.0)))
    });
}

fn bench_spend_at_marginal(c: &mut Criterion) {
    let curve = HillCurve::new(100.0, 0.5, 2.0).unwrap();

    c.bench_function("spend_at_marginal", |b| {
        b.iter(|| spend_at_marginal(&curve, black_box(0.05), black_box(1e6)))
    });
}

criterion_group!(benches, bench_media_plan, bench_wide_plan, bench_spend_at_marginal);
criterion_main!(benches);
