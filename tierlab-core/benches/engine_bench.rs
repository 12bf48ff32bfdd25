//! Criterion benchmarks for tierlab hot paths.
//!
//! Benchmarks:
//! 1. Feature pass (all indicators on the rayon pool)
//! 2. State machine fold over precomputed features
//! 3. Full run (validation, both phases)
//! 4. Universe breadth scan

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tierlab_core::breadth::{align_breadth, scan_universe, BreadthHistory};
use tierlab_core::data::{generate_synthetic_breadth, generate_synthetic_index, SyntheticSpec};
use tierlab_core::domain::Bar;
use tierlab_core::engine::fold_signals;
use tierlab_core::features::compute_features;
use tierlab_core::{run_signals, ExitRules, SignalConfig};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_inputs(bars: usize) -> (Vec<Bar>, BreadthHistory) {
    let spec = SyntheticSpec {
        bars,
        ..SyntheticSpec::default()
    };
    let index = generate_synthetic_index(&spec);
    let breadth = generate_synthetic_breadth(&index, spec.seed);
    (index, breadth)
}

fn make_universe(constituents: usize, bars: usize) -> Vec<Vec<Bar>> {
    (0..constituents as u64)
        .map(|seed| {
            generate_synthetic_index(&SyntheticSpec {
                seed,
                bars,
                ..SyntheticSpec::default()
            })
        })
        .collect()
}

// ── 1. Feature Pass ──────────────────────────────────────────────────

fn bench_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_pass");
    let config = SignalConfig::default();

    for &bar_count in &[252, 1260, 2520] {
        let (bars, _) = make_inputs(bar_count);
        group.bench_with_input(
            BenchmarkId::new("default_set", bar_count),
            &bar_count,
            |b, _| {
                b.iter(|| compute_features(black_box(&bars), black_box(&config)));
            },
        );
    }

    group.finish();
}

// ── 2. State Machine Fold ────────────────────────────────────────────

fn bench_fold(c: &mut Criterion) {
    let mut group = c.benchmark_group("signal_fold");

    for &bar_count in &[252, 1260, 2520] {
        let (bars, history) = make_inputs(bar_count);
        let uniform = SignalConfig::default();
        let gated = SignalConfig {
            exit: ExitRules::regime_gated(),
            ..SignalConfig::default()
        };
        let features = compute_features(&bars, &uniform);
        let breadth = align_breadth(&bars, &history);

        for (name, config) in [("uniform", &uniform), ("regime_gated", &gated)] {
            group.bench_with_input(BenchmarkId::new(name, bar_count), &bar_count, |b, _| {
                b.iter(|| {
                    fold_signals(
                        black_box(&bars),
                        black_box(&features.rows),
                        black_box(&breadth),
                        black_box(config),
                        features.warmup_bars,
                    )
                });
            });
        }
    }

    group.finish();
}

// ── 3. Full Run ──────────────────────────────────────────────────────

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");
    let config = SignalConfig::default();

    for &bar_count in &[252, 2520] {
        let (bars, history) = make_inputs(bar_count);
        group.bench_with_input(
            BenchmarkId::new("run_signals", bar_count),
            &bar_count,
            |b, _| {
                b.iter(|| run_signals(black_box(&bars), black_box(&history), black_box(&config)));
            },
        );
    }

    group.finish();
}

// ── 4. Breadth Scan ──────────────────────────────────────────────────

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("breadth_scan");

    for &constituents in &[300, 1000] {
        let universe = make_universe(constituents, 120);
        let date = universe[0][119].date;
        group.bench_with_input(
            BenchmarkId::new("scan_universe", constituents),
            &constituents,
            |b, _| {
                b.iter(|| scan_universe(black_box(date), black_box(&universe)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_features, bench_fold, bench_full_run, bench_scan);
criterion_main!(benches);
