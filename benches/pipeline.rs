//! Benchmarks for the filter bank, spectral estimator and full pipeline.

use anofox_signal::config::PipelineConfig;
use anofox_signal::core::TimeSeries;
use anofox_signal::filter::{butterworth, kalman, moving_average, wiener, ButterworthSpec};
use anofox_signal::models::autoregressive::ArModel;
use anofox_signal::pipeline::analyze;
use anofox_signal::spectral::{periodogram, top_periods};
use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn generate_prices(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0
                + 0.02 * t
                + 4.0 * (2.0 * std::f64::consts::PI * t / 30.0).sin()
                + (2.0 * std::f64::consts::PI * t / 7.0).sin()
        })
        .collect()
}

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters");

    for size in [256, 1024, 4096].iter() {
        let prices = generate_prices(*size);
        let low = ButterworthSpec::low_pass(30.0);

        group.bench_with_input(BenchmarkId::new("moving_average", size), size, |b, _| {
            b.iter(|| moving_average(black_box(&prices), 7))
        });

        group.bench_with_input(BenchmarkId::new("butterworth", size), size, |b, _| {
            b.iter(|| butterworth(black_box(&prices), &low, 1.0))
        });

        group.bench_with_input(BenchmarkId::new("wiener", size), size, |b, _| {
            b.iter(|| wiener(black_box(&prices), 3))
        });

        group.bench_with_input(BenchmarkId::new("kalman", size), size, |b, _| {
            b.iter(|| kalman(black_box(&prices), 1e-2, 0.5))
        });
    }

    group.finish();
}

fn bench_spectral(c: &mut Criterion) {
    let mut group = c.benchmark_group("spectral");

    for size in [256, 1000, 4096].iter() {
        let prices = generate_prices(*size);
        group.bench_with_input(BenchmarkId::new("periodogram", size), size, |b, _| {
            b.iter(|| {
                let spectrum = periodogram(black_box(&prices), 1.0);
                top_periods(&spectrum, 8)
            })
        });
    }

    group.finish();
}

fn bench_ar_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("autoregressive");

    for size in [256, 1024].iter() {
        let prices = generate_prices(*size);
        group.bench_with_input(BenchmarkId::new("fit_ar10", size), size, |b, _| {
            b.iter(|| ArModel::fit(black_box(&prices), 10))
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let series = TimeSeries::daily(start, generate_prices(1000));
    let config = PipelineConfig::default();

    c.bench_function("analyze_1000_days", |b| {
        b.iter(|| analyze(black_box(&series), &config))
    });
}

criterion_group!(benches, bench_filters, bench_spectral, bench_ar_fit, bench_pipeline);
criterion_main!(benches);
