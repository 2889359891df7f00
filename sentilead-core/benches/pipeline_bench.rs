//! Criterion benchmarks for SentiLead hot paths.
//!
//! Benchmarks:
//! 1. Alignment (validation + feature derivation + merge join)
//! 2. Lead correlations across 0..=max_lead
//! 3. Per-horizon forecast
//! 4. Full per-ticker pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sentilead_core::domain::{DateWindow, PricePoint, SentimentPoint};
use sentilead_core::{
    align_and_featurize, analyze, compute_lead_correlations, forecast, AnalysisRequest,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(n: usize) -> (Vec<PricePoint>, Vec<SentimentPoint>, DateWindow) {
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let mut prices = Vec::with_capacity(n);
    let mut sentiment = Vec::with_capacity(n);
    for i in 0..n {
        let date = base_date + chrono::Duration::days(i as i64);
        let open = 100.0 + (i as f64 * 0.1).sin() * 10.0;
        let score = (i as f64 * 0.37).cos() * 0.6;
        prices.push(PricePoint::new("BENCH", date, open));
        // Sentiment misses every seventh day
        if i % 7 != 3 {
            sentiment.push(SentimentPoint::new("BENCH", date, score));
        }
    }
    let window = DateWindow::new(base_date, base_date + chrono::Duration::days(n as i64)).unwrap();
    (prices, sentiment, window)
}

// ── 1. Alignment ─────────────────────────────────────────────────────

fn bench_alignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("alignment");

    for &days in &[252, 1260, 2520] {
        let (prices, sentiment, window) = make_series(days);
        group.bench_with_input(BenchmarkId::new("align", days), &days, |b, _| {
            b.iter(|| {
                align_and_featurize(
                    "BENCH",
                    black_box(&prices),
                    black_box(&sentiment),
                    window,
                )
            });
        });
    }

    group.finish();
}

// ── 2. Lead correlations ─────────────────────────────────────────────

fn bench_lead_correlations(c: &mut Criterion) {
    let mut group = c.benchmark_group("lead_correlations");
    let (prices, sentiment, window) = make_series(1260);
    let table = align_and_featurize("BENCH", &prices, &sentiment, window)
        .unwrap()
        .table()
        .unwrap();

    for &max_lead in &[5, 20, 60] {
        group.bench_with_input(
            BenchmarkId::new("max_lead", max_lead),
            &max_lead,
            |b, &k| {
                b.iter(|| compute_lead_correlations(black_box(&table), k).unwrap());
            },
        );
    }

    group.finish();
}

// ── 3. Forecast ──────────────────────────────────────────────────────

fn bench_forecast(c: &mut Criterion) {
    let mut group = c.benchmark_group("forecast");
    let (prices, sentiment, window) = make_series(1260);
    let table = align_and_featurize("BENCH", &prices, &sentiment, window)
        .unwrap()
        .table()
        .unwrap();

    for &horizon in &[5, 30, 60] {
        group.bench_with_input(BenchmarkId::new("horizon", horizon), &horizon, |b, &h| {
            b.iter(|| forecast(black_box(&table), h));
        });
    }

    group.finish();
}

// ── 4. Full pipeline ─────────────────────────────────────────────────

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let (prices, sentiment, window) = make_series(1260);
    let request = AnalysisRequest {
        ticker: "BENCH".into(),
        window,
        max_lead: 5,
        horizon: 5,
    };

    group.bench_function("analyze_1260_days", |b| {
        b.iter(|| analyze(black_box(&prices), black_box(&sentiment), &request));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_alignment,
    bench_lead_correlations,
    bench_forecast,
    bench_full_pipeline,
);
criterion_main!(benches);
