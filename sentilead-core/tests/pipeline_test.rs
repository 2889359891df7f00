//! End-to-end tests of the per-ticker pipeline on hand-built series.
//!
//! Tests:
//! 1. Reference four-day scenario through `analyze`
//! 2. Raw observations aggregated per day before alignment
//! 3. A lagged sentiment signal shows up at the right lead and horizon
//! 4. Malformed input is rejected, thin input is reported

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use sentilead_core::domain::{
    aggregate_daily, Aggregation, DateWindow, PricePoint, SentimentObservation, SentimentPoint,
};
use sentilead_core::{
    analyze, AnalysisOutcome, AnalysisRequest, CoreError, CorrelationStrength, InsufficientReason,
};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn weekdays(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut date = start;
    while out.len() < n {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(date);
        }
        date += Duration::days(1);
    }
    out
}

fn request(ticker: &str, window: DateWindow, max_lead: usize, horizon: usize) -> AnalysisRequest {
    AnalysisRequest {
        ticker: ticker.into(),
        window,
        max_lead,
        horizon,
    }
}

// ──────────────────────────────────────────────
// 1. Reference scenario
// ──────────────────────────────────────────────

#[test]
fn reference_scenario_end_to_end() {
    let dates = [d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4), d(2024, 1, 5)];
    let prices: Vec<PricePoint> = dates
        .iter()
        .zip([100.0, 102.0, 101.0, 105.0])
        .map(|(&date, open)| PricePoint::new("AI.PA", date, open))
        .collect();
    let sentiment: Vec<SentimentPoint> = dates
        .iter()
        .zip([0.1, 0.3, 0.2, 0.5])
        .map(|(&date, s)| SentimentPoint::new("AI.PA", date, s))
        .collect();

    let window = DateWindow::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
    let outcome = analyze(&prices, &sentiment, &request("AI.PA", window, 0, 2)).unwrap();
    let report = outcome.report().expect("complete report");

    assert_eq!(report.feature_rows, 3);
    assert!(report.lead_correlations[0].correlation.unwrap() > 0.9);
    assert_eq!(report.forecast.per_horizon.len(), 2);
    // Horizon 2 leaves a single training pair
    assert!(report.forecast.per_horizon[1].predicted_return.is_none());
    assert!(report.forecast.per_horizon[1].predicted_price.is_none());
}

// ──────────────────────────────────────────────
// 2. Aggregation feeding the aligner
// ──────────────────────────────────────────────

#[test]
fn intraday_observations_collapse_to_one_point_per_day() {
    let obs = |day: u32, score: f64, mentions: u64| SentimentObservation {
        date: d(2024, 2, day),
        ticker: "KER.PA".into(),
        score,
        mentions: Some(mentions),
    };
    let raw = vec![
        obs(5, 0.2, 1),
        obs(5, 0.6, 3),
        obs(6, -0.1, 2),
        obs(7, 0.4, 1),
        obs(7, 0.0, 1),
        obs(8, 0.3, 5),
    ];

    let mean = aggregate_daily(&raw, Aggregation::Mean);
    let weighted = aggregate_daily(&raw, Aggregation::MentionWeighted);
    assert_eq!(mean.len(), 4);
    assert!((mean[0].score - 0.4).abs() < 1e-12);
    assert!((weighted[0].score - 0.5).abs() < 1e-12);
    assert_eq!(mean[0].mentions, Some(4));

    let prices: Vec<PricePoint> = (5..=8)
        .zip([700.0, 705.0, 698.0, 710.0])
        .map(|(day, open)| PricePoint::new("KER.PA", d(2024, 2, day), open))
        .collect();
    let window = DateWindow::new(d(2024, 2, 1), d(2024, 2, 29)).unwrap();
    let outcome = analyze(&prices, &mean, &request("KER.PA", window, 1, 1)).unwrap();
    assert_eq!(outcome.report().unwrap().feature_rows, 3);
}

// ──────────────────────────────────────────────
// 3. Lagged signal
// ──────────────────────────────────────────────

#[test]
fn lagged_sentiment_signal_is_found_at_its_lead() {
    let dates = weekdays(d(2024, 3, 1), 40);
    // Deterministic zig-zag sentiment with varying amplitude
    let scores: Vec<f64> = (0..dates.len())
        .map(|i| ((i * 7 % 11) as f64 - 5.0) / 10.0)
        .collect();
    let deltas: Vec<f64> = std::iter::once(0.0)
        .chain(scores.windows(2).map(|w| w[1] - w[0]))
        .collect();
    // Return two rows later follows the sentiment change
    let mut opens = vec![100.0];
    for i in 1..dates.len() {
        let r = if i >= 3 { 0.02 * deltas[i - 2] } else { 0.001 };
        let prev = opens[i - 1];
        opens.push(prev * f64::exp(r));
    }

    let prices: Vec<PricePoint> = dates
        .iter()
        .zip(&opens)
        .map(|(&date, &open)| PricePoint::new("DG.PA", date, open))
        .collect();
    let sentiment: Vec<SentimentPoint> = dates
        .iter()
        .zip(&scores)
        .map(|(&date, &s)| SentimentPoint::new("DG.PA", date, s))
        .collect();

    let window = DateWindow::new(dates[0], *dates.last().unwrap()).unwrap();
    let report = analyze(&prices, &sentiment, &request("DG.PA", window, 4, 3))
        .unwrap()
        .report()
        .cloned()
        .unwrap();

    let lead2 = report.lead_correlations[2].correlation.unwrap();
    assert!((lead2 - 1.0).abs() < 1e-6, "lead-2 correlation was {lead2}");
    let h2 = &report.forecast.per_horizon[1];
    let model = h2.model.as_ref().unwrap();
    assert!((model.beta - 0.02).abs() < 1e-6);
    assert_eq!(
        report.strength,
        report.mean_correlation.map(CorrelationStrength::classify)
    );
}

// ──────────────────────────────────────────────
// 4. Rejection and insufficiency
// ──────────────────────────────────────────────

#[test]
fn duplicate_price_dates_are_rejected() {
    let prices = vec![
        PricePoint::new("RI.PA", d(2024, 1, 2), 150.0),
        PricePoint::new("RI.PA", d(2024, 1, 2), 151.0),
    ];
    let sentiment = vec![SentimentPoint::new("RI.PA", d(2024, 1, 2), 0.1)];
    let window = DateWindow::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
    let err = analyze(&prices, &sentiment, &request("RI.PA", window, 1, 1)).unwrap_err();
    assert!(matches!(err, CoreError::DuplicateDate { .. }));
}

#[test]
fn window_without_overlap_is_insufficient() {
    let prices = vec![
        PricePoint::new("RI.PA", d(2024, 1, 2), 150.0),
        PricePoint::new("RI.PA", d(2024, 1, 3), 151.0),
    ];
    let sentiment = vec![
        SentimentPoint::new("RI.PA", d(2024, 1, 2), 0.1),
        SentimentPoint::new("RI.PA", d(2024, 1, 3), 0.2),
    ];
    let window = DateWindow::new(d(2024, 6, 1), d(2024, 6, 30)).unwrap();
    let outcome = analyze(&prices, &sentiment, &request("RI.PA", window, 1, 1)).unwrap();
    match outcome {
        AnalysisOutcome::InsufficientData(info) => {
            assert_eq!(info.reason, InsufficientReason::EmptyPrices);
            assert_eq!(info.window, window);
        }
        AnalysisOutcome::Complete(_) => panic!("expected insufficient data"),
    }
}
