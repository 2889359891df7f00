//! Deterministic synthetic series for demos and development.
//!
//! Each ticker gets its own RNG seeded from a BLAKE3 hash of its name, so a
//! ticker always produces the same series for the same window. Sentiment is a
//! mean-reverting walk in [-1, 1]; returns load partially on the sentiment
//! change two days earlier, which gives the lead-correlation estimator a
//! signal to find. Synthetic results are tagged and never mixed with file data.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

use sentilead_core::data::{DataError, PriceProvider, SentimentProvider};
use sentilead_core::domain::{DateWindow, PricePoint, SentimentPoint};

pub const DEFAULT_SYNTHETIC_TICKERS: &[&str] =
    &["AIR.PA", "BNP.PA", "MC.PA", "OR.PA", "SAN.PA", "TTE.PA"];

/// Loading of the return on the sentiment change two sessions earlier.
const SIGNAL_LOADING: f64 = 0.015;
/// Days on which no sentiment is published.
const SENTIMENT_GAP_RATE: f64 = 0.1;

/// Generate both series for one ticker over `window` (weekdays only).
pub fn generate_synthetic(
    ticker: &str,
    window: DateWindow,
) -> (Vec<PricePoint>, Vec<SentimentPoint>) {
    // Deterministic seed from ticker name
    let seed: [u8; 32] = *blake3::hash(ticker.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut prices = Vec::new();
    let mut sentiment = Vec::new();
    let mut price = rng.gen_range(20.0..500.0_f64);
    let mut score = 0.0_f64;
    let mut deltas: [f64; 2] = [0.0; 2];
    let mut current = window.start;

    while current <= window.end {
        if !is_session_day(current) {
            current += chrono::Duration::days(1);
            continue;
        }

        let noise: f64 = rng.gen_range(-0.015..0.015);
        let daily_return = SIGNAL_LOADING * deltas[0] + noise;
        price *= daily_return.exp();
        prices.push(PricePoint::new(ticker, current, price));

        let previous = score;
        score = (0.7 * score + rng.gen_range(-0.35..0.35)).clamp(-1.0, 1.0);
        deltas = [deltas[1], score - previous];

        if rng.gen_bool(1.0 - SENTIMENT_GAP_RATE) {
            let mentions = rng.gen_range(1..40u64);
            sentiment.push(SentimentPoint::new(ticker, current, score).with_mentions(mentions));
        }

        current += chrono::Duration::days(1);
    }

    (prices, sentiment)
}

fn universe_in_window(tickers: &[String], window: DateWindow) -> BTreeSet<String> {
    let has_weekday = (0..window.calendar_days().min(7))
        .any(|i| is_session_day(window.start + chrono::Duration::days(i)));
    if has_weekday {
        tickers.iter().cloned().collect()
    } else {
        BTreeSet::new()
    }
}

/// Synthetic open prices for a fixed ticker list.
#[derive(Debug, Clone)]
pub struct SyntheticPrices {
    tickers: Vec<String>,
}

impl SyntheticPrices {
    pub fn new(tickers: Vec<String>) -> Self {
        Self { tickers }
    }
}

impl PriceProvider for SyntheticPrices {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn tickers(&self, window: DateWindow) -> Result<BTreeSet<String>, DataError> {
        Ok(universe_in_window(&self.tickers, window))
    }

    fn fetch(&self, ticker: &str, window: DateWindow) -> Result<Vec<PricePoint>, DataError> {
        if !self.tickers.iter().any(|t| t == ticker) {
            return Ok(Vec::new());
        }
        Ok(generate_synthetic(ticker, window).0)
    }
}

/// Synthetic daily sentiment matching `SyntheticPrices` ticker by ticker.
#[derive(Debug, Clone)]
pub struct SyntheticSentiment {
    tickers: Vec<String>,
}

impl SyntheticSentiment {
    pub fn new(tickers: Vec<String>) -> Self {
        Self { tickers }
    }
}

impl SentimentProvider for SyntheticSentiment {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn tickers(&self, window: DateWindow) -> Result<BTreeSet<String>, DataError> {
        Ok(universe_in_window(&self.tickers, window))
    }

    fn fetch(&self, ticker: &str, window: DateWindow) -> Result<Vec<SentimentPoint>, DataError> {
        if !self.tickers.iter().any(|t| t == ticker) {
            return Ok(Vec::new());
        }
        Ok(generate_synthetic(ticker, window).1)
    }
}

/// True if `date` is a weekday.
pub fn is_session_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
