//! Price/sentiment time alignment.
//!
//! Derived values are computed on each source series over its own
//! consecutive entries, then the two series are inner-joined on exact
//! calendar date. Nothing is forward- or back-filled: a date present in only
//! one source simply produces no row.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::validate::{validate_scores, validate_series};
use crate::domain::{DateWindow, FeatureRow, FeatureTable, PricePoint, SentimentPoint};
use crate::error::{CoreError, SeriesKind};
use crate::features::{log_returns, sentiment_deltas};

/// Fewest fully-defined feature rows a table may hold.
pub const MIN_FEATURE_ROWS: usize = 2;

/// Why a window could not produce a usable feature table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsufficientReason {
    EmptyPrices,
    EmptySentiment,
    /// Fewer than two dates present in both series.
    TooFewJoined,
    /// Joined rows exist, but fewer than two have both derived values.
    TooFewFeatureRows,
}

impl std::fmt::Display for InsufficientReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            InsufficientReason::EmptyPrices => "no price data in window",
            InsufficientReason::EmptySentiment => "no sentiment data in window",
            InsufficientReason::TooFewJoined => "fewer than 2 dates present in both series",
            InsufficientReason::TooFewFeatureRows => {
                "fewer than 2 rows with both a return and a sentiment change"
            }
        };
        f.write_str(text)
    }
}

/// Structured "no data for this period" result. Not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsufficientData {
    pub ticker: String,
    pub window: DateWindow,
    pub reason: InsufficientReason,
    /// Rows available at the stage that fell short.
    pub rows: usize,
}

/// Outcome of aligning one ticker's two series.
#[derive(Debug, Clone, PartialEq)]
pub enum Alignment {
    Table(FeatureTable),
    Insufficient(InsufficientData),
}

impl Alignment {
    pub fn table(self) -> Option<FeatureTable> {
        match self {
            Alignment::Table(t) => Some(t),
            Alignment::Insufficient(_) => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Alignment::Insufficient(_))
    }
}

/// Align one ticker's price and sentiment series into a feature table.
///
/// Both series are restricted to `window` (boundaries inclusive) before any
/// value is derived. Unsorted, duplicated, or mixed-ticker series are hard
/// errors; thin data is reported as `Alignment::Insufficient`.
pub fn align_and_featurize(
    ticker: &str,
    prices: &[PricePoint],
    sentiment: &[SentimentPoint],
    window: DateWindow,
) -> Result<Alignment, CoreError> {
    window.validate()?;
    validate_series(prices, ticker, SeriesKind::Prices)?;
    validate_series(sentiment, ticker, SeriesKind::Sentiment)?;
    validate_scores(sentiment)?;

    let prices: Vec<&PricePoint> = prices.iter().filter(|p| window.contains(p.date)).collect();
    let sentiment: Vec<&SentimentPoint> = sentiment
        .iter()
        .filter(|s| window.contains(s.date))
        .collect();

    let insufficient = |reason, rows| {
        Ok(Alignment::Insufficient(InsufficientData {
            ticker: ticker.to_string(),
            window,
            reason,
            rows,
        }))
    };

    if prices.is_empty() {
        return insufficient(InsufficientReason::EmptyPrices, 0);
    }
    if sentiment.is_empty() {
        return insufficient(InsufficientReason::EmptySentiment, 0);
    }

    let opens: Vec<f64> = prices.iter().map(|p| p.open).collect();
    let scores: Vec<f64> = sentiment.iter().map(|s| s.score).collect();
    let returns = log_returns(&opens);
    let deltas = sentiment_deltas(&scores);

    // Merge join: both sides are strictly increasing by date
    let mut rows = Vec::new();
    let mut joined = 0usize;
    let (mut i, mut j) = (0usize, 0usize);
    while i < prices.len() && j < sentiment.len() {
        let (p, s) = (prices[i], sentiment[j]);
        match p.date.cmp(&s.date) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                joined += 1;
                if let (Some(log_return), Some(sentiment_delta)) = (returns[i], deltas[j]) {
                    rows.push(FeatureRow {
                        date: p.date,
                        open: p.open,
                        sentiment: s.score,
                        log_return,
                        sentiment_delta,
                        mentions: s.mentions,
                    });
                }
                i += 1;
                j += 1;
            }
        }
    }

    debug!(
        ticker,
        prices = prices.len(),
        sentiment = sentiment.len(),
        joined,
        rows = rows.len(),
        "aligned series"
    );

    if joined < MIN_FEATURE_ROWS {
        return insufficient(InsufficientReason::TooFewJoined, joined);
    }
    if rows.len() < MIN_FEATURE_ROWS {
        return insufficient(InsufficientReason::TooFewFeatureRows, rows.len());
    }

    Ok(Alignment::Table(FeatureTable {
        ticker: ticker.to_string(),
        window,
        rows,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(date: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
    }

    fn window() -> DateWindow {
        DateWindow::new(d("2024-01-01"), d("2024-01-31")).unwrap()
    }

    fn prices(values: &[(&str, f64)]) -> Vec<PricePoint> {
        values
            .iter()
            .map(|&(date, open)| PricePoint::new("BNP.PA", d(date), open))
            .collect()
    }

    fn senti(values: &[(&str, f64)]) -> Vec<SentimentPoint> {
        values
            .iter()
            .map(|&(date, score)| SentimentPoint::new("BNP.PA", d(date), score))
            .collect()
    }

    #[test]
    fn reference_scenario_yields_three_rows() {
        let p = prices(&[
            ("2024-01-02", 100.0),
            ("2024-01-03", 102.0),
            ("2024-01-04", 101.0),
            ("2024-01-05", 105.0),
        ]);
        let s = senti(&[
            ("2024-01-02", 0.1),
            ("2024-01-03", 0.3),
            ("2024-01-04", 0.2),
            ("2024-01-05", 0.5),
        ]);

        let table = align_and_featurize("BNP.PA", &p, &s, window())
            .unwrap()
            .table()
            .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[0].date, d("2024-01-03"));
        assert!((table.rows[0].sentiment_delta - 0.2).abs() < 1e-12);
        assert!((table.rows[0].log_return - (102.0f64 / 100.0).ln()).abs() < 1e-12);
        assert_eq!(table.rows[2].open, 105.0);
    }

    #[test]
    fn dates_missing_from_one_source_produce_no_row() {
        let p = prices(&[
            ("2024-01-02", 100.0),
            ("2024-01-03", 101.0),
            ("2024-01-04", 102.0),
            ("2024-01-05", 103.0),
            ("2024-01-08", 104.0),
        ]);
        // Sentiment has no entry for 2024-01-04
        let s = senti(&[
            ("2024-01-02", 0.1),
            ("2024-01-03", 0.2),
            ("2024-01-05", 0.4),
            ("2024-01-08", 0.3),
        ]);

        let alignment = align_and_featurize("BNP.PA", &p, &s, window()).unwrap();
        assert!(!alignment.is_insufficient());
        let table = alignment.table().unwrap();

        let dates: Vec<NaiveDate> = table.rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d("2024-01-03"), d("2024-01-05"), d("2024-01-08")]);
        // The 01-05 return is one step of the price series (01-04 -> 01-05)
        assert!((table.rows[1].log_return - (103.0f64 / 102.0).ln()).abs() < 1e-12);
        // The 01-05 delta is one step of the sentiment series (01-03 -> 01-05)
        assert!((table.rows[1].sentiment_delta - 0.2).abs() < 1e-12);
    }

    #[test]
    fn empty_sentiment_is_insufficient_not_error() {
        let p = prices(&[("2024-01-02", 100.0), ("2024-01-03", 101.0)]);
        let result = align_and_featurize("BNP.PA", &p, &[], window()).unwrap();
        match result {
            Alignment::Insufficient(info) => {
                assert_eq!(info.reason, InsufficientReason::EmptySentiment);
                assert_eq!(info.ticker, "BNP.PA");
                assert_eq!(info.window, window());
            }
            Alignment::Table(_) => panic!("expected insufficient data"),
        }
    }

    #[test]
    fn empty_prices_is_insufficient() {
        let s = senti(&[("2024-01-02", 0.1)]);
        let result = align_and_featurize("BNP.PA", &[], &s, window()).unwrap();
        assert!(result.is_insufficient());
        assert!(matches!(
            result,
            Alignment::Insufficient(InsufficientData {
                reason: InsufficientReason::EmptyPrices,
                ..
            })
        ));
    }

    #[test]
    fn disjoint_dates_are_insufficient() {
        let p = prices(&[("2024-01-02", 100.0), ("2024-01-03", 101.0)]);
        let s = senti(&[("2024-01-10", 0.1), ("2024-01-11", 0.2)]);
        let result = align_and_featurize("BNP.PA", &p, &s, window()).unwrap();
        assert!(matches!(
            result,
            Alignment::Insufficient(InsufficientData {
                reason: InsufficientReason::TooFewJoined,
                rows: 0,
                ..
            })
        ));
    }

    #[test]
    fn two_joined_dates_leave_one_feature_row() {
        let p = prices(&[("2024-01-02", 100.0), ("2024-01-03", 101.0)]);
        let s = senti(&[("2024-01-02", 0.1), ("2024-01-03", 0.2)]);
        let result = align_and_featurize("BNP.PA", &p, &s, window()).unwrap();
        assert!(result.is_insufficient());
        assert!(matches!(
            result,
            Alignment::Insufficient(InsufficientData {
                reason: InsufficientReason::TooFewFeatureRows,
                rows: 1,
                ..
            })
        ));
    }

    #[test]
    fn zero_price_drops_adjacent_rows() {
        let p = prices(&[
            ("2024-01-02", 100.0),
            ("2024-01-03", 0.0),
            ("2024-01-04", 101.0),
            ("2024-01-05", 102.0),
            ("2024-01-08", 103.0),
        ]);
        let s = senti(&[
            ("2024-01-02", 0.1),
            ("2024-01-03", 0.2),
            ("2024-01-04", 0.3),
            ("2024-01-05", 0.1),
            ("2024-01-08", 0.0),
        ]);
        let table = align_and_featurize("BNP.PA", &p, &s, window())
            .unwrap()
            .table()
            .unwrap();
        let dates: Vec<NaiveDate> = table.rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d("2024-01-05"), d("2024-01-08")]);
    }

    #[test]
    fn window_is_inclusive_and_restricts_both_series() {
        let p = prices(&[
            ("2023-12-29", 90.0),
            ("2024-01-02", 100.0),
            ("2024-01-03", 101.0),
            ("2024-01-04", 102.0),
        ]);
        let s = senti(&[
            ("2023-12-29", 0.9),
            ("2024-01-02", 0.1),
            ("2024-01-03", 0.2),
            ("2024-01-04", 0.4),
        ]);
        let w = DateWindow::new(d("2024-01-02"), d("2024-01-04")).unwrap();
        let table = align_and_featurize("BNP.PA", &p, &s, w)
            .unwrap()
            .table()
            .unwrap();
        // 2024-01-02 is the first in-window entry, so it has no predecessor
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].date, d("2024-01-03"));
        assert_eq!(table.rows[1].date, d("2024-01-04"));
    }

    #[test]
    fn unsorted_input_is_a_hard_error() {
        let p = prices(&[("2024-01-03", 100.0), ("2024-01-02", 101.0)]);
        let s = senti(&[("2024-01-02", 0.1), ("2024-01-03", 0.2)]);
        let err = align_and_featurize("BNP.PA", &p, &s, window()).unwrap_err();
        assert!(matches!(err, CoreError::Unsorted { .. }));
    }

    #[test]
    fn inverted_window_is_a_hard_error() {
        let w = DateWindow {
            start: d("2024-02-01"),
            end: d("2024-01-01"),
        };
        let err = align_and_featurize("BNP.PA", &[], &[], w).unwrap_err();
        assert!(matches!(err, CoreError::InvertedWindow { .. }));
    }

    #[test]
    fn mentions_flow_into_rows() {
        let p = prices(&[
            ("2024-01-02", 100.0),
            ("2024-01-03", 101.0),
            ("2024-01-04", 102.0),
        ]);
        let s = vec![
            SentimentPoint::new("BNP.PA", d("2024-01-02"), 0.1).with_mentions(3),
            SentimentPoint::new("BNP.PA", d("2024-01-03"), 0.2).with_mentions(7),
            SentimentPoint::new("BNP.PA", d("2024-01-04"), 0.1),
        ];
        let table = align_and_featurize("BNP.PA", &p, &s, window())
            .unwrap()
            .table()
            .unwrap();
        assert_eq!(table.rows[0].mentions, Some(7));
        assert_eq!(table.rows[1].mentions, None);
    }
}
