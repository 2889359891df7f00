//! Aligned feature rows consumed by both analysis branches.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::window::DateWindow;

/// One aligned (ticker, date) observation with both derived values defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    /// Open price on `date`; the last row's open anchors the forecast path.
    pub open: f64,
    /// Sentiment level on `date`.
    pub sentiment: f64,
    /// ln(open_t / open_{t-1}) over consecutive entries of the price series.
    pub log_return: f64,
    /// sentiment_t − sentiment_{t-1} over consecutive entries of the sentiment series.
    pub sentiment_delta: f64,
    pub mentions: Option<u64>,
}

/// Ordered feature rows for one ticker over one window.
///
/// Rows are strictly increasing by date. Tables produced by the aligner
/// always hold at least two rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    pub ticker: String,
    pub window: DateWindow,
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }

    pub fn log_returns(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.log_return).collect()
    }

    pub fn sentiment_deltas(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.sentiment_delta).collect()
    }

    pub fn sentiment_levels(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.sentiment).collect()
    }

    /// Pair `sentiment_delta[t]` with `log_return[t + lead]` for every `t`
    /// where the shifted return exists.
    pub fn lead_pairs(&self, lead: usize) -> (Vec<f64>, Vec<f64>) {
        let n = self.rows.len();
        if lead >= n {
            return (Vec::new(), Vec::new());
        }
        let xs = self.rows[..n - lead]
            .iter()
            .map(|r| r.sentiment_delta)
            .collect();
        let ys = self.rows[lead..].iter().map(|r| r.log_return).collect();
        (xs, ys)
    }
}
