//! Provider traits and structured upstream error types.
//!
//! The engine never reads files or talks to a database. Price and sentiment
//! series reach it through these two traits so sources can be swapped
//! (CSV/JSON files, synthetic generators, test fixtures) without touching
//! the analysis code.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::domain::{DateWindow, PricePoint, SentimentPoint};

/// Upstream failures: the source could not be read or returned garbage.
///
/// These are displayable in CLI output and carried verbatim into
/// per-ticker outcomes.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DataError {
    #[error("source '{source_name}' unreachable: {detail}")]
    Unreachable { source_name: String, detail: String },

    #[error("source '{source_name}' returned malformed data: {detail}")]
    Malformed { source_name: String, detail: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl DataError {
    pub fn malformed(source_name: &str, detail: impl Into<String>) -> Self {
        DataError::Malformed {
            source_name: source_name.to_string(),
            detail: detail.into(),
        }
    }

    pub fn unreachable(source_name: &str, detail: impl Into<String>) -> Self {
        DataError::Unreachable {
            source_name: source_name.to_string(),
            detail: detail.into(),
        }
    }
}

impl From<std::io::Error> for DataError {
    fn from(e: std::io::Error) -> Self {
        DataError::Io(e.to_string())
    }
}

/// Source of daily open prices.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Tickers with at least one price inside `window`.
    fn tickers(&self, window: DateWindow) -> Result<BTreeSet<String>, DataError>;

    /// Price points for `ticker` inside `window`, sorted by date.
    fn fetch(&self, ticker: &str, window: DateWindow) -> Result<Vec<PricePoint>, DataError>;
}

/// Source of daily (already aggregated) sentiment scores.
pub trait SentimentProvider: Send + Sync {
    fn name(&self) -> &str;

    fn tickers(&self, window: DateWindow) -> Result<BTreeSet<String>, DataError>;

    /// One point per day for `ticker` inside `window`, sorted by date.
    fn fetch(&self, ticker: &str, window: DateWindow) -> Result<Vec<SentimentPoint>, DataError>;
}
