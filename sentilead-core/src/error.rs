//! Hard failures for malformed input.
//!
//! Expected statistical degeneracies (too few rows, zero variance) are never
//! reported here: they surface as `InsufficientData` values or `None`
//! statistics. `CoreError` is reserved for inputs the engine refuses to
//! interpret at all.

use chrono::NaiveDate;
use thiserror::Error;

/// Which input series a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Prices,
    Sentiment,
}

impl std::fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesKind::Prices => write!(f, "price"),
            SeriesKind::Sentiment => write!(f, "sentiment"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoreError {
    #[error("{series} series for '{ticker}' is not sorted: {date} follows {previous}")]
    Unsorted {
        series: SeriesKind,
        ticker: String,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("{series} series for '{ticker}' has more than one point on {date}")]
    DuplicateDate {
        series: SeriesKind,
        ticker: String,
        date: NaiveDate,
    },

    #[error("{series} series mixes tickers: expected '{expected}', found '{found}'")]
    MixedTickers {
        series: SeriesKind,
        expected: String,
        found: String,
    },

    #[error("sentiment score for '{ticker}' on {date} is not finite")]
    NonFiniteScore { ticker: String, date: NaiveDate },

    #[error("invalid window: start {start} is after end {end}")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },

    #[error("max_lead must be between 0 and 60, got {0}")]
    MaxLeadOutOfRange(usize),

    #[error("forecast horizon must be between 1 and 60, got {0}")]
    HorizonOutOfRange(usize),

    #[error("feature table for '{ticker}' has no rows")]
    EmptyFeatureTable { ticker: String },
}
