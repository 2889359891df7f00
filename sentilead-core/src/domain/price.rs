//! One daily open price for one ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// True when `open` can be a log-return endpoint: finite and positive.
pub fn is_usable_price(open: f64) -> bool {
    open.is_finite() && open > 0.0
}

/// Daily open price for a single ticker on a single day.
///
/// Only the open is carried: returns are computed open-to-open because the
/// price source does not provide closes for every market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub ticker: String,
    pub open: f64,
}

impl PricePoint {
    pub fn new(ticker: impl Into<String>, date: NaiveDate, open: f64) -> Self {
        Self {
            date,
            ticker: ticker.into(),
            open,
        }
    }

    /// A price that can be used as a log-return endpoint: finite and positive.
    ///
    /// Zero, negative, or NaN opens are data-quality errors; they make the
    /// adjacent returns undefined rather than zero.
    pub fn is_usable(&self) -> bool {
        is_usable_price(self.open)
    }
}
