//! Ticker availability across the two sources.
//!
//! A ticker can only be analyzed when both sources carry data for it inside
//! the window. The availability check runs before the core is invoked so an
//! unknown ticker gets an actionable answer instead of an empty analysis.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use sentilead_core::data::{DataError, PriceProvider, SentimentProvider};
use sentilead_core::domain::DateWindow;

/// Maximum number of tickers listed in an unavailable-ticker suggestion.
pub const MAX_SUGGESTIONS: usize = 50;

/// Ticker sets of both sources over one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub window: DateWindow,
    pub prices: BTreeSet<String>,
    pub sentiment: BTreeSet<String>,
}

/// Why a ticker cannot be analyzed, with alternatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unavailable {
    pub in_prices: bool,
    pub in_sentiment: bool,
    /// Up to `MAX_SUGGESTIONS` tickers present in both sources.
    pub suggestions: Vec<String>,
}

impl Availability {
    /// Collect the ticker sets of both providers over `window`.
    pub fn discover(
        prices: &dyn PriceProvider,
        sentiment: &dyn SentimentProvider,
        window: DateWindow,
    ) -> Result<Self, DataError> {
        Ok(Self {
            window,
            prices: prices.tickers(window)?,
            sentiment: sentiment.tickers(window)?,
        })
    }

    /// Tickers present in both sources, sorted.
    pub fn common(&self) -> Vec<String> {
        self.prices.intersection(&self.sentiment).cloned().collect()
    }

    pub fn is_available(&self, ticker: &str) -> bool {
        self.prices.contains(ticker) && self.sentiment.contains(ticker)
    }

    /// `None` when the ticker can be analyzed.
    pub fn check(&self, ticker: &str) -> Option<Unavailable> {
        if self.is_available(ticker) {
            return None;
        }
        Some(Unavailable {
            in_prices: self.prices.contains(ticker),
            in_sentiment: self.sentiment.contains(ticker),
            suggestions: self.common().into_iter().take(MAX_SUGGESTIONS).collect(),
        })
    }
}
