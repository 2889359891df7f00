//! Structural validation of input series.
//!
//! The aligner refuses series that are unsorted, carry duplicate dates, or
//! mix tickers. These are caller bugs, not statistical degeneracies.

use chrono::NaiveDate;

use crate::domain::{PricePoint, SentimentPoint};
use crate::error::{CoreError, SeriesKind};

/// Minimal view of a dated, ticker-tagged point.
pub trait DatedPoint {
    fn date(&self) -> NaiveDate;
    fn ticker(&self) -> &str;
}

impl DatedPoint for PricePoint {
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn ticker(&self) -> &str {
        &self.ticker
    }
}

impl DatedPoint for SentimentPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn ticker(&self) -> &str {
        &self.ticker
    }
}

/// Check that `points` belong to `ticker` and have strictly increasing dates.
pub fn validate_series<P: DatedPoint>(
    points: &[P],
    ticker: &str,
    series: SeriesKind,
) -> Result<(), CoreError> {
    let mut previous: Option<NaiveDate> = None;
    for p in points {
        if p.ticker() != ticker {
            return Err(CoreError::MixedTickers {
                series,
                expected: ticker.to_string(),
                found: p.ticker().to_string(),
            });
        }
        if let Some(prev) = previous {
            if p.date() == prev {
                return Err(CoreError::DuplicateDate {
                    series,
                    ticker: ticker.to_string(),
                    date: p.date(),
                });
            }
            if p.date() < prev {
                return Err(CoreError::Unsorted {
                    series,
                    ticker: ticker.to_string(),
                    previous: prev,
                    date: p.date(),
                });
            }
        }
        previous = Some(p.date());
    }
    Ok(())
}

/// Sentiment scores must be finite; a NaN score has no meaningful delta.
pub fn validate_scores(points: &[SentimentPoint]) -> Result<(), CoreError> {
    match points.iter().find(|p| !p.score.is_finite()) {
        Some(p) => Err(CoreError::NonFiniteScore {
            ticker: p.ticker.clone(),
            date: p.date,
        }),
        None => Ok(()),
    }
}
