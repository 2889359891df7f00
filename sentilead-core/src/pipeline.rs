//! Per-ticker pipeline: align, correlate, forecast.
//!
//! `analyze` is pure: the same inputs always produce the same outcome, and
//! nothing is cached between calls.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::correlation::{compute_lead_correlations, CorrelationStrength, LeadCorrelation};
pub use crate::correlation::MAX_LEAD_LIMIT;
pub use crate::forecast::MAX_HORIZON_LIMIT;
use crate::data::{align_and_featurize, Alignment, InsufficientData};
use crate::domain::{DateWindow, FeatureTable, PricePoint, SentimentPoint};
use crate::error::CoreError;
use crate::forecast::{forecast, Forecast};
use crate::stats::{mean, pearson};

/// Parameters of one per-ticker analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub ticker: String,
    pub window: DateWindow,
    pub max_lead: usize,
    pub horizon: usize,
}

/// Descriptive statistics of the aligned table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub data_points: usize,
    pub avg_sentiment: Option<f64>,
    pub avg_return: Option<f64>,
    /// Same-day correlation of sentiment level with log-return.
    pub level_correlation: Option<f64>,
}

impl SeriesSummary {
    pub fn from_table(table: &FeatureTable) -> Self {
        let levels = table.sentiment_levels();
        let returns = table.log_returns();
        Self {
            data_points: table.len(),
            avg_sentiment: mean(&levels),
            avg_return: mean(&returns),
            level_correlation: pearson(&levels, &returns),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub ticker: String,
    pub window: DateWindow,
    pub last_date: NaiveDate,
    pub feature_rows: usize,
    pub summary: SeriesSummary,
    pub mean_correlation: Option<f64>,
    pub strength: Option<CorrelationStrength>,
    pub lead_correlations: Vec<LeadCorrelation>,
    pub forecast: Forecast,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Complete(Box<AnalysisReport>),
    InsufficientData(InsufficientData),
}

impl AnalysisOutcome {
    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            AnalysisOutcome::Complete(r) => Some(r),
            AnalysisOutcome::InsufficientData(_) => None,
        }
    }
}

/// Run the full per-ticker analysis.
///
/// Malformed input (unsorted series, lead or horizon out of range, ...) is
/// an error; thin data is an `InsufficientData` outcome.
pub fn analyze(
    prices: &[PricePoint],
    sentiment: &[SentimentPoint],
    request: &AnalysisRequest,
) -> Result<AnalysisOutcome, CoreError> {
    if request.max_lead > MAX_LEAD_LIMIT {
        return Err(CoreError::MaxLeadOutOfRange(request.max_lead));
    }
    if !(1..=MAX_HORIZON_LIMIT).contains(&request.horizon) {
        return Err(CoreError::HorizonOutOfRange(request.horizon));
    }
    let started = std::time::Instant::now();

    let table = match align_and_featurize(&request.ticker, prices, sentiment, request.window)? {
        Alignment::Table(t) => t,
        Alignment::Insufficient(info) => {
            debug!(ticker = %request.ticker, reason = %info.reason, "insufficient data");
            return Ok(AnalysisOutcome::InsufficientData(info));
        }
    };

    let leads = compute_lead_correlations(&table, request.max_lead)?;
    let forecast = forecast(&table, request.horizon)?;

    let report = AnalysisReport {
        ticker: request.ticker.clone(),
        window: request.window,
        last_date: forecast.last_date,
        feature_rows: table.len(),
        summary: SeriesSummary::from_table(&table),
        mean_correlation: leads.mean_correlation,
        strength: leads.mean_correlation.map(CorrelationStrength::classify),
        lead_correlations: leads.per_lead,
        forecast,
    };

    debug!(
        ticker = %report.ticker,
        rows = report.feature_rows,
        elapsed_us = started.elapsed().as_micros() as u64,
        "analysis complete"
    );

    Ok(AnalysisOutcome::Complete(Box::new(report)))
}
