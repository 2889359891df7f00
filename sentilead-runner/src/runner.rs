//! Per-ticker runner: availability check, fetch, analyze, classify.
//!
//! Every failure mode of one ticker becomes a `TickerOutcome` variant, so a
//! batch never aborts because one ticker is unavailable, thin, or malformed.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sentilead_core::data::InsufficientData;
use sentilead_core::{analyze, AnalysisOutcome, AnalysisReport, AnalysisRequest};

use crate::availability::Availability;
use crate::sources::Sources;

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// What happened to one requested ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TickerOutcome {
    Complete(Box<AnalysisReport>),
    InsufficientData(InsufficientData),
    /// Absent from at least one source; the core was not invoked.
    Unavailable {
        ticker: String,
        in_prices: bool,
        in_sentiment: bool,
        suggestions: Vec<String>,
    },
    /// A source failed while fetching this ticker.
    UpstreamFault { ticker: String, error: String },
    /// The core refused the fetched series.
    Rejected { ticker: String, error: String },
}

impl TickerOutcome {
    pub fn ticker(&self) -> &str {
        match self {
            TickerOutcome::Complete(r) => &r.ticker,
            TickerOutcome::InsufficientData(info) => &info.ticker,
            TickerOutcome::Unavailable { ticker, .. }
            | TickerOutcome::UpstreamFault { ticker, .. }
            | TickerOutcome::Rejected { ticker, .. } => ticker,
        }
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            TickerOutcome::Complete(r) => Some(r),
            _ => None,
        }
    }

    /// Short status label for summaries.
    pub fn status(&self) -> &'static str {
        match self {
            TickerOutcome::Complete(_) => "complete",
            TickerOutcome::InsufficientData(_) => "insufficient_data",
            TickerOutcome::Unavailable { .. } => "unavailable",
            TickerOutcome::UpstreamFault { .. } => "upstream_fault",
            TickerOutcome::Rejected { .. } => "rejected",
        }
    }
}

/// Analyze one ticker against already-opened sources.
pub fn analyze_ticker(
    sources: &Sources,
    availability: &Availability,
    request: &AnalysisRequest,
) -> TickerOutcome {
    let ticker = request.ticker.as_str();

    if let Some(missing) = availability.check(ticker) {
        debug!(ticker, in_prices = missing.in_prices, in_sentiment = missing.in_sentiment, "ticker unavailable");
        return TickerOutcome::Unavailable {
            ticker: ticker.to_string(),
            in_prices: missing.in_prices,
            in_sentiment: missing.in_sentiment,
            suggestions: missing.suggestions,
        };
    }

    let fetched = sources
        .prices
        .fetch(ticker, request.window)
        .and_then(|p| Ok((p, sources.sentiment.fetch(ticker, request.window)?)));
    let (prices, sentiment) = match fetched {
        Ok(series) => series,
        Err(e) => {
            warn!(ticker, error = %e, "upstream fault");
            return TickerOutcome::UpstreamFault {
                ticker: ticker.to_string(),
                error: e.to_string(),
            };
        }
    };

    match analyze(&prices, &sentiment, request) {
        Ok(AnalysisOutcome::Complete(report)) => TickerOutcome::Complete(report),
        Ok(AnalysisOutcome::InsufficientData(info)) => TickerOutcome::InsufficientData(info),
        Err(e) => {
            warn!(ticker, error = %e, "input rejected");
            TickerOutcome::Rejected {
                ticker: ticker.to_string(),
                error: e.to_string(),
            }
        }
    }
}
