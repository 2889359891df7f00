//! Batch execution over many tickers.
//!
//! Tickers are independent, so the batch fans out on the rayon pool and
//! collects into a `BTreeMap`: output order never depends on scheduling.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::info;

use sentilead_core::data::DataError;
use sentilead_core::domain::DateWindow;

use crate::availability::Availability;
use crate::config::{AnalysisConfig, RunId};
use crate::runner::{analyze_ticker, TickerOutcome, SCHEMA_VERSION};
use crate::sources::Sources;

/// All outcomes of one configured run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub window: DateWindow,
    pub max_lead: usize,
    pub horizon: usize,
    /// True when the series were generated, not read.
    pub synthetic: bool,
    pub outcomes: BTreeMap<String, TickerOutcome>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BatchResult {
    /// Count of outcomes per status label.
    pub fn status_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for outcome in self.outcomes.values() {
            *counts.entry(outcome.status()).or_insert(0) += 1;
        }
        counts
    }

    pub fn completed(&self) -> usize {
        self.outcomes
            .values()
            .filter(|o| matches!(o, TickerOutcome::Complete(_)))
            .count()
    }
}

/// Tickers a config asks for: the explicit list, or every common ticker.
///
/// Explicit tickers are deduplicated and sorted.
pub fn select_tickers(config: &AnalysisConfig, availability: &Availability) -> Vec<String> {
    if config.run.all_common {
        return availability.common();
    }
    let mut tickers: Vec<String> = config
        .run
        .tickers
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    tickers.sort();
    tickers.dedup();
    tickers
}

/// Run every selected ticker of `config` against `sources`.
pub fn run_batch(config: &AnalysisConfig, sources: &Sources) -> Result<BatchResult, DataError> {
    let started = Instant::now();
    let window = config.date_window();
    let availability =
        Availability::discover(sources.prices.as_ref(), sources.sentiment.as_ref(), window)?;
    let tickers = select_tickers(config, &availability);

    let run_one = |ticker: &String| {
        let outcome = analyze_ticker(sources, &availability, &config.request(ticker));
        (ticker.clone(), outcome)
    };

    let outcomes: BTreeMap<String, TickerOutcome> = if config.run.parallel {
        tickers.par_iter().map(run_one).collect()
    } else {
        tickers.iter().map(run_one).collect()
    };

    let result = BatchResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        window,
        max_lead: config.analysis.max_lead,
        horizon: config.analysis.horizon,
        synthetic: sources.synthetic,
        outcomes,
    };

    info!(
        tickers = result.outcomes.len(),
        completed = result.completed(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch finished"
    );

    Ok(result)
}
