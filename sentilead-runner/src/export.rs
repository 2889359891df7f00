//! Export: JSON, CSV, and the compact per-ticker summary.
//!
//! Provides three output shapes:
//! - **JSON**: full round-trip serialization of a `BatchResult` with schema versioning
//! - **CSV**: lead correlations and per-horizon forecasts, one row per ticker and lead/horizon
//! - **Compact summary**: the short per-ticker view printed by the CLI
//!
//! Undefined statistics are written as JSON `null` and as empty CSV cells,
//! never as zero.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use sentilead_core::domain::DateWindow;
use sentilead_core::AnalysisReport;

use crate::batch::BatchResult;
use crate::runner::SCHEMA_VERSION;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BatchResult` to pretty JSON.
pub fn export_json(result: &BatchResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BatchResult to JSON")
}

/// Deserialize a `BatchResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BatchResult> {
    let result: BatchResult =
        serde_json::from_str(json).context("failed to deserialize BatchResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── Compact summary ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadSummary {
    pub lead_days: usize,
    pub corr_return: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonSummary {
    pub horizon: usize,
    pub predicted_return: Option<f64>,
    pub predicted_price: Option<f64>,
}

/// Short view of one report: period, mean correlation, leads, forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub ticker: String,
    pub period: DateWindow,
    pub last_date: NaiveDate,
    pub mean_corr_return: Option<f64>,
    pub strength: Option<String>,
    pub lead_corrs: Vec<LeadSummary>,
    pub last_sentiment_delta: f64,
    pub forecast: Vec<HorizonSummary>,
}

impl ReportSummary {
    pub fn from_report(report: &AnalysisReport) -> Self {
        Self {
            ticker: report.ticker.clone(),
            period: report.window,
            last_date: report.last_date,
            mean_corr_return: report.mean_correlation,
            strength: report.strength.map(|s| s.label().to_string()),
            lead_corrs: report
                .lead_correlations
                .iter()
                .map(|l| LeadSummary {
                    lead_days: l.lead_days,
                    corr_return: l.correlation,
                })
                .collect(),
            last_sentiment_delta: report.forecast.last_sentiment_delta,
            forecast: report
                .forecast
                .per_horizon
                .iter()
                .map(|h| HorizonSummary {
                    horizon: h.horizon,
                    predicted_return: h.predicted_return,
                    predicted_price: h.predicted_price,
                })
                .collect(),
        }
    }
}

// ─── CSV export ─────────────────────────────────────────────────────

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.8}")).unwrap_or_default()
}

/// Lead correlations of every completed ticker.
///
/// Columns: ticker, lead_days, correlation, pairs, p_value
pub fn export_leads_csv(result: &BatchResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["ticker", "lead_days", "correlation", "pairs", "p_value"])?;

    for report in result.outcomes.values().filter_map(|o| o.report()) {
        for lead in &report.lead_correlations {
            wtr.write_record([
                report.ticker.as_str(),
                &lead.lead_days.to_string(),
                &cell(lead.correlation),
                &lead.pairs.to_string(),
                &cell(lead.p_value),
            ])?;
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Per-horizon forecasts of every completed ticker.
///
/// Columns: ticker, last_date, horizon, predicted_return, predicted_price,
/// alpha, beta, r_squared, n_obs
pub fn export_forecast_csv(result: &BatchResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "ticker",
        "last_date",
        "horizon",
        "predicted_return",
        "predicted_price",
        "alpha",
        "beta",
        "r_squared",
        "n_obs",
    ])?;

    for report in result.outcomes.values().filter_map(|o| o.report()) {
        let last_date = report.forecast.last_date.to_string();
        for h in &report.forecast.per_horizon {
            let model = h.model.as_ref();
            wtr.write_record([
                report.ticker.as_str(),
                &last_date,
                &h.horizon.to_string(),
                &cell(h.predicted_return),
                &cell(h.predicted_price),
                &cell(model.map(|m| m.alpha)),
                &cell(model.map(|m| m.beta)),
                &cell(model.and_then(|m| m.r_squared)),
                &model.map(|m| m.n_obs.to_string()).unwrap_or_default(),
            ])?;
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write `results.json`, `leads.csv` and `forecast.csv` under `output_dir`.
///
/// Returns the paths written.
pub fn save_artifacts(result: &BatchResult, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let files = [
        ("results.json", export_json(result)?),
        ("leads.csv", export_leads_csv(result)?),
        ("forecast.csv", export_forecast_csv(result)?),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, content) in files {
        let path = output_dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

/// Load a `BatchResult` from an artifact directory's results.json.
pub fn load_artifacts(dir: &Path) -> Result<BatchResult> {
    let path = dir.join("results.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}
