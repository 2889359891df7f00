//! SentiLead Runner: analysis orchestration, sources, batch runs, export.
//!
//! This crate builds on `sentilead-core` to provide:
//! - TOML analysis configuration with deterministic run ids
//! - CSV price and JSON sentiment sources, plus synthetic sources
//! - Ticker availability discovery and suggestions
//! - Per-ticker outcome classification
//! - Parallel batch execution
//! - JSON/CSV export

pub mod availability;
pub mod batch;
pub mod config;
pub mod export;
pub mod runner;
pub mod sources;
pub mod synthetic;

pub use availability::{Availability, Unavailable, MAX_SUGGESTIONS};
pub use batch::{run_batch, select_tickers, BatchResult};
pub use config::{AnalysisConfig, ConfigError, RunId};
pub use export::{export_json, import_json, save_artifacts, ReportSummary};
pub use runner::{analyze_ticker, TickerOutcome, SCHEMA_VERSION};
pub use sources::{open_sources, CsvPriceSource, JsonSentimentSource, Sources};
pub use synthetic::{SyntheticPrices, SyntheticSentiment};
