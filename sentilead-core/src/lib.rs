//! SentiLead Core: sentiment-return correlation and multi-horizon forecasting.
//!
//! This crate is pure computation, with no I/O:
//! - Domain types (prices, sentiment, feature rows, date windows)
//! - Daily sentiment aggregation
//! - Time-series alignment with structural validation
//! - Lead-correlation estimator
//! - Per-horizon OLS forecaster and price-path reconstruction
//! - Provider traits the runner implements

pub mod correlation;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod forecast;
pub mod pipeline;
pub mod price_path;
pub mod stats;

pub use correlation::{compute_lead_correlations, CorrelationStrength, LeadCorrelation, LeadCorrelations};
pub use data::{align_and_featurize, Alignment, DataError, InsufficientData, InsufficientReason};
pub use error::CoreError;
pub use forecast::{forecast, Forecast, HorizonForecast};
pub use pipeline::{analyze, AnalysisOutcome, AnalysisReport, AnalysisRequest, SeriesSummary};
pub use price_path::reconstruct_price_path;
