//! Serializable analysis configuration.
//!
//! A run is described by a TOML file:
//!
//! ```toml
//! [window]
//! start = "2024-01-01"
//! end = "2024-06-30"
//!
//! [analysis]
//! max_lead = 5
//! horizon = 5
//! aggregation = "mean"          # or "mention_weighted"
//!
//! [sources]
//! prices = "data/prices.csv"
//! sentiment = "data/sentiment.json"
//!
//! [run]
//! tickers = ["BNP.PA", "AIR.PA"]
//! ```
//!
//! CLI flags build the same struct, so both paths share validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use sentilead_core::domain::{Aggregation, DateWindow};
use sentilead_core::pipeline::{AnalysisRequest, MAX_HORIZON_LIMIT, MAX_LEAD_LIMIT};

/// Unique identifier for an analysis run (content-addressable hash).
pub type RunId = String;

pub const DEFAULT_MAX_LEAD: usize = 5;
pub const DEFAULT_HORIZON: usize = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid window: start {start} is after end {end}")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },

    #[error("max_lead must be between 0 and 60, got {0}")]
    MaxLeadOutOfRange(usize),

    #[error("horizon must be between 1 and 60, got {0}")]
    HorizonOutOfRange(usize),

    #[error("no tickers selected: list tickers or set all_common")]
    NoTickers,

    #[error("no {0} source configured (set a path or enable synthetic data)")]
    MissingSource(&'static str),
}

/// Full configuration of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    pub window: WindowConfig,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub run: RunSettings,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WindowConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisSettings {
    #[serde(default = "default_max_lead")]
    pub max_lead: usize,
    #[serde(default = "default_horizon")]
    pub horizon: usize,
    /// How same-day sentiment observations are folded.
    #[serde(default)]
    pub aggregation: Aggregation,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_lead: DEFAULT_MAX_LEAD,
            horizon: DEFAULT_HORIZON,
            aggregation: Aggregation::default(),
        }
    }
}

fn default_max_lead() -> usize {
    DEFAULT_MAX_LEAD
}

fn default_horizon() -> usize {
    DEFAULT_HORIZON
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SourcesConfig {
    /// Prices CSV (`date`, `symbol`, `open_price`).
    pub prices: Option<PathBuf>,
    /// Sentiment JSON export.
    pub sentiment: Option<PathBuf>,
    /// Generate deterministic synthetic series instead of reading files.
    #[serde(default)]
    pub synthetic: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSettings {
    #[serde(default)]
    pub tickers: Vec<String>,
    /// Analyze every ticker present in both sources.
    #[serde(default)]
    pub all_common: bool,
    /// Run tickers on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            tickers: Vec::new(),
            all_common: false,
            parallel: true,
        }
    }
}

fn default_parallel() -> bool {
    true
}

impl AnalysisConfig {
    /// Minimal config for one window; everything else at defaults.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            window: WindowConfig { start, end },
            analysis: AnalysisSettings::default(),
            sources: SourcesConfig::default(),
            run: RunSettings::default(),
        }
    }

    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file without validating it.
    ///
    /// For callers that complete the config (e.g. ticker selection from
    /// command-line flags) before calling `validate`.
    pub fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges and required selections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.start > self.window.end {
            return Err(ConfigError::InvertedWindow {
                start: self.window.start,
                end: self.window.end,
            });
        }
        if self.analysis.max_lead > MAX_LEAD_LIMIT {
            return Err(ConfigError::MaxLeadOutOfRange(self.analysis.max_lead));
        }
        if !(1..=MAX_HORIZON_LIMIT).contains(&self.analysis.horizon) {
            return Err(ConfigError::HorizonOutOfRange(self.analysis.horizon));
        }
        if self.run.tickers.is_empty() && !self.run.all_common {
            return Err(ConfigError::NoTickers);
        }
        if !self.sources.synthetic {
            if self.sources.prices.is_none() {
                return Err(ConfigError::MissingSource("price"));
            }
            if self.sources.sentiment.is_none() {
                return Err(ConfigError::MissingSource("sentiment"));
            }
        }
        Ok(())
    }

    pub fn date_window(&self) -> DateWindow {
        DateWindow {
            start: self.window.start,
            end: self.window.end,
        }
    }

    /// Core request for one ticker under this config.
    pub fn request(&self, ticker: &str) -> AnalysisRequest {
        AnalysisRequest {
            ticker: ticker.to_string(),
            window: self.date_window(),
            max_lead: self.analysis.max_lead,
            horizon: self.analysis.horizon,
        }
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> RunId {
        // Plain data with string keys: serialization cannot fail
        let json = serde_json::to_vec(self).unwrap_or_default();
        let hash = blake3::hash(&json);
        format!("{}", hash.to_hex())
    }
}
