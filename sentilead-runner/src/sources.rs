//! File-backed price and sentiment sources.
//!
//! Prices come from a CSV export with one row per (date, symbol) and sentiment
//! from the JSON export of the scoring pipeline. Both files are read once at
//! construction; `fetch` then only slices the in-memory series.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use sentilead_core::data::{DataError, PriceProvider, SentimentProvider};
use sentilead_core::domain::{
    aggregate_daily, Aggregation, DateWindow, PricePoint, SentimentObservation, SentimentPoint,
};

use crate::config::SourcesConfig;
use crate::synthetic::{SyntheticPrices, SyntheticSentiment, DEFAULT_SYNTHETIC_TICKERS};

const DATE_COLUMNS: &[&str] = &["date"];
const TICKER_COLUMNS: &[&str] = &["symbol", "ticker"];
const OPEN_COLUMNS: &[&str] = &["open_price", "open"];

const TICKER_FIELDS: &[&str] = &["ticker", "symbol"];
const DATE_FIELDS: &[&str] = &["published_date", "date"];
const SCORE_FIELDS: &[&str] = &["sentiment_score_mean", "sentiment_mean", "sentiment", "score"];
const MENTION_FIELDS: &[&str] = &["nb_articles", "mentions"];

/// Tickers of `series` with at least one point inside `window`.
fn tickers_in_window<T>(
    series: &BTreeMap<String, Vec<T>>,
    window: DateWindow,
    date_of: impl Fn(&T) -> NaiveDate,
) -> BTreeSet<String> {
    series
        .iter()
        .filter(|(_, points)| points.iter().any(|p| window.contains(date_of(p))))
        .map(|(ticker, _)| ticker.clone())
        .collect()
}

fn slice_window<T: Clone>(
    points: Option<&Vec<T>>,
    window: DateWindow,
    date_of: impl Fn(&T) -> NaiveDate,
) -> Vec<T> {
    points
        .map(|ps| {
            ps.iter()
                .filter(|p| window.contains(date_of(p)))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// Parse the calendar date of a timestamp-ish string.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 (the wall-clock date is kept, the offset
/// dropped) and `YYYY-MM-DD[T ]HH:MM:SS[.fff]`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local().date());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

// ─── Prices CSV ──────────────────────────────────────────────────────

/// Price source backed by a CSV file with `date`, `symbol`, `open_price`.
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    name: String,
    series: BTreeMap<String, Vec<PricePoint>>,
}

impl CsvPriceSource {
    pub fn from_path(path: &Path) -> Result<Self, DataError> {
        let name = path.display().to_string();
        let file = std::fs::File::open(path)
            .map_err(|e| DataError::unreachable(&name, e.to_string()))?;
        Self::from_reader(&name, file)
    }

    pub fn from_reader<R: Read>(name: &str, reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = rdr
            .headers()
            .map_err(|e| DataError::malformed(name, format!("cannot read header: {e}")))?
            .clone();

        let column = |candidates: &[&str]| {
            headers
                .iter()
                .position(|h| candidates.iter().any(|c| h.eq_ignore_ascii_case(c)))
                .ok_or_else(|| {
                    DataError::malformed(name, format!("missing column '{}'", candidates[0]))
                })
        };
        let date_col = column(DATE_COLUMNS)?;
        let ticker_col = column(TICKER_COLUMNS)?;
        let open_col = column(OPEN_COLUMNS)?;

        let mut series: BTreeMap<String, Vec<PricePoint>> = BTreeMap::new();
        let mut skipped = 0usize;

        for (line, record) in rdr.records().enumerate() {
            let record = record
                .map_err(|e| DataError::malformed(name, format!("row {}: {e}", line + 2)))?;
            let ticker = record.get(ticker_col).unwrap_or("");
            let date = record.get(date_col).and_then(parse_date);
            let open = record
                .get(open_col)
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|v| v.is_finite());

            match (ticker.is_empty(), date, open) {
                (false, Some(date), Some(open)) => {
                    let point = PricePoint::new(ticker, date, open);
                    if !point.is_usable() {
                        debug!(ticker, %date, open, "non-positive open kept; adjacent returns will be undefined");
                    }
                    series.entry(ticker.to_string()).or_default().push(point);
                }
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(source = name, skipped, "skipped price rows with missing ticker, date or finite open");
        }

        for (ticker, points) in series.iter_mut() {
            points.sort_by_key(|p| p.date);
            if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
                return Err(DataError::malformed(
                    name,
                    format!("duplicate price for {ticker} on {}", pair[0].date),
                ));
            }
        }

        Ok(Self {
            name: name.to_string(),
            series,
        })
    }

    pub fn ticker_count(&self) -> usize {
        self.series.len()
    }
}

impl PriceProvider for CsvPriceSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn tickers(&self, window: DateWindow) -> Result<BTreeSet<String>, DataError> {
        Ok(tickers_in_window(&self.series, window, |p| p.date))
    }

    fn fetch(&self, ticker: &str, window: DateWindow) -> Result<Vec<PricePoint>, DataError> {
        Ok(slice_window(self.series.get(ticker), window, |p| p.date))
    }
}

// ─── Sentiment JSON ──────────────────────────────────────────────────

/// Sentiment source backed by the scorer's JSON export.
///
/// Same-day observations are folded with the configured `Aggregation` when
/// the file is loaded.
#[derive(Debug, Clone)]
pub struct JsonSentimentSource {
    name: String,
    series: BTreeMap<String, Vec<SentimentPoint>>,
}

fn first_field<'a>(obj: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn observation(record: &Value) -> Option<SentimentObservation> {
    let obj = record.as_object()?;
    let ticker = first_field(obj, TICKER_FIELDS)?.as_str()?.trim();
    if ticker.is_empty() {
        return None;
    }
    let date = parse_date(first_field(obj, DATE_FIELDS)?.as_str()?)?;
    let score = as_f64(first_field(obj, SCORE_FIELDS)?)?;
    let mentions = first_field(obj, MENTION_FIELDS).and_then(as_u64);
    Some(SentimentObservation {
        date,
        ticker: ticker.to_string(),
        score,
        mentions,
    })
}

impl JsonSentimentSource {
    /// Load a sentiment export. A missing file is an empty source.
    pub fn from_path(path: &Path, aggregation: Aggregation) -> Result<Self, DataError> {
        let name = path.display().to_string();
        if !path.exists() {
            warn!(source = %name, "sentiment file not found; every ticker will be unavailable");
            return Ok(Self {
                name,
                series: BTreeMap::new(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&name, &content, aggregation)
    }

    pub fn from_json_str(
        name: &str,
        content: &str,
        aggregation: Aggregation,
    ) -> Result<Self, DataError> {
        let root: Value = serde_json::from_str(content)
            .map_err(|e| DataError::malformed(name, format!("invalid JSON: {e}")))?;

        let records: Vec<Value> = match root {
            Value::Array(items) => items,
            Value::Object(mut obj) => match obj.remove("data") {
                Some(Value::Array(items)) => items,
                Some(_) => {
                    return Err(DataError::malformed(name, "'data' is not a list"));
                }
                None => vec![Value::Object(obj)],
            },
            _ => {
                return Err(DataError::malformed(
                    name,
                    "expected a list of records or an object",
                ))
            }
        };

        let total = records.len();
        let observations: Vec<SentimentObservation> =
            records.iter().filter_map(observation).collect();
        let skipped = total - observations.len();
        if skipped > 0 {
            warn!(source = name, skipped, total, "skipped sentiment records missing ticker, date or score");
        }

        let mut series: BTreeMap<String, Vec<SentimentPoint>> = BTreeMap::new();
        for point in aggregate_daily(&observations, aggregation) {
            series.entry(point.ticker.clone()).or_default().push(point);
        }

        Ok(Self {
            name: name.to_string(),
            series,
        })
    }

    pub fn ticker_count(&self) -> usize {
        self.series.len()
    }
}

impl SentimentProvider for JsonSentimentSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn tickers(&self, window: DateWindow) -> Result<BTreeSet<String>, DataError> {
        Ok(tickers_in_window(&self.series, window, |p| p.date))
    }

    fn fetch(&self, ticker: &str, window: DateWindow) -> Result<Vec<SentimentPoint>, DataError> {
        Ok(slice_window(self.series.get(ticker), window, |p| p.date))
    }
}

// ─── Source resolution ───────────────────────────────────────────────

/// The pair of providers one run reads from.
pub struct Sources {
    pub prices: Box<dyn PriceProvider>,
    pub sentiment: Box<dyn SentimentProvider>,
    /// True when both series are generated, not read.
    pub synthetic: bool,
}

impl std::fmt::Debug for Sources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sources")
            .field("prices", &self.prices.name())
            .field("sentiment", &self.sentiment.name())
            .field("synthetic", &self.synthetic)
            .finish()
    }
}

/// Open the providers named by a `[sources]` section.
///
/// With `synthetic = true` no file is read; tickers come from `tickers` or a
/// built-in list when empty.
pub fn open_sources(
    config: &SourcesConfig,
    aggregation: Aggregation,
    tickers: &[String],
) -> Result<Sources, DataError> {
    if config.synthetic {
        warn!("generating synthetic data; results will be tagged as synthetic");
        let universe: Vec<String> = if tickers.is_empty() {
            DEFAULT_SYNTHETIC_TICKERS.iter().map(|t| t.to_string()).collect()
        } else {
            tickers.to_vec()
        };
        return Ok(Sources {
            prices: Box::new(SyntheticPrices::new(universe.clone())),
            sentiment: Box::new(SyntheticSentiment::new(universe)),
            synthetic: true,
        });
    }

    let prices_path = config
        .prices
        .as_deref()
        .ok_or_else(|| DataError::unreachable("prices", "no prices file configured"))?;
    let sentiment_path = config
        .sentiment
        .as_deref()
        .ok_or_else(|| DataError::unreachable("sentiment", "no sentiment file configured"))?;

    let prices = CsvPriceSource::from_path(prices_path)?;
    let sentiment = JsonSentimentSource::from_path(sentiment_path, aggregation)?;
    debug!(
        price_tickers = prices.ticker_count(),
        sentiment_tickers = sentiment.ticker_count(),
        "sources loaded"
    );

    Ok(Sources {
        prices: Box::new(prices),
        sentiment: Box::new(sentiment),
        synthetic: false,
    })
}
