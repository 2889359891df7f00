//! Per-horizon forecaster.
//!
//! One independent single-factor OLS model per horizon `h`:
//! `log_return[t+h] = alpha + beta * sentiment_delta[t]`, evaluated at the
//! most recent sentiment change. Models are never chained across horizons.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::FeatureTable;
use crate::error::CoreError;
use crate::price_path::reconstruct_price_path;
use crate::stats::{ols, OlsFit};

/// Forecast for one horizon. `None` values mark an undefined horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonForecast {
    pub horizon: usize,
    pub predicted_return: Option<f64>,
    pub predicted_price: Option<f64>,
    pub model: Option<OlsFit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub last_date: NaiveDate,
    /// Open price of the last feature row; anchors the price path.
    pub last_price: f64,
    pub last_sentiment_delta: f64,
    pub per_horizon: Vec<HorizonForecast>,
}

impl Forecast {
    /// Number of horizons with a defined prediction.
    pub fn defined_horizons(&self) -> usize {
        self.per_horizon
            .iter()
            .filter(|h| h.predicted_return.is_some())
            .count()
    }
}

/// Largest horizon accepted by `forecast`.
pub const MAX_HORIZON_LIMIT: usize = 60;

/// Fit one model per horizon in `1..=horizon` and predict from the last row.
pub fn forecast(table: &FeatureTable, horizon: usize) -> Result<Forecast, CoreError> {
    if !(1..=MAX_HORIZON_LIMIT).contains(&horizon) {
        return Err(CoreError::HorizonOutOfRange(horizon));
    }
    let last = table.last().ok_or_else(|| CoreError::EmptyFeatureTable {
        ticker: table.ticker.clone(),
    })?;

    let models: Vec<Option<OlsFit>> = (1..=horizon)
        .map(|h| {
            let (xs, ys) = table.lead_pairs(h);
            ols(&xs, &ys)
        })
        .collect();

    let returns: Vec<Option<f64>> = models
        .iter()
        .map(|m| {
            m.as_ref()
                .map(|fit| fit.predict(last.sentiment_delta))
                .filter(|r| r.is_finite())
        })
        .collect();
    let prices = reconstruct_price_path(last.open, &returns);

    let per_horizon = models
        .into_iter()
        .zip(returns)
        .zip(prices)
        .enumerate()
        .map(|(i, ((model, predicted_return), predicted_price))| HorizonForecast {
            horizon: i + 1,
            predicted_return,
            predicted_price,
            model,
        })
        .collect();

    Ok(Forecast {
        last_date: last.date,
        last_price: last.open,
        last_sentiment_delta: last.sentiment_delta,
        per_horizon,
    })
}
