//! Lead-correlation estimator.
//!
//! For each lead `k` the sentiment change on day `t` is paired with the
//! log-return `k` rows later. Row distance, not calendar distance: the table
//! holds only dates present in both sources.

use serde::{Deserialize, Serialize};

use crate::domain::FeatureTable;
use crate::error::CoreError;
use crate::stats::{correlation_p_value, mean, pearson};

/// Correlation of sentiment change with the return `lead_days` rows ahead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadCorrelation {
    pub lead_days: usize,
    /// `None` when fewer than 2 pairs exist or either side is constant.
    pub correlation: Option<f64>,
    pub pairs: usize,
    pub p_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadCorrelations {
    /// Mean of the defined per-lead coefficients.
    pub mean_correlation: Option<f64>,
    pub per_lead: Vec<LeadCorrelation>,
}

impl LeadCorrelations {
    pub fn defined(&self) -> impl Iterator<Item = &LeadCorrelation> {
        self.per_lead.iter().filter(|l| l.correlation.is_some())
    }

    /// Lead with the largest absolute defined coefficient.
    pub fn strongest(&self) -> Option<&LeadCorrelation> {
        self.defined().max_by(|a, b| {
            let a = a.correlation.map_or(0.0, f64::abs);
            let b = b.correlation.map_or(0.0, f64::abs);
            a.total_cmp(&b)
        })
    }
}

/// Largest lead accepted by `compute_lead_correlations`.
pub const MAX_LEAD_LIMIT: usize = 60;

/// Correlate sentiment changes with future returns for every lead in
/// `0..=max_lead`. Every lead appears in the output, defined or not.
pub fn compute_lead_correlations(
    table: &FeatureTable,
    max_lead: usize,
) -> Result<LeadCorrelations, CoreError> {
    if max_lead > MAX_LEAD_LIMIT {
        return Err(CoreError::MaxLeadOutOfRange(max_lead));
    }
    let per_lead: Vec<LeadCorrelation> = (0..=max_lead)
        .map(|lead| {
            let (xs, ys) = table.lead_pairs(lead);
            let correlation = pearson(&xs, &ys);
            LeadCorrelation {
                lead_days: lead,
                correlation,
                pairs: xs.len(),
                p_value: correlation.and_then(|r| correlation_p_value(r, xs.len())),
            }
        })
        .collect();

    let defined: Vec<f64> = per_lead.iter().filter_map(|l| l.correlation).collect();

    Ok(LeadCorrelations {
        mean_correlation: mean(&defined),
        per_lead,
    })
}

/// Qualitative reading of a mean correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    ModeratePositive,
    SlightPositive,
    Neutral,
    SlightNegative,
    Negative,
}

impl CorrelationStrength {
    pub fn classify(r: f64) -> Self {
        if r > 0.3 {
            CorrelationStrength::ModeratePositive
        } else if r > 0.1 {
            CorrelationStrength::SlightPositive
        } else if r > -0.1 {
            CorrelationStrength::Neutral
        } else if r > -0.3 {
            CorrelationStrength::SlightNegative
        } else {
            CorrelationStrength::Negative
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CorrelationStrength::ModeratePositive => "moderate positive",
            CorrelationStrength::SlightPositive => "slight positive",
            CorrelationStrength::Neutral => "neutral",
            CorrelationStrength::SlightNegative => "slight negative",
            CorrelationStrength::Negative => "negative",
        }
    }
}

impl std::fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
