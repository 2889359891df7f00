//! Sentiment observations and their daily aggregation.
//!
//! The scorer upstream may emit several observations for the same ticker on
//! the same day (one per article batch). The engine works on exactly one
//! point per (ticker, day), so observations are folded with `aggregate_daily`
//! before they reach the aligner.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One raw scored observation, already normalized to a calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentObservation {
    pub date: NaiveDate,
    pub ticker: String,
    pub score: f64,
    pub mentions: Option<u64>,
}

/// Daily sentiment for one ticker: typically in [-1, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPoint {
    pub date: NaiveDate,
    pub ticker: String,
    pub score: f64,
    pub mentions: Option<u64>,
}

impl SentimentPoint {
    pub fn new(ticker: impl Into<String>, date: NaiveDate, score: f64) -> Self {
        Self {
            date,
            ticker: ticker.into(),
            score,
            mentions: None,
        }
    }

    pub fn with_mentions(mut self, mentions: u64) -> Self {
        self.mentions = Some(mentions);
        self
    }
}

/// How same-day observations are folded into one score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Arithmetic mean of the scores.
    #[default]
    Mean,
    /// Mean weighted by mention count; observations without a count weigh 1.
    MentionWeighted,
}

#[derive(Default)]
struct DayAccumulator {
    score_sum: f64,
    count: usize,
    weighted_sum: f64,
    weight_total: f64,
    mentions: Option<u64>,
}

impl DayAccumulator {
    fn push(&mut self, obs: &SentimentObservation) {
        let weight = obs.mentions.unwrap_or(1) as f64;
        self.score_sum += obs.score;
        self.count += 1;
        self.weighted_sum += obs.score * weight;
        self.weight_total += weight;
        if let Some(m) = obs.mentions {
            self.mentions = Some(self.mentions.unwrap_or(0).saturating_add(m));
        }
    }

    fn score(&self, aggregation: Aggregation) -> f64 {
        let mean = self.score_sum / self.count as f64;
        match aggregation {
            Aggregation::Mean => mean,
            Aggregation::MentionWeighted if self.weight_total > 0.0 => {
                self.weighted_sum / self.weight_total
            }
            // Every observation reported zero mentions
            Aggregation::MentionWeighted => mean,
        }
    }
}

/// Fold raw observations into one point per (ticker, day).
///
/// Output is sorted by ticker, then date. Observations with a non-finite
/// score are dropped. Mention counts are summed; the sum is `None` only when
/// no observation of that day carried a count.
pub fn aggregate_daily(
    observations: &[SentimentObservation],
    aggregation: Aggregation,
) -> Vec<SentimentPoint> {
    let mut days: BTreeMap<(&str, NaiveDate), DayAccumulator> = BTreeMap::new();

    for obs in observations.iter().filter(|o| o.score.is_finite()) {
        days.entry((obs.ticker.as_str(), obs.date))
            .or_default()
            .push(obs);
    }

    days.into_iter()
        .map(|((ticker, date), acc)| SentimentPoint {
            date,
            ticker: ticker.to_string(),
            score: acc.score(aggregation),
            mentions: acc.mentions,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(ticker: &str, day: u32, score: f64, mentions: Option<u64>) -> SentimentObservation {
        SentimentObservation {
            date: NaiveDate::from_ymd_opt(2025, 9, day).unwrap(),
            ticker: ticker.into(),
            score,
            mentions,
        }
    }

    #[test]
    fn mean_aggregation_averages_same_day_scores() {
        let input = vec![
            obs("ACA.PA", 17, 0.2, Some(4)),
            obs("ACA.PA", 17, 0.6, Some(1)),
            obs("ACA.PA", 18, -0.1, None),
        ];
        let points = aggregate_daily(&input, Aggregation::Mean);

        assert_eq!(points.len(), 2);
        assert!((points[0].score - 0.4).abs() < 1e-12);
        assert_eq!(points[0].mentions, Some(5));
        assert!((points[1].score + 0.1).abs() < 1e-12);
        assert_eq!(points[1].mentions, None);
    }

    #[test]
    fn mention_weighted_aggregation_weights_by_count() {
        let input = vec![
            obs("ACA.PA", 17, 0.2, Some(4)),
            obs("ACA.PA", 17, 0.6, Some(1)),
        ];
        let points = aggregate_daily(&input, Aggregation::MentionWeighted);

        // (0.2 * 4 + 0.6 * 1) / 5
        assert!((points[0].score - 0.28).abs() < 1e-12);
    }

    #[test]
    fn zero_total_mentions_falls_back_to_mean() {
        let input = vec![
            obs("ACA.PA", 17, 0.2, Some(0)),
            obs("ACA.PA", 17, 0.4, Some(0)),
        ];
        let points = aggregate_daily(&input, Aggregation::MentionWeighted);
        assert!((points[0].score - 0.3).abs() < 1e-12);
        assert_eq!(points[0].mentions, Some(0));
    }

    #[test]
    fn output_is_sorted_by_ticker_then_date() {
        let input = vec![
            obs("BNP.PA", 18, 0.1, None),
            obs("ACA.PA", 18, 0.1, None),
            obs("BNP.PA", 17, 0.1, None),
        ];
        let points = aggregate_daily(&input, Aggregation::Mean);
        let keys: Vec<(String, u32)> = points
            .iter()
            .map(|p| (p.ticker.clone(), chrono::Datelike::day(&p.date)))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("ACA.PA".to_string(), 18),
                ("BNP.PA".to_string(), 17),
                ("BNP.PA".to_string(), 18),
            ]
        );
    }

    #[test]
    fn non_finite_scores_are_dropped() {
        let input = vec![
            obs("ACA.PA", 17, f64::NAN, Some(3)),
            obs("ACA.PA", 17, 0.5, Some(1)),
            obs("ACA.PA", 18, f64::INFINITY, None),
        ];
        let points = aggregate_daily(&input, Aggregation::Mean);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].score, 0.5);
        assert_eq!(points[0].mentions, Some(1));
    }

    #[test]
    fn aggregation_deserializes_from_snake_case() {
        let a: Aggregation = serde_json::from_str("\"mention_weighted\"").unwrap();
        assert_eq!(a, Aggregation::MentionWeighted);
        assert_eq!(Aggregation::default(), Aggregation::Mean);
    }
}
