//! Feature builder: log-returns and first differences of sentiment.
//!
//! Both functions return one slot per input element. Slot 0 is always
//! `None`: the first observation has no predecessor.

use crate::domain::is_usable_price;

/// `ln(p[i] / p[i-1])` for `i >= 1`.
///
/// A transition touching a zero, negative, or non-finite price is `None`,
/// never zero. The bad price removes both the transition into it and the
/// transition out of it.
pub fn log_returns(prices: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return out;
    }
    out.push(None);
    for pair in prices.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        out.push(if is_usable_price(prev) && is_usable_price(cur) {
            Some((cur / prev).ln())
        } else {
            None
        });
    }
    out
}

/// `s[i] - s[i-1]` for `i >= 1`; `None` when either side is non-finite.
pub fn sentiment_deltas(scores: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(scores.len());
    if scores.is_empty() {
        return out;
    }
    out.push(None);
    for pair in scores.windows(2) {
        let delta = pair[1] - pair[0];
        out.push(delta.is_finite().then_some(delta));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_returns_match_reference_scenario() {
        let r = log_returns(&[100.0, 102.0, 101.0, 105.0]);
        assert_eq!(r.len(), 4);
        assert!(r[0].is_none());
        assert!((r[1].unwrap() - 0.0198026).abs() < 1e-6);
        assert!((r[2].unwrap() + 0.0098523).abs() < 1e-6);
        assert!((r[3].unwrap() - 0.0388398).abs() < 1e-6);
    }

    #[test]
    fn non_positive_price_breaks_both_adjacent_transitions() {
        let r = log_returns(&[100.0, 0.0, 101.0, 102.0]);
        assert!(r[1].is_none());
        assert!(r[2].is_none());
        assert!(r[3].is_some());

        let r = log_returns(&[100.0, -5.0, 101.0]);
        assert!(r[1].is_none());
        assert!(r[2].is_none());
    }

    #[test]
    fn nan_price_is_undefined_not_zero() {
        let r = log_returns(&[100.0, f64::NAN, 100.0]);
        assert_eq!(r, vec![None, None, None]);
    }

    #[test]
    fn returns_are_defined_exactly_between_usable_points() {
        use crate::domain::PricePoint;
        use chrono::NaiveDate;

        let opens = [50.0, f64::INFINITY, 51.0, 0.0, -1.0, 52.0, 53.0, f64::NAN, 1e-9];
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let usable: Vec<bool> = opens
            .iter()
            .map(|&o| PricePoint::new("SAN.PA", date, o).is_usable())
            .collect();
        let r = log_returns(&opens);
        for i in 1..opens.len() {
            assert_eq!(r[i].is_some(), usable[i - 1] && usable[i], "transition {i}");
        }
    }

    #[test]
    fn sentiment_deltas_match_reference_scenario() {
        let d = sentiment_deltas(&[0.1, 0.3, 0.2, 0.5]);
        assert!(d[0].is_none());
        assert!((d[1].unwrap() - 0.2).abs() < 1e-12);
        assert!((d[2].unwrap() + 0.1).abs() < 1e-12);
        assert!((d[3].unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn empty_and_single_inputs() {
        assert!(log_returns(&[]).is_empty());
        assert_eq!(log_returns(&[100.0]), vec![None]);
        assert!(sentiment_deltas(&[]).is_empty());
        assert_eq!(sentiment_deltas(&[0.4]), vec![None]);
    }
}
