//! Price-path reconstruction from a sequence of predicted log-returns.

/// Compound `p0` forward through `returns`: `price_h = p0 * exp(r_1 + ... + r_h)`.
///
/// The chain breaks at the first undefined return: every later price is
/// undefined too.
pub fn reconstruct_price_path(p0: f64, returns: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut cumulative = Some(0.0_f64);
    returns
        .iter()
        .map(|r| {
            cumulative = match (cumulative, r) {
                (Some(acc), Some(r)) => Some(acc + r),
                _ => None,
            };
            cumulative
                .map(|acc| p0 * acc.exp())
                .filter(|p| p.is_finite())
        })
        .collect()
}
