//! Statistics primitives, implemented from first principles:
//! - Lanczos approximation for ln(Gamma)
//! - Regularized incomplete beta function
//! - Student's t-distribution CDF and two-sided p-values
//! - Pearson correlation with explicit degeneracy detection
//! - Single-regressor ordinary least squares with slope inference
//!
//! Every estimator returns `None` instead of a number when the input cannot
//! support it (too few points, zero variance). Callers must never coerce
//! `None` to zero.

use serde::{Deserialize, Serialize};

/// Relative threshold below which a series counts as having zero variance.
///
/// A series is degenerate when its centered sum of squares is at most this
/// fraction of its raw sum of squares. Constant series built from decimal
/// fractions carry rounding noise around 1e-32 relative; real variation is
/// many orders of magnitude above the threshold.
pub const RELATIVE_VARIANCE_EPS: f64 = 1e-12;

// ─── Math primitives ─────────────────────────────────────────────────

/// Lanczos approximation for ln(Gamma(x)), g=7, n=9.
fn ln_gamma(x: f64) -> f64 {
    // Lanczos coefficients for g=7, n=9
    #[allow(clippy::excessive_precision)]
    const COEFFICIENTS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];
    const G: f64 = 7.0;

    if x < 0.5 {
        // Reflection formula: Gamma(x) * Gamma(1-x) = pi / sin(pi*x)
        let log_pi = std::f64::consts::PI.ln();
        let sin_val = (std::f64::consts::PI * x).sin();
        if sin_val.abs() < 1e-300 {
            return f64::INFINITY;
        }
        return log_pi - sin_val.abs().ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut sum = COEFFICIENTS[0];
    for (i, &c) in COEFFICIENTS.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }

    let t = x + G + 0.5;
    let log_sqrt_2pi = (2.0 * std::f64::consts::PI).sqrt().ln();

    log_sqrt_2pi + (t.ln() * (x + 0.5)) - t + sum.ln()
}

/// Regularized incomplete beta function I_x(a, b) via continued fraction.
///
/// Uses the Lentz algorithm for the continued fraction expansion.
fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if !(0.0..=1.0).contains(&x) {
        return f64::NAN;
    }
    if x == 0.0 {
        return 0.0;
    }
    if x == 1.0 {
        return 1.0;
    }

    // Use the symmetry relation when x > (a+1)/(a+b+2) for better convergence
    if x > (a + 1.0) / (a + b + 2.0) {
        return 1.0 - regularized_incomplete_beta(b, a, 1.0 - x);
    }

    // Compute the prefix: x^a * (1-x)^b / (a * B(a,b))
    let ln_prefix = a * x.ln() + b * (1.0 - x).ln() - ln_gamma(a) - ln_gamma(b) + ln_gamma(a + b)
        - a.ln();
    let prefix = ln_prefix.exp();

    // Continued fraction via modified Lentz's algorithm
    let max_iter = 200;
    let epsilon = 1e-14;
    let tiny = 1e-30;

    let mut c = 1.0_f64;
    let mut d = 1.0 - (a + b) * x / (a + 1.0);
    if d.abs() < tiny {
        d = tiny;
    }
    d = 1.0 / d;
    let mut f = d;

    for m in 1..=max_iter {
        let m_f64 = m as f64;

        // Even step: d_{2m}
        let numerator_even =
            m_f64 * (b - m_f64) * x / ((a + 2.0 * m_f64 - 1.0) * (a + 2.0 * m_f64));
        d = 1.0 + numerator_even * d;
        if d.abs() < tiny {
            d = tiny;
        }
        c = 1.0 + numerator_even / c;
        if c.abs() < tiny {
            c = tiny;
        }
        d = 1.0 / d;
        f *= c * d;

        // Odd step: d_{2m+1}
        let numerator_odd = -((a + m_f64) * (a + b + m_f64) * x)
            / ((a + 2.0 * m_f64) * (a + 2.0 * m_f64 + 1.0));
        d = 1.0 + numerator_odd * d;
        if d.abs() < tiny {
            d = tiny;
        }
        c = 1.0 + numerator_odd / c;
        if c.abs() < tiny {
            c = tiny;
        }
        d = 1.0 / d;
        let delta = c * d;
        f *= delta;

        if (delta - 1.0).abs() < epsilon {
            break;
        }
    }

    prefix * f
}

/// Student's t-distribution CDF: P(T <= t) for df degrees of freedom.
pub fn t_cdf(t: f64, df: f64) -> f64 {
    if df <= 0.0 {
        return f64::NAN;
    }
    if t == 0.0 {
        return 0.5;
    }

    let x = df / (df + t * t);
    let ib = regularized_incomplete_beta(df / 2.0, 0.5, x);

    if t > 0.0 {
        1.0 - 0.5 * ib
    } else {
        0.5 * ib
    }
}

/// Two-sided p-value P(|T| >= |t|). `None` for non-finite t or df <= 0.
pub fn two_sided_p_value(t: f64, df: f64) -> Option<f64> {
    if !t.is_finite() || df <= 0.0 {
        return None;
    }
    let p = 2.0 * (1.0 - t_cdf(t.abs(), df));
    Some(p.clamp(0.0, 1.0))
}

// ─── Moments ─────────────────────────────────────────────────────────

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Centered sum of squares around `m`.
fn centered_ss(values: &[f64], m: f64) -> f64 {
    values.iter().map(|&v| (v - m).powi(2)).sum()
}

/// True when `values` has (relative) zero variance.
pub fn is_degenerate(values: &[f64]) -> bool {
    let Some(m) = mean(values) else {
        return true;
    };
    let raw: f64 = values.iter().map(|v| v * v).sum();
    let centered = centered_ss(values, m);
    !centered.is_finite() || centered <= RELATIVE_VARIANCE_EPS * raw
}

// ─── Correlation ─────────────────────────────────────────────────────

/// Sample Pearson correlation between two equal-length series.
///
/// Returns `None` when fewer than 2 pairs exist, the lengths differ, or
/// either series is degenerate.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    if is_degenerate(xs) || is_degenerate(ys) {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;
    let sxx = centered_ss(xs, mx);
    let syy = centered_ss(ys, my);
    let sxy: f64 = xs.iter().zip(ys).map(|(&x, &y)| (x - mx) * (y - my)).sum();

    let r = sxy / (sxx * syy).sqrt();
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Two-sided p-value for H0: rho = 0 given a sample correlation over `n` pairs.
///
/// `None` when `n <= 2` (no residual degrees of freedom) or `|r| == 1`.
pub fn correlation_p_value(r: f64, n: usize) -> Option<f64> {
    if n <= 2 || r.abs() >= 1.0 {
        return None;
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    two_sided_p_value(t, df)
}

// ─── Ordinary least squares ──────────────────────────────────────────

/// Fitted single-regressor model `y = alpha + beta * x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OlsFit {
    pub alpha: f64,
    pub beta: f64,
    /// Undefined when the target has zero variance.
    pub r_squared: Option<f64>,
    pub n_obs: usize,
    /// Slope standard error; undefined with `n_obs <= 2`.
    pub beta_std_err: Option<f64>,
    pub beta_t_stat: Option<f64>,
    pub beta_p_value: Option<f64>,
}

impl OlsFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.alpha + self.beta * x
    }
}

/// Fit `y = alpha + beta * x` by ordinary least squares.
///
/// Returns `None` with fewer than 2 observations, mismatched lengths, or a
/// degenerate regressor.
pub fn ols(xs: &[f64], ys: &[f64]) -> Option<OlsFit> {
    let n = xs.len();
    if n != ys.len() || n < 2 || is_degenerate(xs) {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;
    let sxx = centered_ss(xs, mx);
    let syy = centered_ss(ys, my);
    let sxy: f64 = xs.iter().zip(ys).map(|(&x, &y)| (x - mx) * (y - my)).sum();

    let beta = sxy / sxx;
    let alpha = my - beta * mx;
    if !beta.is_finite() || !alpha.is_finite() {
        return None;
    }

    let sse: f64 = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| (y - alpha - beta * x).powi(2))
        .sum();

    let r_squared = (!is_degenerate(ys)).then(|| (1.0 - sse / syy).clamp(0.0, 1.0));

    let (beta_std_err, beta_t_stat, beta_p_value) = if n > 2 {
        let df = (n - 2) as f64;
        let se = (sse / df / sxx).sqrt();
        if se > 0.0 && se.is_finite() {
            let t = beta / se;
            (Some(se), Some(t), two_sided_p_value(t, df))
        } else {
            (Some(se), None, None)
        }
    } else {
        (None, None, None)
    };

    Some(OlsFit {
        alpha,
        beta,
        r_squared,
        n_obs: n,
        beta_std_err,
        beta_t_stat,
        beta_p_value,
    })
}
