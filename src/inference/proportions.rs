//! z procedures for proportions.
//!
//! Tests use the standard error implied by the null hypothesis (the null
//! proportion, or the pooled proportion for two samples); intervals use
//! the unpooled standard error from the observed proportions.

use super::{usable_standard_error, z_critical, Interval, Sidedness, TestResult};
use crate::distributions::normal;
use crate::error::{require_confidence, Result, StatsError};
use crate::tolerance::Tolerance;

fn sample_proportion(successes: u64, n: u64, what: &str) -> Result<f64> {
    if n == 0 {
        return Err(StatsError::InvalidInput(format!("{what}: no trials")));
    }
    if successes > n {
        return Err(StatsError::InvalidInput(format!(
            "{what}: {successes} successes out of {n} trials"
        )));
    }
    Ok(successes as f64 / n as f64)
}

/// One-proportion z test of `H₀: p = p0`.
///
/// SE = √(p0(1 − p0)/n).
///
/// # Errors
/// `InvalidInput` for `n = 0`, `successes > n`, or `p0` outside `(0, 1)`.
///
/// # Examples
/// ```
/// use u_inference::inference::{one_proportion_z_test, Sidedness};
/// use u_inference::tolerance::Tolerance;
/// let r = one_proportion_z_test(60, 100, 0.5, Sidedness::Greater, &Tolerance::default()).unwrap();
/// assert!((r.statistic - 2.0).abs() < 1e-12);
/// assert!((r.p_value - 0.02275013194817921).abs() < 1e-10);
/// ```
pub fn one_proportion_z_test(
    successes: u64,
    n: u64,
    p0: f64,
    sidedness: Sidedness,
    tol: &Tolerance,
) -> Result<TestResult> {
    let p_hat = sample_proportion(successes, n, "sample")?;
    if !(p0 > 0.0 && p0 < 1.0) {
        return Err(StatsError::InvalidInput(format!(
            "null proportion must lie in (0, 1), got {p0}"
        )));
    }
    let se = usable_standard_error((p0 * (1.0 - p0) / n as f64).sqrt(), tol)?;
    let z = (p_hat - p0) / se;
    Ok(TestResult {
        statistic: z,
        p_value: sidedness.p_value(normal::standard_cdf(z)),
        df: None,
        estimate: p_hat,
        standard_error: se,
    })
}

/// One-proportion z interval, `p̂ ± z*·√(p̂(1 − p̂)/n)`.
///
/// # Examples
/// ```
/// use u_inference::inference::one_proportion_z_interval;
/// let iv = one_proportion_z_interval(45, 100, 0.95).unwrap();
/// assert!((iv.lower_bound - 0.3524930).abs() < 1e-6);
/// assert!((iv.upper_bound - 0.5475070).abs() < 1e-6);
/// ```
pub fn one_proportion_z_interval(successes: u64, n: u64, confidence: f64) -> Result<Interval> {
    require_confidence(confidence)?;
    let p_hat = sample_proportion(successes, n, "sample")?;
    let se = (p_hat * (1.0 - p_hat) / n as f64).sqrt();
    Ok(Interval::new(p_hat, se, z_critical(confidence), None, confidence))
}

/// Two-proportion z test of `H₀: p₁ = p₂` with the pooled proportion
/// `(x₁ + x₂)/(n₁ + n₂)` in the standard error.
///
/// # Errors
/// `InvalidInput` for an empty group or `successes > n`;
/// `DegenerateModel` when the pooled proportion is 0 or 1.
pub fn two_proportion_z_test(
    successes1: u64,
    n1: u64,
    successes2: u64,
    n2: u64,
    sidedness: Sidedness,
    tol: &Tolerance,
) -> Result<TestResult> {
    let p1 = sample_proportion(successes1, n1, "first sample")?;
    let p2 = sample_proportion(successes2, n2, "second sample")?;
    let pooled = (successes1 + successes2) as f64 / (n1 + n2) as f64;
    let se = usable_standard_error(
        (pooled * (1.0 - pooled) * (1.0 / n1 as f64 + 1.0 / n2 as f64)).sqrt(),
        tol,
    )?;
    let diff = p1 - p2;
    let z = diff / se;
    Ok(TestResult {
        statistic: z,
        p_value: sidedness.p_value(normal::standard_cdf(z)),
        df: None,
        estimate: diff,
        standard_error: se,
    })
}

/// Two-proportion z interval for `p₁ − p₂` with the unpooled standard
/// error `√(p̂₁(1 − p̂₁)/n₁ + p̂₂(1 − p̂₂)/n₂)`.
pub fn two_proportion_z_interval(
    successes1: u64,
    n1: u64,
    successes2: u64,
    n2: u64,
    confidence: f64,
) -> Result<Interval> {
    require_confidence(confidence)?;
    let p1 = sample_proportion(successes1, n1, "first sample")?;
    let p2 = sample_proportion(successes2, n2, "second sample")?;
    let se = (p1 * (1.0 - p1) / n1 as f64 + p2 * (1.0 - p2) / n2 as f64).sqrt();
    Ok(Interval::new(p1 - p2, se, z_critical(confidence), None, confidence))
}
