//! t procedures for means.
//!
//! Each procedure exists in two shapes: from a raw sample and from
//! [`Moments`]. The raw form computes the moments once and calls the
//! moments form, so both return identical numbers for matching inputs.
//!
//! Two-sample procedures never pool variances. `conservative_df` picks the
//! degrees of freedom: `min(n₁ − 1, n₂ − 1)` when true, Welch–Satterthwaite
//! otherwise.

use super::{t_critical, usable_standard_error, Interval, Sidedness, TestResult};
use crate::distributions::student_t;
use crate::error::{require_confidence, require_len, Result, StatsError};
use crate::stats::Moments;
use crate::tolerance::Tolerance;

fn validate(m: &Moments, what: &str) -> Result<()> {
    if m.n < 2 {
        return Err(StatsError::InvalidInput(format!(
            "{what} needs at least 2 observations, got {}",
            m.n
        )));
    }
    if !m.mean.is_finite() || !m.sd.is_finite() || m.sd < 0.0 {
        return Err(StatsError::InvalidInput(format!(
            "{what} has mean {} and standard deviation {}",
            m.mean, m.sd
        )));
    }
    Ok(())
}

fn moments_of(sample: &[f64], what: &str) -> Result<Moments> {
    require_len(sample, 2, what)?;
    Ok(Moments::from_sample(sample))
}

/// Welch–Satterthwaite degrees of freedom:
///
/// ```text
/// (s₁²/n₁ + s₂²/n₂)² / [ (s₁²/n₁)²/(n₁−1) + (s₂²/n₂)²/(n₂−1) ]
/// ```
pub fn welch_df(m1: &Moments, m2: &Moments) -> f64 {
    let v1 = m1.variance_of_mean();
    let v2 = m2.variance_of_mean();
    (v1 + v2).powi(2) / (v1 * v1 / (m1.n - 1) as f64 + v2 * v2 / (m2.n - 1) as f64)
}

fn two_sample_df(m1: &Moments, m2: &Moments, conservative_df: bool) -> f64 {
    if conservative_df {
        (m1.n.min(m2.n) - 1) as f64
    } else {
        welch_df(m1, m2)
    }
}

/// One-sample t test of `H₀: μ = mu0` from summary values.
///
/// SE = s/√n, df = n − 1.
pub fn one_sample_t_test_from_moments(
    m: &Moments,
    mu0: f64,
    sidedness: Sidedness,
    tol: &Tolerance,
) -> Result<TestResult> {
    validate(m, "sample")?;
    let se = usable_standard_error(m.variance_of_mean().sqrt(), tol)?;
    let df = (m.n - 1) as f64;
    let t = (m.mean - mu0) / se;
    Ok(TestResult {
        statistic: t,
        p_value: sidedness.p_value(student_t::cdf(t, df)),
        df: Some(df),
        estimate: m.mean,
        standard_error: se,
    })
}

/// One-sample t test of `H₀: μ = mu0`.
///
/// # Examples
/// ```
/// use u_inference::inference::{one_sample_t_test, Sidedness};
/// use u_inference::tolerance::Tolerance;
/// let r = one_sample_t_test(&[5.0, 7.0, 9.0, 11.0, 13.0], 6.0, Sidedness::Greater,
///     &Tolerance::default()).unwrap();
/// assert_eq!(r.df, Some(4.0));
/// assert!((r.statistic - 3.0 / 2f64.sqrt()).abs() < 1e-12);
/// ```
pub fn one_sample_t_test(
    sample: &[f64],
    mu0: f64,
    sidedness: Sidedness,
    tol: &Tolerance,
) -> Result<TestResult> {
    one_sample_t_test_from_moments(&moments_of(sample, "sample")?, mu0, sidedness, tol)
}

/// One-sample t interval `x̄ ± t*·s/√n` from summary values.
pub fn one_sample_t_interval_from_moments(m: &Moments, confidence: f64) -> Result<Interval> {
    require_confidence(confidence)?;
    validate(m, "sample")?;
    let df = (m.n - 1) as f64;
    Ok(Interval::new(
        m.mean,
        m.variance_of_mean().sqrt(),
        t_critical(confidence, df),
        Some(df),
        confidence,
    ))
}

/// One-sample t interval.
///
/// # Examples
/// ```
/// use u_inference::inference::one_sample_t_interval;
/// let iv = one_sample_t_interval(&[5.0, 7.0, 9.0, 11.0, 13.0], 0.95).unwrap();
/// assert_eq!(iv.df, Some(4.0));
/// assert!((iv.lower_bound - 5.0736).abs() < 1e-4);
/// assert!((iv.upper_bound - 12.9264).abs() < 1e-4);
/// ```
pub fn one_sample_t_interval(sample: &[f64], confidence: f64) -> Result<Interval> {
    one_sample_t_interval_from_moments(&moments_of(sample, "sample")?, confidence)
}

/// Two-sample t test of `H₀: μ₁ − μ₂ = hypothesized_difference` from
/// summary values, unpooled SE `√(s₁²/n₁ + s₂²/n₂)`.
pub fn two_sample_t_test_from_moments(
    m1: &Moments,
    m2: &Moments,
    hypothesized_difference: f64,
    sidedness: Sidedness,
    conservative_df: bool,
    tol: &Tolerance,
) -> Result<TestResult> {
    validate(m1, "first sample")?;
    validate(m2, "second sample")?;
    let se = usable_standard_error((m1.variance_of_mean() + m2.variance_of_mean()).sqrt(), tol)?;
    let df = two_sample_df(m1, m2, conservative_df);
    let diff = m1.mean - m2.mean;
    let t = (diff - hypothesized_difference) / se;
    Ok(TestResult {
        statistic: t,
        p_value: sidedness.p_value(student_t::cdf(t, df)),
        df: Some(df),
        estimate: diff,
        standard_error: se,
    })
}

/// Two-sample t test on raw samples; see
/// [`two_sample_t_test_from_moments`].
pub fn two_sample_t_test(
    sample1: &[f64],
    sample2: &[f64],
    hypothesized_difference: f64,
    sidedness: Sidedness,
    conservative_df: bool,
    tol: &Tolerance,
) -> Result<TestResult> {
    two_sample_t_test_from_moments(
        &moments_of(sample1, "first sample")?,
        &moments_of(sample2, "second sample")?,
        hypothesized_difference,
        sidedness,
        conservative_df,
        tol,
    )
}

/// Two-sample t interval for `μ₁ − μ₂` from summary values.
///
/// # Errors
/// `DegenerateModel` when both groups are constant and the Welch degrees
/// of freedom are undefined. With `conservative_df` the same input gives
/// a zero-width interval.
pub fn two_sample_t_interval_from_moments(
    m1: &Moments,
    m2: &Moments,
    confidence: f64,
    conservative_df: bool,
) -> Result<Interval> {
    require_confidence(confidence)?;
    validate(m1, "first sample")?;
    validate(m2, "second sample")?;
    let df = two_sample_df(m1, m2, conservative_df);
    if !df.is_finite() {
        return Err(StatsError::DegenerateModel(
            "both samples are constant; Welch degrees of freedom are undefined".into(),
        ));
    }
    Ok(Interval::new(
        m1.mean - m2.mean,
        (m1.variance_of_mean() + m2.variance_of_mean()).sqrt(),
        t_critical(confidence, df),
        Some(df),
        confidence,
    ))
}

/// Two-sample t interval on raw samples.
pub fn two_sample_t_interval(
    sample1: &[f64],
    sample2: &[f64],
    confidence: f64,
    conservative_df: bool,
) -> Result<Interval> {
    two_sample_t_interval_from_moments(
        &moments_of(sample1, "first sample")?,
        &moments_of(sample2, "second sample")?,
        confidence,
        conservative_df,
    )
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn two_sample_raw_equals_moments(
            a in proptest::collection::vec(-1e3_f64..1e3, 2..30),
            b in proptest::collection::vec(-1e3_f64..1e3, 2..30),
            conservative in any::<bool>(),
        ) {
            let tol = Tolerance::default();
            let raw = two_sample_t_test(&a, &b, 0.0, Sidedness::TwoSided, conservative, &tol);
            let summary = two_sample_t_test_from_moments(
                &Moments::from_sample(&a),
                &Moments::from_sample(&b),
                0.0,
                Sidedness::TwoSided,
                conservative,
                &tol,
            );
            match (raw, summary) {
                (Ok(r), Ok(s)) => {
                    prop_assert!(tol.eq(r.statistic, s.statistic));
                    prop_assert!(tol.eq(r.p_value, s.p_value));
                }
                (Err(_), Err(_)) => {}
                (r, s) => prop_assert!(false, "shapes disagree: {:?} vs {:?}", r, s),
            }
        }

        #[test]
        fn two_sided_is_twice_smaller_tail(
            a in proptest::collection::vec(-100.0_f64..100.0, 3..20),
            mu0 in -50.0_f64..50.0,
        ) {
            let tol = Tolerance::default();
            let two = one_sample_t_test(&a, mu0, Sidedness::TwoSided, &tol);
            let less = one_sample_t_test(&a, mu0, Sidedness::Less, &tol);
            let greater = one_sample_t_test(&a, mu0, Sidedness::Greater, &tol);
            if let (Ok(two), Ok(less), Ok(greater)) = (two, less, greater) {
                let expected = 2.0 * less.p_value.min(greater.p_value);
                prop_assert!((two.p_value - expected).abs() < 1e-12);
            }
        }
    }
}
