//! Variance-ratio F test.

use crate::distributions::fisher_f;
use crate::error::{require_len, Result, StatsError};
use crate::stats::Moments;
use crate::tolerance::Tolerance;

use super::Sidedness;

/// A computed F test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarianceRatioResult {
    /// `s₁² / s₂²`.
    pub statistic: f64,
    pub p_value: f64,
    pub df_numerator: f64,
    pub df_denominator: f64,
}

/// Outcome of [`variance_ratio_test`].
///
/// A one-sided alternative that the sample standard deviations already
/// contradict yields [`NoSupportForAlternative`] rather than a p-value
/// near 1.
///
/// [`NoSupportForAlternative`]: VarianceRatioOutcome::NoSupportForAlternative
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarianceRatioOutcome {
    Computed(VarianceRatioResult),
    /// The observed ratio points away from the alternative.
    NoSupportForAlternative { statistic: f64 },
}

impl VarianceRatioOutcome {
    /// The computed result, if any.
    pub fn result(&self) -> Option<&VarianceRatioResult> {
        match self {
            VarianceRatioOutcome::Computed(r) => Some(r),
            VarianceRatioOutcome::NoSupportForAlternative { .. } => None,
        }
    }

    pub fn statistic(&self) -> f64 {
        match self {
            VarianceRatioOutcome::Computed(r) => r.statistic,
            VarianceRatioOutcome::NoSupportForAlternative { statistic } => *statistic,
        }
    }
}

/// F test of `H₀: σ₁ = σ₂` from summary values.
///
/// `F = s₁²/s₂²` on `(n₁ − 1, n₂ − 1)` degrees of freedom. For
/// [`Sidedness::Greater`] the test runs only when `s₁ > s₂` under `tol`,
/// for [`Sidedness::Less`] only when `s₁ < s₂`.
///
/// # Errors
/// `InvalidInput` for a group with fewer than 2 observations or a
/// non-finite moment; `DegenerateModel` when `s₂` is zero.
pub fn variance_ratio_test_from_moments(
    m1: &Moments,
    m2: &Moments,
    sidedness: Sidedness,
    tol: &Tolerance,
) -> Result<VarianceRatioOutcome> {
    for (m, what) in [(m1, "first sample"), (m2, "second sample")] {
        if m.n < 2 {
            return Err(StatsError::InvalidInput(format!(
                "{what} needs at least 2 observations, got {}",
                m.n
            )));
        }
        if !m.sd.is_finite() || m.sd < 0.0 {
            return Err(StatsError::InvalidInput(format!(
                "{what} has standard deviation {}",
                m.sd
            )));
        }
    }
    if tol.is_zero(m2.sd) {
        return Err(StatsError::DegenerateModel(
            "second sample has zero variance; the ratio is undefined".into(),
        ));
    }

    let statistic = m1.variance() / m2.variance();
    let supported = match sidedness {
        Sidedness::TwoSided => true,
        Sidedness::Greater => tol.compare(m1.sd, m2.sd) == Some(std::cmp::Ordering::Greater),
        Sidedness::Less => tol.compare(m1.sd, m2.sd) == Some(std::cmp::Ordering::Less),
    };
    if !supported {
        return Ok(VarianceRatioOutcome::NoSupportForAlternative { statistic });
    }

    let df_numerator = (m1.n - 1) as f64;
    let df_denominator = (m2.n - 1) as f64;
    let left_tail = fisher_f::cdf(statistic, df_numerator, df_denominator);
    Ok(VarianceRatioOutcome::Computed(VarianceRatioResult {
        statistic,
        p_value: sidedness.p_value(left_tail),
        df_numerator,
        df_denominator,
    }))
}

/// F test of `H₀: σ₁ = σ₂` on raw samples.
///
/// # Examples
/// ```
/// use u_inference::inference::{variance_ratio_test, Sidedness, VarianceRatioOutcome};
/// use u_inference::tolerance::Tolerance;
/// let tol = Tolerance::default();
/// let wide = [1.0, 9.0, 2.0, 8.0, 5.0];
/// let narrow = [4.0, 5.0, 6.0, 5.0, 5.0];
/// let out = variance_ratio_test(&narrow, &wide, Sidedness::Greater, &tol).unwrap();
/// assert!(matches!(out, VarianceRatioOutcome::NoSupportForAlternative { .. }));
/// let out = variance_ratio_test(&wide, &narrow, Sidedness::Greater, &tol).unwrap();
/// assert!(out.result().unwrap().p_value < 0.01);
/// ```
pub fn variance_ratio_test(
    sample1: &[f64],
    sample2: &[f64],
    sidedness: Sidedness,
    tol: &Tolerance,
) -> Result<VarianceRatioOutcome> {
    require_len(sample1, 2, "first sample")?;
    require_len(sample2, 2, "second sample")?;
    variance_ratio_test_from_moments(
        &Moments::from_sample(sample1),
        &Moments::from_sample(sample2),
        sidedness,
        tol,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_sided_reference() {
        // F = 4 on (10, 10): P(F ≤ 4) = 0.9841287...
        let tol = Tolerance::default();
        let out = variance_ratio_test_from_moments(
            &Moments::new(0.0, 2.0, 11),
            &Moments::new(0.0, 1.0, 11),
            Sidedness::TwoSided,
            &tol,
        )
        .unwrap();
        let r = out.result().unwrap();
        assert_eq!(r.statistic, 4.0);
        assert_eq!((r.df_numerator, r.df_denominator), (10.0, 10.0));
        let upper = fisher_f::sf(4.0, 10.0, 10.0);
        assert!((r.p_value - 2.0 * upper).abs() < 1e-12);
        assert!(r.p_value > 0.02 && r.p_value < 0.05);
    }

    #[test]
    fn test_one_sided_direction() {
        let tol = Tolerance::default();
        let big = Moments::new(0.0, 3.0, 8);
        let small = Moments::new(0.0, 1.0, 12);
        let greater = variance_ratio_test_from_moments(&big, &small, Sidedness::Greater, &tol).unwrap();
        assert!(greater.result().is_some());
        let less = variance_ratio_test_from_moments(&big, &small, Sidedness::Less, &tol).unwrap();
        assert_eq!(less, VarianceRatioOutcome::NoSupportForAlternative { statistic: 9.0 });
        let less = variance_ratio_test_from_moments(&small, &big, Sidedness::Less, &tol).unwrap();
        let r = less.result().unwrap();
        assert!((r.p_value - fisher_f::cdf(1.0 / 9.0, 11.0, 7.0)).abs() < 1e-15);
    }

    #[test]
    fn test_equal_sd_has_no_one_sided_support() {
        let tol = Tolerance::default();
        let m = Moments::new(1.0, 2.0, 5);
        for side in [Sidedness::Less, Sidedness::Greater] {
            let out = variance_ratio_test_from_moments(&m, &m, side, &tol).unwrap();
            assert_eq!(out.statistic(), 1.0);
            assert!(out.result().is_none());
        }
        let out = variance_ratio_test_from_moments(&m, &m, Sidedness::TwoSided, &tol).unwrap();
        assert!((out.result().unwrap().p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_denominator_variance() {
        let tol = Tolerance::default();
        let err = variance_ratio_test(&[1.0, 2.0, 3.0], &[4.0, 4.0], Sidedness::TwoSided, &tol)
            .unwrap_err();
        assert!(matches!(err, StatsError::DegenerateModel(_)));
    }

    #[test]
    fn test_too_small() {
        let tol = Tolerance::default();
        assert!(variance_ratio_test(&[1.0], &[1.0, 2.0], Sidedness::TwoSided, &tol).is_err());
    }
}
