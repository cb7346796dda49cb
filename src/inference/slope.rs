//! t procedures for the slope of a least-squares line.
//!
//! `SE(b) = S / (sₓ √(n − 1))` on `n − 2` degrees of freedom, where `S`
//! is the residual standard error and `sₓ` the sample standard deviation
//! of the explanatory variable.

use super::{t_critical, usable_standard_error, Interval, Sidedness, TestResult};
use crate::distributions::student_t;
use crate::error::{require_confidence, Result, StatsError};
use crate::regression::linear_regression;
use crate::stats;
use crate::tolerance::Tolerance;

/// Summary of a simple linear fit, enough for slope inference.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlopeSummary {
    pub slope: f64,
    /// Residual standard error S of the fit.
    pub residual_se: f64,
    /// Sample standard deviation of x.
    pub sx: f64,
    pub n: usize,
}

impl SlopeSummary {
    /// Fits `y` on `x` and collects the summary.
    ///
    /// # Errors
    /// See [`linear_regression`]; also `InvalidInput` for fewer than three
    /// pairs.
    pub fn from_data(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() < 3 {
            return Err(StatsError::InvalidInput(format!(
                "slope inference needs at least 3 pairs, got {}",
                x.len()
            )));
        }
        let fit = linear_regression(x, y)?;
        Ok(Self {
            slope: fit.slope(),
            residual_se: fit.residual_se,
            sx: stats::std_dev(x),
            n: x.len(),
        })
    }

    /// `S / (sₓ √(n − 1))`.
    pub fn standard_error(&self) -> f64 {
        self.residual_se / (self.sx * ((self.n - 1) as f64).sqrt())
    }

    fn validate(&self) -> Result<()> {
        if self.n < 3 {
            return Err(StatsError::InvalidInput(format!(
                "slope inference needs at least 3 pairs, got {}",
                self.n
            )));
        }
        if !self.slope.is_finite() || !self.residual_se.is_finite() || !self.sx.is_finite() {
            return Err(StatsError::InvalidInput(format!(
                "slope summary has non-finite fields: {:?}",
                self
            )));
        }
        if self.residual_se < 0.0 || self.sx <= 0.0 {
            return Err(StatsError::InvalidInput(format!(
                "slope summary needs S ≥ 0 and sx > 0: {:?}",
                self
            )));
        }
        Ok(())
    }
}

/// t test of `H₀: β = null_slope` from a [`SlopeSummary`].
pub fn slope_t_test_from_summary(
    summary: &SlopeSummary,
    null_slope: f64,
    sidedness: Sidedness,
    tol: &Tolerance,
) -> Result<TestResult> {
    summary.validate()?;
    let se = usable_standard_error(summary.standard_error(), tol)?;
    let df = (summary.n - 2) as f64;
    let t = (summary.slope - null_slope) / se;
    Ok(TestResult {
        statistic: t,
        p_value: sidedness.p_value(student_t::cdf(t, df)),
        df: Some(df),
        estimate: summary.slope,
        standard_error: se,
    })
}

/// t test of `H₀: β = null_slope` on paired data.
///
/// # Examples
/// ```
/// use u_inference::inference::{slope_t_test, Sidedness};
/// use u_inference::tolerance::Tolerance;
/// let x = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let y = [2.0, 4.0, 5.0, 4.0, 5.0];
/// let r = slope_t_test(&x, &y, 0.0, Sidedness::TwoSided, &Tolerance::default()).unwrap();
/// assert_eq!(r.df, Some(3.0));
/// assert!((r.statistic - 2.1213203435596424).abs() < 1e-9);
/// ```
pub fn slope_t_test(
    x: &[f64],
    y: &[f64],
    null_slope: f64,
    sidedness: Sidedness,
    tol: &Tolerance,
) -> Result<TestResult> {
    slope_t_test_from_summary(&SlopeSummary::from_data(x, y)?, null_slope, sidedness, tol)
}

/// `b ± t*·SE(b)` from a [`SlopeSummary`].
pub fn slope_t_interval_from_summary(summary: &SlopeSummary, confidence: f64) -> Result<Interval> {
    require_confidence(confidence)?;
    summary.validate()?;
    let df = (summary.n - 2) as f64;
    Ok(Interval::new(
        summary.slope,
        summary.standard_error(),
        t_critical(confidence, df),
        Some(df),
        confidence,
    ))
}

/// Slope interval on paired data.
pub fn slope_t_interval(x: &[f64], y: &[f64], confidence: f64) -> Result<Interval> {
    slope_t_interval_from_summary(&SlopeSummary::from_data(x, y)?, confidence)
}
