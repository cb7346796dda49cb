//! Hypothesis tests and confidence intervals.
//!
//! Every test derives its p-value from the left-tail probability `L` of
//! the observed statistic through [`Sidedness::p_value`]:
//!
//! | Alternative | p-value |
//! |---|---|
//! | [`Sidedness::Less`] | `L` |
//! | [`Sidedness::Greater`] | `1 − L` |
//! | [`Sidedness::TwoSided`] | `2 · min(L, 1 − L)` |
//!
//! Tests that accept either raw samples or summary values expose both
//! shapes; the raw variant computes [`Moments`](crate::stats::Moments)
//! once and delegates, so the two agree exactly.
//!
//! # Submodules
//!
//! - [`proportions`]: one- and two-sample z procedures
//! - [`means`]: one- and two-sample t procedures
//! - [`variance`]: variance-ratio F test
//! - [`chi_square`]: goodness of fit and independence
//! - [`anova`]: one-way ANOVA with pairwise follow-up
//! - [`rank`]: Wilcoxon rank-sum and Kruskal–Wallis
//! - [`slope`]: regression slope t procedures

pub mod anova;
pub mod chi_square;
pub mod means;
pub mod proportions;
pub mod rank;
pub mod slope;
pub mod variance;

pub use anova::{one_way_anova, one_way_anova_from_moments, AnovaResult, PairwiseInterval};
pub use chi_square::{
    expected_counts, goodness_of_fit, independence, independence_table, GoodnessOfFitResult,
    IndependenceResult,
};
pub use means::{
    one_sample_t_interval, one_sample_t_interval_from_moments, one_sample_t_test,
    one_sample_t_test_from_moments, two_sample_t_interval, two_sample_t_interval_from_moments,
    two_sample_t_test, two_sample_t_test_from_moments, welch_df,
};
pub use proportions::{
    one_proportion_z_interval, one_proportion_z_test, two_proportion_z_interval,
    two_proportion_z_test,
};
pub use rank::{kruskal_wallis, ranks, wilcoxon_rank_sum, KruskalWallisResult, RankSumResult};
pub use slope::{
    slope_t_interval, slope_t_interval_from_summary, slope_t_test, slope_t_test_from_summary,
    SlopeSummary,
};
pub use variance::{
    variance_ratio_test, variance_ratio_test_from_moments, VarianceRatioOutcome,
    VarianceRatioResult,
};

use crate::distributions::{normal, student_t};
use crate::error::{Result, StatsError};
use crate::tolerance::Tolerance;

/// Direction of the alternative hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sidedness {
    /// Parameter below the null value.
    Less,
    TwoSided,
    /// Parameter above the null value.
    Greater,
}

impl Sidedness {
    /// p-value from the left-tail probability of the observed statistic.
    ///
    /// # Examples
    /// ```
    /// use u_inference::inference::Sidedness;
    /// assert_eq!(Sidedness::Less.p_value(0.03), 0.03);
    /// assert!((Sidedness::Greater.p_value(0.03) - 0.97).abs() < 1e-15);
    /// assert_eq!(Sidedness::TwoSided.p_value(0.03), 0.06);
    /// ```
    pub fn p_value(self, left_tail: f64) -> f64 {
        match self {
            Sidedness::Less => left_tail,
            Sidedness::Greater => 1.0 - left_tail,
            Sidedness::TwoSided => 2.0 * left_tail.min(1.0 - left_tail),
        }
    }
}

/// Outcome of a z or t test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TestResult {
    /// z or t.
    pub statistic: f64,
    pub p_value: f64,
    /// Degrees of freedom; `None` for z tests.
    pub df: Option<f64>,
    /// Point estimate the statistic was built from (mean, proportion,
    /// difference, slope).
    pub estimate: f64,
    pub standard_error: f64,
}

/// Confidence interval `estimate ± critical_value · standard_error`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    pub estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub margin_of_error: f64,
    /// z* or t*.
    pub critical_value: f64,
    pub standard_error: f64,
    /// Degrees of freedom; `None` for z intervals.
    pub df: Option<f64>,
    pub confidence: f64,
}

impl Interval {
    pub(crate) fn new(
        estimate: f64,
        standard_error: f64,
        critical_value: f64,
        df: Option<f64>,
        confidence: f64,
    ) -> Self {
        let margin_of_error = critical_value * standard_error;
        Self {
            estimate,
            lower_bound: estimate - margin_of_error,
            upper_bound: estimate + margin_of_error,
            margin_of_error,
            critical_value,
            standard_error,
            df,
            confidence,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower_bound <= value && value <= self.upper_bound
    }
}

/// z* with central area `confidence`.
pub(crate) fn z_critical(confidence: f64) -> f64 {
    normal::standard_inv(0.5 * (1.0 + confidence))
}

/// t* with central area `confidence` on `df` degrees of freedom.
pub(crate) fn t_critical(confidence: f64, df: f64) -> f64 {
    student_t::inv(0.5 * (1.0 + confidence), df)
}

/// Rejects a test whose standard error is zero or not finite: the
/// statistic would be ±∞ or NaN.
pub(crate) fn usable_standard_error(se: f64, tol: &Tolerance) -> Result<f64> {
    if !se.is_finite() || tol.is_zero(se) {
        return Err(StatsError::DegenerateModel(format!(
            "standard error is {se}; the test statistic is undefined"
        )));
    }
    Ok(se)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidedness_law() {
        for &l in &[0.001, 0.2, 0.5, 0.8, 0.999] {
            let two = Sidedness::TwoSided.p_value(l);
            let less = Sidedness::Less.p_value(l);
            let greater = Sidedness::Greater.p_value(l);
            assert!((two - 2.0 * less.min(greater)).abs() < 1e-15);
            assert!(two <= 1.0);
        }
    }

    #[test]
    fn test_interval_construction() {
        let iv = Interval::new(10.0, 2.0, 1.5, Some(4.0), 0.9);
        assert_eq!(iv.lower_bound, 7.0);
        assert_eq!(iv.upper_bound, 13.0);
        assert_eq!(iv.margin_of_error, 3.0);
        assert!(iv.contains(12.0));
        assert!(!iv.contains(13.5));
    }

    #[test]
    fn test_critical_values() {
        assert!((z_critical(0.95) - 1.959963984540054).abs() < 1e-9);
        assert!((t_critical(0.95, 4.0) - 2.776445105197793).abs() < 1e-9);
    }

    #[test]
    fn test_usable_standard_error() {
        let tol = Tolerance::default();
        assert_eq!(usable_standard_error(0.5, &tol), Ok(0.5));
        assert!(matches!(
            usable_standard_error(0.0, &tol),
            Err(StatsError::DegenerateModel(_))
        ));
        assert!(usable_standard_error(f64::NAN, &tol).is_err());
    }
}
