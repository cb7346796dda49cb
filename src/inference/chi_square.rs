//! Chi-square goodness-of-fit and independence tests.

use std::cmp::Ordering;

use tracing::debug;

use crate::distributions::chi_square;
use crate::error::{require_finite, Result, StatsError};
use crate::matrix::Matrix;
use crate::tables::ContingencyTable;
use crate::tolerance::Tolerance;

/// Expected cell count below which the chi-square approximation is
/// considered unreliable.
const MIN_EXPECTED_COUNT: f64 = 5.0;

/// Outcome of [`goodness_of_fit`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GoodnessOfFitResult {
    /// χ² = Σ (obs − exp)²/exp.
    pub statistic: f64,
    /// Categories − 1.
    pub df: f64,
    /// Right tail of χ²(df); NaN when `df = 0`.
    pub p_value: f64,
    /// Per-category terms of the statistic.
    pub contributions: Vec<f64>,
}

/// Outcome of [`independence`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndependenceResult {
    pub statistic: f64,
    /// (rows − 1)(columns − 1).
    pub df: f64,
    pub p_value: f64,
    /// `row_total · column_total / grand_total` per cell.
    pub expected: Matrix,
    /// Some expected count is below 5. The result is still computed.
    pub low_expected_counts: bool,
}

/// Expected counts `total · pᵢ` for a goodness-of-fit test.
///
/// # Errors
/// `InvalidInput` for a non-finite or negative total, or a proportion
/// outside `[0, 1]`.
///
/// # Examples
/// ```
/// use u_inference::inference::expected_counts;
/// assert_eq!(expected_counts(200.0, &[0.5, 0.25, 0.25]).unwrap(), vec![100.0, 50.0, 50.0]);
/// ```
pub fn expected_counts(total: f64, proportions: &[f64]) -> Result<Vec<f64>> {
    if !total.is_finite() || total < 0.0 {
        return Err(StatsError::InvalidInput(format!(
            "total must be a non-negative number, got {total}"
        )));
    }
    if let Some(p) = proportions.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(StatsError::InvalidInput(format!(
            "proportion {p} is outside [0, 1]"
        )));
    }
    Ok(proportions.iter().map(|&p| total * p).collect())
}

/// Chi-square goodness-of-fit test of `observed` counts against
/// `expected` counts.
///
/// A single category is accepted: `df = 0` and the p-value is NaN.
///
/// # Errors
/// `InvalidInput` for mismatched lengths, no categories, non-finite or
/// negative counts. `DegenerateModel` when an expected count is zero
/// under `tol`.
///
/// # Examples
/// ```
/// use u_inference::inference::goodness_of_fit;
/// use u_inference::tolerance::Tolerance;
/// let r = goodness_of_fit(&[18.0, 22.0, 20.0], &[20.0, 20.0, 20.0], &Tolerance::default())
///     .unwrap();
/// assert_eq!(r.df, 2.0);
/// assert!((r.statistic - 0.4).abs() < 1e-12);
/// ```
pub fn goodness_of_fit(
    observed: &[f64],
    expected: &[f64],
    tol: &Tolerance,
) -> Result<GoodnessOfFitResult> {
    if observed.len() != expected.len() {
        return Err(StatsError::InvalidInput(format!(
            "{} observed counts but {} expected counts",
            observed.len(),
            expected.len()
        )));
    }
    if observed.is_empty() {
        return Err(StatsError::InvalidInput("no categories".into()));
    }
    require_non_negative(observed, "observed counts")?;
    require_non_negative(expected, "expected counts")?;
    if expected.iter().any(|&e| tol.is_zero(e)) {
        return Err(StatsError::DegenerateModel(
            "an expected count is zero".into(),
        ));
    }

    let contributions: Vec<f64> = observed
        .iter()
        .zip(expected)
        .map(|(&o, &e)| (o - e) * (o - e) / e)
        .collect();
    let statistic = contributions.iter().sum();
    let df = (observed.len() - 1) as f64;
    Ok(GoodnessOfFitResult {
        statistic,
        df,
        p_value: chi_square::sf(statistic, df),
        contributions,
    })
}

/// Chi-square test of independence on a rectangular count matrix.
///
/// # Errors
/// `InvalidInput` for an empty or ragged matrix or a negative or
/// non-finite count. `DegenerateModel` when a row or column total is zero
/// under `tol`.
///
/// # Examples
/// ```
/// use u_inference::inference::independence;
/// use u_inference::tolerance::Tolerance;
/// let r = independence(&[vec![20.0, 30.0], vec![30.0, 20.0]], &Tolerance::default()).unwrap();
/// assert_eq!(r.df, 1.0);
/// assert!((r.statistic - 4.0).abs() < 1e-12);
/// assert!(!r.low_expected_counts);
/// ```
pub fn independence(observed: &[Vec<f64>], tol: &Tolerance) -> Result<IndependenceResult> {
    let rows = observed.len();
    let cols = observed.first().map_or(0, Vec::len);
    if rows == 0 || cols == 0 {
        return Err(StatsError::InvalidInput("contingency table is empty".into()));
    }
    if observed.iter().any(|row| row.len() != cols) {
        return Err(StatsError::InvalidInput(
            "contingency table rows differ in length".into(),
        ));
    }
    for row in observed {
        require_non_negative(row, "contingency table")?;
    }

    let row_totals: Vec<f64> = observed.iter().map(|row| row.iter().sum()).collect();
    let column_totals: Vec<f64> = (0..cols)
        .map(|j| observed.iter().map(|row| row[j]).sum())
        .collect();
    if row_totals.iter().chain(&column_totals).any(|&t| tol.is_zero(t)) {
        return Err(StatsError::DegenerateModel(
            "a row or column total is zero".into(),
        ));
    }
    let grand_total: f64 = row_totals.iter().sum();

    let expected: Matrix = row_totals
        .iter()
        .map(|&r| column_totals.iter().map(|&c| r * c / grand_total).collect())
        .collect();

    let mut statistic = 0.0;
    let mut low_expected_counts = false;
    for (obs_row, exp_row) in observed.iter().zip(&expected) {
        for (&o, &e) in obs_row.iter().zip(exp_row) {
            statistic += (o - e) * (o - e) / e;
            if tol.compare(e, MIN_EXPECTED_COUNT) == Some(Ordering::Less) {
                low_expected_counts = true;
            }
        }
    }
    if low_expected_counts {
        debug!(rows, cols, "independence test has expected counts below 5");
    }

    let df = ((rows - 1) * (cols - 1)) as f64;
    Ok(IndependenceResult {
        statistic,
        df,
        p_value: chi_square::sf(statistic, df),
        expected,
        low_expected_counts,
    })
}

/// [`independence`] on a [`ContingencyTable`].
pub fn independence_table(table: &ContingencyTable, tol: &Tolerance) -> Result<IndependenceResult> {
    independence(table.counts(), tol)
}

fn require_non_negative(counts: &[f64], what: &str) -> Result<()> {
    require_finite(counts, what)?;
    match counts.iter().find(|&&c| c < 0.0) {
        Some(c) => Err(StatsError::InvalidInput(format!("{what} has negative value {c}"))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goodness_of_fit_reference() {
        // Die rolled 60 times.
        let observed = [5.0, 8.0, 9.0, 8.0, 10.0, 20.0];
        let expected = expected_counts(60.0, &[1.0 / 6.0; 6]).unwrap();
        let r = goodness_of_fit(&observed, &expected, &Tolerance::default()).unwrap();
        assert!((r.statistic - 13.4).abs() < 1e-9);
        assert_eq!(r.df, 5.0);
        assert!((r.p_value - 0.019905220334774376).abs() < 1e-9);
        assert_eq!(r.contributions.len(), 6);
    }

    #[test]
    fn test_single_category_does_not_fail() {
        let r = goodness_of_fit(&[12.0], &[12.0], &Tolerance::default()).unwrap();
        assert_eq!(r.df, 0.0);
        assert_eq!(r.statistic, 0.0);
        assert!(r.p_value.is_nan());
    }

    #[test]
    fn test_goodness_of_fit_rejects() {
        let tol = Tolerance::default();
        assert!(goodness_of_fit(&[1.0, 2.0], &[1.0], &tol).is_err());
        assert!(goodness_of_fit(&[], &[], &tol).is_err());
        assert!(goodness_of_fit(&[-1.0, 2.0], &[1.0, 1.0], &tol).is_err());
        assert!(matches!(
            goodness_of_fit(&[1.0, 2.0], &[0.0, 3.0], &tol),
            Err(StatsError::DegenerateModel(_))
        ));
        assert!(matches!(
            goodness_of_fit(&[1.0, 2.0], &[1e-14, 3.0], &tol),
            Err(StatsError::DegenerateModel(_))
        ));
        assert!(expected_counts(10.0, &[0.5, 1.5]).is_err());
    }

    #[test]
    fn test_independence_reference() {
        let tol = Tolerance::default();
        let observed = vec![vec![10.0, 20.0, 30.0], vec![20.0, 20.0, 20.0]];
        let r = independence(&observed, &tol).unwrap();
        assert_eq!(r.expected, vec![vec![15.0, 20.0, 25.0], vec![15.0, 20.0, 25.0]]);
        assert_eq!(r.df, 2.0);
        let stat = 2.0 * 25.0 / 15.0 + 2.0 * 25.0 / 25.0;
        assert!((r.statistic - stat).abs() < 1e-12);
        assert!((r.p_value - chi_square::sf(stat, 2.0)).abs() < 1e-15);
        assert!(!r.low_expected_counts);
    }

    #[test]
    fn test_low_expected_flag() {
        let tol = Tolerance::default();
        let r = independence(&[vec![1.0, 5.0], vec![4.0, 10.0]], &tol).unwrap();
        assert!(r.low_expected_counts);
        assert!(r.p_value.is_finite());
    }

    #[test]
    fn test_expected_exactly_five_is_not_low() {
        let tol = Tolerance::default();
        let r = independence(&[vec![5.0, 5.0], vec![5.0, 5.0]], &tol).unwrap();
        assert!(!r.low_expected_counts);
        assert_eq!(r.statistic, 0.0);
    }

    #[test]
    fn test_independence_degenerate() {
        let tol = Tolerance::default();
        assert!(matches!(
            independence(&[vec![0.0, 0.0], vec![3.0, 4.0]], &tol),
            Err(StatsError::DegenerateModel(_))
        ));
        assert!(matches!(
            independence(&[vec![1.0, 2.0], vec![3.0]], &tol),
            Err(StatsError::InvalidInput(_))
        ));
        assert!(independence(&[], &tol).is_err());
        assert!(matches!(
            independence(&[vec![1e-12, 1e-13], vec![3.0, 4.0]], &tol),
            Err(StatsError::DegenerateModel(_))
        ));
    }

    #[test]
    fn test_independence_from_table() {
        let tol = Tolerance::default();
        let mut t = ContingencyTable::new();
        t.add("a", "x", 20.0);
        t.add("a", "y", 30.0);
        t.add("b", "x", 30.0);
        t.add("b", "y", 20.0);
        let r = independence_table(&t, &tol).unwrap();
        assert!((r.statistic - 4.0).abs() < 1e-12);
    }
}
