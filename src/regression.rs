//! Least-squares regression by the normal equations.
//!
//! Every model is fitted as `β = (XᵗX)⁻¹ Xᵗy` over a design matrix `X`
//! whose first column is all ones.
//!
//! - **Polynomial**: columns `1, x, x², …, xᵏ`; degree 1 is simple linear
//!   regression.
//! - **Multiple**: an intercept column plus one column per explanatory
//!   variable.
//! - **Exponential**: a degree-1 fit of `ln y` on `x`, reported as
//!   `y = constant · baseˣ`.
//!
//! A design whose `XᵗX` cannot be inverted (linearly dependent columns)
//! is rejected with [`StatsError::DegenerateModel`]; callers can also ask
//! up front with [`is_linearly_independent`].
//!
//! # Conditioning
//!
//! Raw powers of year-sized or larger `x` make `XᵗX` numerically singular
//! long before the columns are actually dependent. Every explanatory column
//! is therefore centered on its mean and divided by its largest absolute
//! deviation before the normal equations are formed. The coefficients are
//! mapped back to the original scale afterwards: an intercept shift for
//! multiple regression, a Taylor shift of the polynomial for polynomial
//! regression.
//!
//! # Goodness of fit
//!
//! ```text
//! R² = SSreg / SStot = Σ(ŷᵢ − ȳ)² / Σ(yᵢ − ȳ)²
//! S  = √(Σ eᵢ² / (n − p))        (0 when n = p)
//! ```
//!
//! where `p` is the number of fitted coefficients. R² is NaN for a constant
//! response, where `SStot = 0`; the coefficients and residuals are still
//! reported.

use tracing::debug;

use crate::error::{require_finite, Result, StatsError};
use crate::matrix::{self, Matrix};
use crate::stats;

/// Fitted polynomial `y = c₀ + c₁x + … + cₖxᵏ`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolynomialFit {
    /// Lowest degree first.
    pub coefficients: Vec<f64>,
    /// `yᵢ − ŷᵢ`, in input order.
    pub residuals: Vec<f64>,
    pub r_squared: f64,
    /// Residual standard error S.
    pub residual_se: f64,
    pub order: usize,
}

impl PolynomialFit {
    /// Evaluates the polynomial at `x` (Horner's scheme).
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }

    /// Intercept `c₀`.
    pub fn intercept(&self) -> f64 {
        self.coefficients[0]
    }

    /// Coefficient of `x`; NaN for an order-0 fit.
    pub fn slope(&self) -> f64 {
        self.coefficients.get(1).copied().unwrap_or(f64::NAN)
    }
}

/// Fitted `y = b₀ + b₁x₁ + … + bₘxₘ`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultipleFit {
    /// Intercept first, then one coefficient per explanatory column.
    pub coefficients: Vec<f64>,
    pub residuals: Vec<f64>,
    pub r_squared: f64,
    pub residual_se: f64,
}

impl MultipleFit {
    /// Predicted response for one observation of the explanatory
    /// variables. NaN when `xs` has the wrong length.
    pub fn evaluate(&self, xs: &[f64]) -> f64 {
        if xs.len() + 1 != self.coefficients.len() {
            return f64::NAN;
        }
        self.coefficients[0]
            + self.coefficients[1..]
                .iter()
                .zip(xs)
                .map(|(&b, &x)| b * x)
                .sum::<f64>()
    }
}

/// Fitted `y = constant · baseˣ`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExponentialFit {
    /// `e^intercept` of the log-space fit.
    pub constant: f64,
    /// `e^slope` of the log-space fit.
    pub base: f64,
    /// `yᵢ − constant · base^xᵢ`, in the original scale.
    pub residuals: Vec<f64>,
    /// R² of the linear fit of `ln y` on `x`.
    pub r_squared: f64,
    /// The underlying fit of `ln y` on `x`.
    pub log_fit: PolynomialFit,
}

impl ExponentialFit {
    pub fn evaluate(&self, x: f64) -> f64 {
        self.constant * self.base.powf(x)
    }
}

/// Least-squares polynomial of the given order.
///
/// # Errors
/// `InvalidInput` for mismatched lengths, a non-finite value, `order = 0`,
/// or fewer than `order + 1` points. `DegenerateModel` when the design is
/// rank deficient (too few distinct `x` values).
///
/// # Examples
/// ```
/// use u_inference::regression::polynomial_regression;
/// let x: Vec<f64> = (0..10).map(f64::from).collect();
/// let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 3.0).collect();
/// let fit = polynomial_regression(&x, &y, 1).unwrap();
/// assert!((fit.coefficients[0] - 3.0).abs() < 1e-10);
/// assert!((fit.coefficients[1] - 2.0).abs() < 1e-10);
/// assert!((fit.r_squared - 1.0).abs() < 1e-12);
/// ```
pub fn polynomial_regression(x: &[f64], y: &[f64], order: usize) -> Result<PolynomialFit> {
    if order == 0 {
        return Err(StatsError::InvalidInput(
            "polynomial order must be at least 1".into(),
        ));
    }
    check_paired(x, y)?;
    require_observations(x.len(), order + 1)?;
    let center = stats::mean(x);
    let scale = spread(x, center).ok_or_else(|| {
        StatsError::DegenerateModel("all x values are equal; no polynomial is identified".into())
    })?;
    let design: Matrix = x
        .iter()
        .map(|&xi| {
            let u = (xi - center) / scale;
            let mut row = Vec::with_capacity(order + 1);
            let mut power = 1.0;
            for _ in 0..=order {
                row.push(power);
                power *= u;
            }
            row
        })
        .collect();
    let (scaled, residuals, r_squared, residual_se) = least_squares(&design, y)?;
    let coefficients = unscale_polynomial(scaled, center, scale);
    Ok(PolynomialFit {
        coefficients,
        residuals,
        r_squared,
        residual_se,
        order,
    })
}

/// Simple linear regression, [`polynomial_regression`] of order 1.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<PolynomialFit> {
    polynomial_regression(x, y, 1)
}

/// Whether an intercept column plus `columns` forms a full-rank design.
///
/// Ragged or empty column sets are reported as dependent.
///
/// # Examples
/// ```
/// use u_inference::regression::is_linearly_independent;
/// let x1 = vec![1.0, 2.0, 3.0, 4.0];
/// assert!(is_linearly_independent(&[x1.clone(), vec![1.0, 0.0, 1.0, 5.0]]));
/// assert!(!is_linearly_independent(&[x1.clone(), x1.iter().map(|v| 2.0 * v).collect()]));
/// ```
pub fn is_linearly_independent(columns: &[Vec<f64>]) -> bool {
    let n = columns.first().map_or(0, Vec::len);
    if n == 0 || columns.iter().any(|c| c.len() != n) {
        return false;
    }
    let Some((design, _)) = standardized_design(columns, n) else {
        return false;
    };
    matrix::multiply(&matrix::transpose(&design), &design)
        .and_then(|gram| matrix::invert(&gram))
        .is_some()
}

/// Multiple linear regression of `y` on `columns` (one slice per
/// explanatory variable) with an intercept.
///
/// # Errors
/// `InvalidInput` for no columns, columns whose length differs from `y`,
/// non-finite values, or fewer observations than coefficients.
/// `DegenerateModel` when the columns are linearly dependent.
pub fn multiple_regression(columns: &[Vec<f64>], y: &[f64]) -> Result<MultipleFit> {
    if columns.is_empty() {
        return Err(StatsError::InvalidInput(
            "no explanatory variables".into(),
        ));
    }
    for (i, c) in columns.iter().enumerate() {
        if c.len() != y.len() {
            return Err(StatsError::InvalidInput(format!(
                "column {i} has {} values but the response has {}",
                c.len(),
                y.len()
            )));
        }
        require_finite(c, "explanatory variable")?;
    }
    require_finite(y, "response")?;
    require_observations(y.len(), columns.len() + 1)?;
    let (design, shifts) = standardized_design(columns, y.len()).ok_or_else(|| {
        StatsError::DegenerateModel(
            "an explanatory column is constant and duplicates the intercept".into(),
        )
    })?;
    let (mut coefficients, residuals, r_squared, residual_se) = least_squares(&design, y)?;
    if let Some((intercept, slopes)) = coefficients.split_first_mut() {
        for (b, &(center, scale)) in slopes.iter_mut().zip(&shifts) {
            *b /= scale;
            *intercept -= *b * center;
        }
    }
    Ok(MultipleFit {
        coefficients,
        residuals,
        r_squared,
        residual_se,
    })
}

/// Exponential model `y = constant · baseˣ` fitted on `ln y`.
///
/// # Errors
/// As [`polynomial_regression`], plus `InvalidInput` for any `y ≤ 0`.
///
/// # Examples
/// ```
/// use u_inference::regression::exponential_regression;
/// let x = [0.0, 1.0, 2.0, 3.0];
/// let y = [3.0, 6.0, 12.0, 24.0];
/// let fit = exponential_regression(&x, &y).unwrap();
/// assert!((fit.constant - 3.0).abs() < 1e-9);
/// assert!((fit.base - 2.0).abs() < 1e-9);
/// ```
pub fn exponential_regression(x: &[f64], y: &[f64]) -> Result<ExponentialFit> {
    check_paired(x, y)?;
    if let Some(v) = y.iter().find(|&&v| v <= 0.0) {
        return Err(StatsError::InvalidInput(format!(
            "exponential regression needs positive responses, got {v}"
        )));
    }
    let log_y: Vec<f64> = y.iter().map(|v| v.ln()).collect();
    let log_fit = linear_regression(x, &log_y)?;
    let constant = log_fit.intercept().exp();
    let base = log_fit.slope().exp();
    let residuals = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| yi - constant * base.powf(xi))
        .collect();
    Ok(ExponentialFit {
        constant,
        base,
        residuals,
        r_squared: log_fit.r_squared,
        log_fit,
    })
}

fn check_paired(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(StatsError::InvalidInput(format!(
            "{} x values but {} y values",
            x.len(),
            y.len()
        )));
    }
    require_finite(x, "x")?;
    require_finite(y, "y")
}

fn require_observations(n: usize, p: usize) -> Result<()> {
    if n < p {
        return Err(StatsError::InvalidInput(format!(
            "{p} coefficients need at least {p} observations, got {n}"
        )));
    }
    Ok(())
}

/// Largest `|vᵢ − center|`, or `None` when it is lost in the rounding of
/// the values themselves.
fn spread(v: &[f64], center: f64) -> Option<f64> {
    let magnitude = v.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
    let spread = v.iter().fold(0.0_f64, |m, x| m.max((x - center).abs()));
    (spread > v.len() as f64 * f64::EPSILON * magnitude).then_some(spread)
}

/// Intercept column plus every column as `(x − center) / scale`, with the
/// `(center, scale)` used for each. `None` when a column is constant.
fn standardized_design(columns: &[Vec<f64>], n: usize) -> Option<(Matrix, Vec<(f64, f64)>)> {
    let shifts = columns
        .iter()
        .map(|c| {
            let center = stats::mean(c);
            spread(c, center).map(|scale| (center, scale))
        })
        .collect::<Option<Vec<_>>>()?;
    let design = (0..n)
        .map(|i| {
            std::iter::once(1.0)
                .chain(
                    columns
                        .iter()
                        .zip(&shifts)
                        .map(|(c, &(center, scale))| (c[i] - center) / scale),
                )
                .collect()
        })
        .collect();
    Some((design, shifts))
}

/// Turns coefficients of `q(u)`, `u = (x − center) / scale`, into
/// coefficients of the same polynomial in `x`.
fn unscale_polynomial(mut coefficients: Vec<f64>, center: f64, scale: f64) -> Vec<f64> {
    let mut divisor = 1.0;
    for c in coefficients.iter_mut() {
        *c /= divisor;
        divisor *= scale;
    }
    // Taylor shift: q(t) with t = x − center
    let degree = coefficients.len() - 1;
    for i in 0..degree {
        for j in (i..degree).rev() {
            let next = coefficients[j + 1];
            coefficients[j] -= center * next;
        }
    }
    coefficients
}

/// Solves the normal equations and derives residuals, R² and S.
fn least_squares(design: &[Vec<f64>], y: &[f64]) -> Result<(Vec<f64>, Vec<f64>, f64, f64)> {
    let n = y.len();
    let p = design.first().map_or(0, Vec::len);
    require_observations(n, p)?;
    let xt = matrix::transpose(design);
    let inverse = matrix::multiply(&xt, design).and_then(|gram| matrix::invert(&gram));
    let Some(inverse) = inverse else {
        debug!(observations = n, coefficients = p, "design matrix is rank deficient");
        return Err(StatsError::DegenerateModel(
            "explanatory columns are linearly dependent".into(),
        ));
    };
    let coefficients = matrix::multiply_vector(&xt, y)
        .and_then(|xty| matrix::multiply_vector(&inverse, &xty))
        .ok_or_else(|| StatsError::InvalidInput("design matrix is not rectangular".into()))?;

    let fitted: Vec<f64> = design
        .iter()
        .map(|row| row.iter().zip(&coefficients).map(|(&a, &b)| a * b).sum())
        .collect();
    let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(&yi, &fi)| yi - fi).collect();

    let y_bar = stats::mean(y);
    let ss_total: f64 = y.iter().map(|&v| (v - y_bar) * (v - y_bar)).sum();
    let ss_regression: f64 = fitted.iter().map(|&v| (v - y_bar) * (v - y_bar)).sum();
    let sse: f64 = residuals.iter().map(|e| e * e).sum();
    let residual_se = if n == p {
        0.0
    } else {
        (sse / (n - p) as f64).sqrt()
    };
    let r_squared = match spread(y, y_bar) {
        Some(_) => ss_regression / ss_total,
        None => {
            debug!(observations = n, "constant response; R² is undefined");
            f64::NAN
        }
    };
    Ok((coefficients, residuals, r_squared, residual_se))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> (Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let y = x.iter().map(|v| 2.0 * v + 3.0).collect();
        (x, y)
    }

    #[test]
    fn test_exact_line() {
        let (x, y) = line();
        let fit = linear_regression(&x, &y).unwrap();
        assert!((fit.intercept() - 3.0).abs() < 1e-10);
        assert!((fit.slope() - 2.0).abs() < 1e-10);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert!(fit.residual_se < 1e-10);
        assert!(fit.residuals.iter().all(|e| e.abs() < 1e-10));
        assert!((fit.evaluate(20.0) - 43.0).abs() < 1e-9);
    }

    #[test]
    fn test_noisy_line_reference() {
        // Sxx = 10, Sxy = 6, SStot = 6, SSE = 2.4
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];
        let fit = linear_regression(&x, &y).unwrap();
        assert!((fit.slope() - 0.6).abs() < 1e-12);
        assert!((fit.intercept() - 2.2).abs() < 1e-12);
        assert!((fit.r_squared - 0.6).abs() < 1e-12);
        assert!((fit.residual_se - (2.4_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!(fit.residuals.iter().sum::<f64>().abs() < 1e-12);
    }

    #[test]
    fn test_quadratic() {
        let x = [-2.0, -1.0, 0.0, 1.0, 2.0, 3.0];
        let y: Vec<f64> = x.iter().map(|v| 1.0 - v + 0.5 * v * v).collect();
        let fit = polynomial_regression(&x, &y, 2).unwrap();
        for (got, want) in fit.coefficients.iter().zip([1.0, -1.0, 0.5]) {
            assert!((got - want).abs() < 1e-10);
        }
        assert_eq!(fit.order, 2);
    }

    #[test]
    fn test_saturated_fit_has_zero_se() {
        let fit = polynomial_regression(&[1.0, 2.0, 4.0], &[3.0, -1.0, 7.0], 2).unwrap();
        assert_eq!(fit.residual_se, 0.0);
    }

    #[test]
    fn test_too_few_points_and_bad_order() {
        assert!(matches!(
            polynomial_regression(&[1.0, 2.0], &[1.0, 2.0], 2),
            Err(StatsError::InvalidInput(_))
        ));
        assert!(polynomial_regression(&[1.0, 2.0], &[1.0, 2.0], 0).is_err());
        assert!(linear_regression(&[1.0, 2.0], &[1.0]).is_err());
        assert!(linear_regression(&[1.0, f64::NAN], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_repeated_x_is_degenerate() {
        let err = linear_regression(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, StatsError::DegenerateModel(_)));
    }

    #[test]
    fn test_quadratic_on_year_scale() {
        let x: Vec<f64> = (2000..2010).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| 0.001 * v * v + v).collect();
        let fit = polynomial_regression(&x, &y, 2).unwrap();
        assert!(fit.coefficients[0].abs() < 1e-4, "{:?}", fit.coefficients);
        assert!((fit.coefficients[1] - 1.0).abs() < 1e-7);
        assert!((fit.coefficients[2] - 0.001).abs() < 1e-10);
        assert!(fit.residuals.iter().all(|e| e.abs() < 1e-8));
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_line_far_from_origin() {
        let x: Vec<f64> = (0..10).map(|i| 100_000.0 + f64::from(i)).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 3.0).collect();
        let fit = linear_regression(&x, &y).unwrap();
        assert!((fit.intercept() - 3.0).abs() < 1e-5, "intercept {}", fit.intercept());
        assert!((fit.slope() - 2.0).abs() < 1e-10);
        assert!((fit.evaluate(100_020.0) - 200_043.0).abs() < 1e-5);
    }

    #[test]
    fn test_constant_response_has_undefined_r_squared() {
        let fit = linear_regression(&[1.0, 2.0, 3.0, 4.0], &[5.0, 5.0, 5.0, 5.0]).unwrap();
        assert!(fit.r_squared.is_nan());
        assert!((fit.intercept() - 5.0).abs() < 1e-12);
        assert!(fit.slope().abs() < 1e-12);
        assert!(fit.residuals.iter().all(|e| e.abs() < 1e-12));
    }

    #[test]
    fn test_multiple_regression_offset_columns() {
        let x1: Vec<f64> = (0..8).map(|i| 50_000.0 + f64::from(i)).collect();
        let x2: Vec<f64> = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0].to_vec();
        let y: Vec<f64> = x1.iter().zip(&x2).map(|(a, b)| 7.0 + 0.5 * a - b).collect();
        let fit = multiple_regression(&[x1, x2], &y).unwrap();
        assert!((fit.coefficients[0] - 7.0).abs() < 1e-6, "{:?}", fit.coefficients);
        assert!((fit.coefficients[1] - 0.5).abs() < 1e-10);
        assert!((fit.coefficients[2] + 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_constant_column_is_degenerate() {
        let columns = [vec![1.0, 2.0, 3.0, 4.0], vec![7.0; 4]];
        assert!(!is_linearly_independent(&columns));
        assert!(matches!(
            multiple_regression(&columns, &[1.0, 3.0, 2.0, 5.0]),
            Err(StatsError::DegenerateModel(_))
        ));
    }

    #[test]
    fn test_multiple_regression_exact() {
        let x1 = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let x2 = vec![2.0, 1.0, 4.0, 3.0, 6.0, 5.0];
        let y: Vec<f64> = x1.iter().zip(&x2).map(|(a, b)| 1.0 + 2.0 * a - 3.0 * b).collect();
        let fit = multiple_regression(&[x1, x2], &y).unwrap();
        for (got, want) in fit.coefficients.iter().zip([1.0, 2.0, -3.0]) {
            assert!((got - want).abs() < 1e-9, "{got} vs {want}");
        }
        assert!((fit.evaluate(&[10.0, 1.0]) - 18.0).abs() < 1e-8);
        assert!(fit.evaluate(&[10.0]).is_nan());
        assert!((fit.r_squared - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_multiple_regression_matches_linear() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];
        let multi = multiple_regression(&[x.clone()], &y).unwrap();
        let simple = linear_regression(&x, &y).unwrap();
        assert!((multi.coefficients[1] - simple.slope()).abs() < 1e-12);
        assert!((multi.residual_se - simple.residual_se).abs() < 1e-12);
    }

    #[test]
    fn test_collinear_rejected() {
        let x1 = vec![1.0, 2.0, 3.0, 4.0];
        let x2: Vec<f64> = x1.iter().map(|v| 2.0 * v).collect();
        let columns = [x1, x2];
        assert!(!is_linearly_independent(&columns));
        assert!(matches!(
            multiple_regression(&columns, &[1.0, 2.0, 3.0, 5.0]),
            Err(StatsError::DegenerateModel(_))
        ));
        assert!(!is_linearly_independent(&[]));
    }

    #[test]
    fn test_exponential_residuals_in_original_scale() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [1.1, 1.9, 4.2, 7.8, 16.5];
        let fit = exponential_regression(&x, &y).unwrap();
        for ((&xi, &yi), &e) in x.iter().zip(&y).zip(&fit.residuals) {
            assert!((e - (yi - fit.evaluate(xi))).abs() < 1e-12);
        }
        assert_eq!(fit.r_squared, fit.log_fit.r_squared);
        assert!(fit.base > 1.8 && fit.base < 2.2);
    }

    #[test]
    fn test_exponential_rejects_non_positive() {
        assert!(exponential_regression(&[0.0, 1.0], &[1.0, 0.0]).is_err());
    }
}
