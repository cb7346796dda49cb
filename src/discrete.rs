//! Finite discrete random variables.

use crate::error::{Result, StatsError};
use crate::tolerance::Tolerance;

/// Probabilities must sum to 1 at this many decimal digits.
const PROBABILITY_SUM_DIGITS: u32 = 2;

/// A random variable taking `values[i]` with probability `probabilities[i]`.
///
/// # Examples
/// ```
/// use u_inference::discrete::DiscreteDistribution;
/// let die = DiscreteDistribution::new(
///     vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
///     vec![0.167, 0.167, 0.167, 0.167, 0.166, 0.166],
/// ).unwrap();
/// assert!((die.mean() - 3.49).abs() < 0.01);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscreteDistribution {
    values: Vec<f64>,
    probabilities: Vec<f64>,
}

impl DiscreteDistribution {
    /// Validates and builds the distribution.
    ///
    /// # Errors
    /// `InvalidInput` when the sequences differ in length, are empty,
    /// contain a non-finite or negative probability, or the probabilities
    /// do not sum to 1 at two decimal digits (`0.333 × 3` passes,
    /// `0.33 × 3` does not).
    pub fn new(values: Vec<f64>, probabilities: Vec<f64>) -> Result<Self> {
        if values.len() != probabilities.len() {
            return Err(StatsError::InvalidInput(format!(
                "{} values but {} probabilities",
                values.len(),
                probabilities.len()
            )));
        }
        if values.is_empty() {
            return Err(StatsError::InvalidInput(
                "distribution has no outcomes".into(),
            ));
        }
        crate::error::require_finite(&values, "values")?;
        if let Some(p) = probabilities.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(StatsError::InvalidInput(format!(
                "probability {p} is not a non-negative number"
            )));
        }
        let total: f64 = probabilities.iter().sum();
        if !Tolerance::new(PROBABILITY_SUM_DIGITS).eq(total, 1.0) {
            return Err(StatsError::InvalidInput(format!(
                "probabilities sum to {total}, not 1"
            )));
        }
        Ok(Self {
            values,
            probabilities,
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Expected value `Σ xᵢ pᵢ`.
    pub fn mean(&self) -> f64 {
        self.values
            .iter()
            .zip(&self.probabilities)
            .map(|(&x, &p)| x * p)
            .sum()
    }

    /// `Σ (xᵢ − μ)² pᵢ`.
    pub fn variance(&self) -> f64 {
        let mu = self.mean();
        self.values
            .iter()
            .zip(&self.probabilities)
            .map(|(&x, &p)| (x - mu) * (x - mu) * p)
            .sum()
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moments() {
        let d = DiscreteDistribution::new(vec![0.0, 1.0], vec![0.7, 0.3]).unwrap();
        assert!((d.mean() - 0.3).abs() < 1e-12);
        assert!((d.variance() - 0.21).abs() < 1e-12);
        assert!((d.std_dev() - 0.21_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_lenient_sum() {
        assert!(DiscreteDistribution::new(vec![1.0, 2.0, 3.0], vec![0.333, 0.333, 0.333]).is_ok());
        assert!(DiscreteDistribution::new(vec![1.0, 2.0], vec![0.5, 0.504]).is_ok());
    }

    #[test]
    fn test_rejects_bad_sum() {
        let err = DiscreteDistribution::new(vec![1.0, 2.0], vec![0.5, 0.4]).unwrap_err();
        assert!(matches!(err, StatsError::InvalidInput(_)));
        assert!(DiscreteDistribution::new(vec![1.0, 2.0], vec![0.5, 0.51]).is_err());
        assert!(DiscreteDistribution::new(vec![1.0, 2.0, 3.0], vec![0.33, 0.33, 0.33]).is_err());
    }

    #[test]
    fn test_rejects_negative_probability() {
        assert!(DiscreteDistribution::new(vec![1.0, 2.0, 3.0], vec![1.2, -0.1, -0.1]).is_err());
    }

    #[test]
    fn test_rejects_shape() {
        assert!(DiscreteDistribution::new(vec![1.0], vec![0.5, 0.5]).is_err());
        assert!(DiscreteDistribution::new(vec![], vec![]).is_err());
    }
}
