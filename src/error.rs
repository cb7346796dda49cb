//! Error taxonomy for the computation engine.
//!
//! Only failures that make a result meaningless are reported as errors.
//! A one-sided variance-ratio test pointing against the observed data is
//! an ordinary outcome, see
//! [`VarianceRatioOutcome`](crate::inference::VarianceRatioOutcome).

use thiserror::Error;

/// Errors produced by engine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// Input rejected before computation: empty sample, non-finite value,
    /// sample below the statistical minimum, mismatched lengths, or a
    /// parameter outside its domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The model cannot be fitted or the statistic has no finite value:
    /// collinear regression columns, zero standard error, empty margins.
    #[error("degenerate model: {0}")]
    DegenerateModel(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, StatsError>;

pub(crate) fn require_finite(data: &[f64], what: &str) -> Result<()> {
    if data.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(StatsError::InvalidInput(format!(
            "{what} contains a non-finite value"
        )))
    }
}

pub(crate) fn require_len(data: &[f64], min: usize, what: &str) -> Result<()> {
    if data.len() < min {
        return Err(StatsError::InvalidInput(format!(
            "{what} needs at least {min} observations, got {}",
            data.len()
        )));
    }
    require_finite(data, what)
}

pub(crate) fn require_confidence(confidence: f64) -> Result<()> {
    if confidence > 0.0 && confidence < 1.0 {
        Ok(())
    } else {
        Err(StatsError::InvalidInput(format!(
            "confidence level must lie in (0, 1), got {confidence}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = StatsError::InvalidInput("sample is empty".into());
        assert_eq!(e.to_string(), "invalid input: sample is empty");
        let e = StatsError::DegenerateModel("collinear columns".into());
        assert_eq!(e.to_string(), "degenerate model: collinear columns");
    }

    #[test]
    fn test_require_len() {
        assert!(require_len(&[1.0, 2.0], 2, "sample").is_ok());
        assert!(matches!(
            require_len(&[1.0], 2, "sample"),
            Err(StatsError::InvalidInput(_))
        ));
        assert!(require_len(&[1.0, f64::NAN], 2, "sample").is_err());
    }

    #[test]
    fn test_require_confidence() {
        assert!(require_confidence(0.95).is_ok());
        assert!(require_confidence(0.0).is_err());
        assert!(require_confidence(1.0).is_err());
        assert!(require_confidence(f64::NAN).is_err());
    }
}
