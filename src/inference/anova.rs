//! One-way analysis of variance.
//!
//! The omnibus test partitions the total sum of squares into between-group
//! and within-group parts:
//!
//! ```text
//! SSB = Σ nᵢ (x̄ᵢ − x̄)²          dfB = k − 1
//! SSW = Σ (nᵢ − 1) sᵢ²          dfW = N − k
//! F   = (SSB/dfB) / (SSW/dfW)
//! ```
//!
//! Follow-up intervals for each pair of groups use the pooled within-group
//! mean square: `x̄ᵢ − x̄ⱼ ± t*(dfW) · √(MSW (1/nᵢ + 1/nⱼ))`.

use super::{t_critical, Interval};
use crate::distributions::fisher_f;
use crate::error::{require_confidence, require_len, Result, StatsError};
use crate::stats::Moments;
use crate::tolerance::Tolerance;

/// Omnibus ANOVA table plus the group summaries needed for follow-up.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnovaResult {
    /// `MSB / MSW`.
    pub statistic: f64,
    /// Right tail of `F(df_between, df_within)`.
    pub p_value: f64,
    pub df_between: f64,
    pub df_within: f64,
    pub ss_between: f64,
    pub ss_within: f64,
    pub ms_between: f64,
    pub ms_within: f64,
    pub groups: Vec<Moments>,
}

/// Interval for `mean[first] − mean[second]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairwiseInterval {
    pub first: usize,
    pub second: usize,
    pub interval: Interval,
}

impl AnovaResult {
    /// Unprotected intervals for every pair `i < j`, in lexicographic
    /// order.
    pub fn pairwise_intervals(&self, confidence: f64) -> Result<Vec<PairwiseInterval>> {
        require_confidence(confidence)?;
        let t_star = t_critical(confidence, self.df_within);
        let k = self.groups.len();
        let mut out = Vec::with_capacity(k * k.saturating_sub(1) / 2);
        for i in 0..k {
            for j in i + 1..k {
                let (a, b) = (&self.groups[i], &self.groups[j]);
                let se = (self.ms_within * (1.0 / a.n as f64 + 1.0 / b.n as f64)).sqrt();
                out.push(PairwiseInterval {
                    first: i,
                    second: j,
                    interval: Interval::new(
                        a.mean - b.mean,
                        se,
                        t_star,
                        Some(self.df_within),
                        confidence,
                    ),
                });
            }
        }
        Ok(out)
    }

    /// Fisher-protected intervals: `None` unless the omnibus test rejects
    /// at `α = 1 − confidence`.
    ///
    /// # Examples
    /// ```
    /// use u_inference::inference::one_way_anova;
    /// use u_inference::tolerance::Tolerance;
    /// let groups = [vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 8.0, 9.0]];
    /// let r = one_way_anova(&groups, &Tolerance::default()).unwrap();
    /// let pairs = r.protected_pairwise_intervals(0.95).unwrap().unwrap();
    /// assert_eq!(pairs.len(), 3);
    /// assert!(r.protected_pairwise_intervals(0.9999).unwrap().is_none());
    /// ```
    pub fn protected_pairwise_intervals(
        &self,
        confidence: f64,
    ) -> Result<Option<Vec<PairwiseInterval>>> {
        require_confidence(confidence)?;
        if self.p_value < 1.0 - confidence {
            self.pairwise_intervals(confidence).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// One-way ANOVA from per-group summary values.
///
/// A group of size 1 adds nothing to the within-group sum of squares, so
/// its standard deviation is ignored (it may be NaN).
///
/// # Errors
/// `InvalidInput` for fewer than two groups, an empty group, a non-finite
/// moment, or no within-group degrees of freedom (`N = k`).
/// `DegenerateModel` when the within-group mean square is zero.
pub fn one_way_anova_from_moments(groups: &[Moments], tol: &Tolerance) -> Result<AnovaResult> {
    let k = groups.len();
    if k < 2 {
        return Err(StatsError::InvalidInput(format!(
            "ANOVA needs at least 2 groups, got {k}"
        )));
    }
    for (i, g) in groups.iter().enumerate() {
        if g.n == 0 {
            return Err(StatsError::InvalidInput(format!("group {i} is empty")));
        }
        if !g.mean.is_finite() || (g.n > 1 && !(g.sd.is_finite() && g.sd >= 0.0)) {
            return Err(StatsError::InvalidInput(format!(
                "group {i} has mean {} and standard deviation {}",
                g.mean, g.sd
            )));
        }
    }
    let total_n: usize = groups.iter().map(|g| g.n).sum();
    if total_n <= k {
        return Err(StatsError::InvalidInput(
            "no within-group degrees of freedom".into(),
        ));
    }

    let grand_mean = groups.iter().map(|g| g.n as f64 * g.mean).sum::<f64>() / total_n as f64;
    let ss_between: f64 = groups
        .iter()
        .map(|g| g.n as f64 * (g.mean - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .filter(|g| g.n > 1)
        .map(|g| (g.n - 1) as f64 * g.variance())
        .sum();

    let df_between = (k - 1) as f64;
    let df_within = (total_n - k) as f64;
    let ms_between = ss_between / df_between;
    let ms_within = ss_within / df_within;
    if tol.is_zero(ms_within) {
        return Err(StatsError::DegenerateModel(
            "within-group variance is zero; F is undefined".into(),
        ));
    }
    let statistic = ms_between / ms_within;
    Ok(AnovaResult {
        statistic,
        p_value: fisher_f::sf(statistic, df_between, df_within),
        df_between,
        df_within,
        ss_between,
        ss_within,
        ms_between,
        ms_within,
        groups: groups.to_vec(),
    })
}

/// One-way ANOVA on raw groups.
///
/// # Examples
/// ```
/// use u_inference::inference::one_way_anova;
/// use u_inference::tolerance::Tolerance;
/// let groups = [vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 8.0, 9.0]];
/// let r = one_way_anova(&groups, &Tolerance::default()).unwrap();
/// assert!((r.statistic - 27.0).abs() < 1e-10);
/// assert!((r.p_value - 0.001).abs() < 1e-10);
/// ```
pub fn one_way_anova<G: AsRef<[f64]>>(groups: &[G], tol: &Tolerance) -> Result<AnovaResult> {
    let mut moments = Vec::with_capacity(groups.len());
    for (i, g) in groups.iter().enumerate() {
        let g = g.as_ref();
        require_len(g, 1, &format!("group {i}"))?;
        moments.push(Moments::from_sample(g));
    }
    one_way_anova_from_moments(&moments, tol)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separated() -> AnovaResult {
        let groups = [vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 8.0, 9.0]];
        one_way_anova(&groups, &Tolerance::default()).unwrap()
    }

    #[test]
    fn test_sums_of_squares() {
        let r = separated();
        assert!((r.ss_between - 54.0).abs() < 1e-10);
        assert!((r.ss_within - 6.0).abs() < 1e-10);
        assert_eq!((r.df_between, r.df_within), (2.0, 6.0));
        assert!((r.ms_within - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pairwise_without_groups_is_empty() {
        let r = AnovaResult {
            groups: Vec::new(),
            ..separated()
        };
        assert!(r.pairwise_intervals(0.95).unwrap().is_empty());
        let one = AnovaResult {
            groups: separated().groups[..1].to_vec(),
            ..separated()
        };
        assert!(one.pairwise_intervals(0.95).unwrap().is_empty());
    }

    #[test]
    fn test_not_significant() {
        let groups = [
            vec![4.0, 5.0, 6.0, 5.0],
            vec![5.0, 6.0, 7.0, 6.0],
            vec![5.0, 5.0, 6.0, 6.0],
        ];
        let r = one_way_anova(&groups, &Tolerance::default()).unwrap();
        assert!((r.statistic - 1.8).abs() < 1e-10);
        assert!((r.p_value - 0.22000058692433274).abs() < 1e-9);
        assert_eq!(r.protected_pairwise_intervals(0.95).unwrap(), None);
        assert_eq!(r.pairwise_intervals(0.95).unwrap().len(), 3);
    }

    #[test]
    fn test_pairwise_interval_values() {
        let r = separated();
        let pairs = r.pairwise_intervals(0.95).unwrap();
        let p = &pairs[0];
        assert_eq!((p.first, p.second), (0, 1));
        assert!((p.interval.estimate + 3.0).abs() < 1e-12);
        let se = (2.0_f64 / 3.0).sqrt();
        assert!((p.interval.standard_error - se).abs() < 1e-12);
        assert!((p.interval.critical_value - 2.446911851144969).abs() < 1e-8);
        assert_eq!(p.interval.df, Some(6.0));
        assert_eq!((pairs[2].first, pairs[2].second), (1, 2));
    }

    #[test]
    fn test_raw_matches_moments() {
        let groups = [vec![2.5, 3.1, 4.7], vec![5.2, 4.4], vec![6.0, 7.5, 5.9, 6.6]];
        let tol = Tolerance::default();
        let moments: Vec<Moments> = groups.iter().map(|g| Moments::from_sample(g)).collect();
        assert_eq!(
            one_way_anova(&groups, &tol).unwrap(),
            one_way_anova_from_moments(&moments, &tol).unwrap()
        );
    }

    #[test]
    fn test_singleton_group() {
        let groups = [vec![1.0, 3.0], vec![10.0]];
        let r = one_way_anova(&groups, &Tolerance::default()).unwrap();
        assert_eq!(r.df_within, 1.0);
        assert!((r.ss_within - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects() {
        let tol = Tolerance::default();
        assert!(one_way_anova(&[vec![1.0, 2.0]], &tol).is_err());
        assert!(one_way_anova(&[vec![1.0, 2.0], vec![]], &tol).is_err());
        assert!(one_way_anova(&[vec![1.0], vec![2.0]], &tol).is_err());
        assert!(matches!(
            one_way_anova(&[vec![1.0, 1.0], vec![2.0, 2.0]], &tol),
            Err(StatsError::DegenerateModel(_))
        ));
    }
}
