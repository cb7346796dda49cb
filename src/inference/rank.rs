//! Rank-based tests: Wilcoxon rank-sum (normal approximation) and
//! Kruskal–Wallis.
//!
//! Observations are pooled and ranked jointly. Values that are equal under
//! the configured [`Tolerance`] share the average of the ranks they span.
//! Neither test applies a tie or continuity correction.

use super::Sidedness;
use crate::distributions::{chi_square, normal};
use crate::error::{require_len, Result, StatsError};
use crate::tolerance::Tolerance;

/// Outcome of [`wilcoxon_rank_sum`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankSumResult {
    /// Sum of the first sample's ranks, W.
    pub statistic: f64,
    /// `n₁(N + 1)/2`, the mean of W under H₀.
    pub expected: f64,
    /// `(W − E[W]) / √(n₁n₂(N + 1)/12)`.
    pub z: f64,
    pub p_value: f64,
}

/// Outcome of [`kruskal_wallis`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KruskalWallisResult {
    /// H.
    pub statistic: f64,
    /// Groups − 1.
    pub df: f64,
    pub p_value: f64,
    /// Average rank within each group.
    pub mean_ranks: Vec<f64>,
}

/// 1-based mid-ranks of `values`, in input order.
///
/// # Examples
/// ```
/// use u_inference::inference::ranks;
/// use u_inference::tolerance::Tolerance;
/// let r = ranks(&[3.0, 1.0, 2.0, 2.0], &Tolerance::default());
/// assert_eq!(r, vec![4.0, 1.0, 2.5, 2.5]);
/// ```
pub fn ranks(values: &[f64], tol: &Tolerance) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut out = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && tol.eq(values[order[end]], values[order[end - 1]]) {
            end += 1;
        }
        // Positions start..end hold ranks start+1..=end.
        let mid_rank = (start + end + 1) as f64 / 2.0;
        for &i in &order[start..end] {
            out[i] = mid_rank;
        }
        start = end;
    }
    out
}

/// Wilcoxon rank-sum test that the first sample tends to be smaller
/// (`Less`), larger (`Greater`) or different from the second.
///
/// # Errors
/// `InvalidInput` when either sample is empty or holds a non-finite value.
///
/// # Examples
/// ```
/// use u_inference::inference::{wilcoxon_rank_sum, Sidedness};
/// use u_inference::tolerance::Tolerance;
/// let r = wilcoxon_rank_sum(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], Sidedness::Less,
///     &Tolerance::default()).unwrap();
/// assert_eq!(r.statistic, 6.0);
/// assert_eq!(r.expected, 10.5);
/// assert!((r.p_value - 0.0247673).abs() < 1e-6);
/// ```
pub fn wilcoxon_rank_sum(
    sample1: &[f64],
    sample2: &[f64],
    sidedness: Sidedness,
    tol: &Tolerance,
) -> Result<RankSumResult> {
    require_len(sample1, 1, "first sample")?;
    require_len(sample2, 1, "second sample")?;
    let n1 = sample1.len() as f64;
    let n2 = sample2.len() as f64;
    let n = n1 + n2;

    let pooled: Vec<f64> = sample1.iter().chain(sample2).copied().collect();
    let r = ranks(&pooled, tol);
    let statistic: f64 = r[..sample1.len()].iter().sum();
    let expected = n1 * (n + 1.0) / 2.0;
    let z = (statistic - expected) / (n1 * n2 * (n + 1.0) / 12.0).sqrt();
    Ok(RankSumResult {
        statistic,
        expected,
        z,
        p_value: sidedness.p_value(normal::standard_cdf(z)),
    })
}

/// Kruskal–Wallis test that all groups come from the same distribution.
///
/// `H = 12/(N(N+1)) · Σ Rᵢ²/nᵢ − 3(N + 1)`, referred to χ²(k − 1).
///
/// # Errors
/// `InvalidInput` for fewer than two groups, or an empty or non-finite
/// group.
pub fn kruskal_wallis<G: AsRef<[f64]>>(groups: &[G], tol: &Tolerance) -> Result<KruskalWallisResult> {
    let k = groups.len();
    if k < 2 {
        return Err(StatsError::InvalidInput(format!(
            "Kruskal–Wallis needs at least 2 groups, got {k}"
        )));
    }
    let mut pooled = Vec::new();
    for (i, g) in groups.iter().enumerate() {
        let g = g.as_ref();
        require_len(g, 1, &format!("group {i}"))?;
        pooled.extend_from_slice(g);
    }
    let n = pooled.len() as f64;
    let r = ranks(&pooled, tol);

    let mut mean_ranks = Vec::with_capacity(k);
    let mut weighted = 0.0;
    let mut offset = 0;
    for g in groups {
        let size = g.as_ref().len();
        let rank_sum: f64 = r[offset..offset + size].iter().sum();
        weighted += rank_sum * rank_sum / size as f64;
        mean_ranks.push(rank_sum / size as f64);
        offset += size;
    }

    let statistic = 12.0 / (n * (n + 1.0)) * weighted - 3.0 * (n + 1.0);
    let df = (k - 1) as f64;
    Ok(KruskalWallisResult {
        statistic,
        df,
        p_value: chi_square::sf(statistic, df),
        mean_ranks,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn ranks_sum_to_triangular_number(
            values in proptest::collection::vec(-20_i32..20, 0..50),
        ) {
            let values: Vec<f64> = values.into_iter().map(f64::from).collect();
            let r = ranks(&values, &Tolerance::default());
            let n = values.len() as f64;
            prop_assert!((r.iter().sum::<f64>() - n * (n + 1.0) / 2.0).abs() < 1e-9);
        }

        #[test]
        fn kruskal_wallis_two_groups_is_z_squared(
            a in proptest::collection::vec(-1e3_f64..1e3, 1..15),
            b in proptest::collection::vec(-1e3_f64..1e3, 1..15),
        ) {
            let tol = Tolerance::default();
            let h = kruskal_wallis(&[a.clone(), b.clone()], &tol).unwrap().statistic;
            let z = wilcoxon_rank_sum(&a, &b, Sidedness::TwoSided, &tol).unwrap().z;
            prop_assert!((h - z * z).abs() < 1e-8 * (1.0 + h.abs()));
        }
    }
}
