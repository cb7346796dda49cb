//! Bootstrap and permutation simulators.
//!
//! Each routine runs `trials` independent trials and returns one outcome
//! per trial, in trial order. Inputs are never modified: permutation
//! routines shuffle a private copy. The generator is supplied by the
//! caller, so a seeded [`create_rng`](crate::random::create_rng) makes a
//! run reproducible.
//!
//! | Routine | One trial |
//! |---|---|
//! | [`bootstrap_means`] | mean of `n` draws with replacement |
//! | [`sign_flip_means`] | mean after negating each value with probability ½ |
//! | [`shuffled_mean_differences`] | pool, shuffle, resplit; `x̄₁ − x̄₂` |
//! | [`shuffled_median_differences`] | as above with medians |
//! | [`shuffled_sd_differences`] | as above with SDs, after centering each group on its own mean |
//! | [`permuted_slopes`] | least-squares slope with `y` shuffled against fixed `x` |
//! | [`permuted_correlations`] | Pearson r with `y` shuffled against fixed `x` |
//! | [`binomial_proportions`] | successes / `sample_size` in Bernoulli(`p`) draws |
//! | [`binomial_counts`] | successes in Bernoulli(`p`) draws |

use std::cmp::Ordering;

use rand::Rng;
use tracing::debug;

use crate::error::{require_finite, require_len, Result, StatsError};
use crate::inference::Sidedness;
use crate::random::{bernoulli_count, resample_into, shuffle};
use crate::stats;
use crate::tolerance::Tolerance;

/// Bootstrap distribution of the sample mean.
///
/// # Errors
/// `InvalidInput` for an empty or non-finite sample.
///
/// # Examples
/// ```
/// use u_inference::random::create_rng;
/// use u_inference::resampling::bootstrap_means;
/// let means = bootstrap_means(&[1.0, 2.0, 3.0, 4.0, 5.0], 1000, &mut create_rng(1)).unwrap();
/// assert_eq!(means.len(), 1000);
/// assert!(means.iter().all(|m| (1.0..=5.0).contains(m)));
/// ```
pub fn bootstrap_means<R: Rng + ?Sized>(
    sample: &[f64],
    trials: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    require_len(sample, 1, "sample")?;
    debug!(routine = "bootstrap_means", trials, n = sample.len(), "starting resampling run");
    let mut draw = vec![0.0; sample.len()];
    Ok((0..trials)
        .map(|_| {
            resample_into(sample, &mut draw, rng);
            stats::mean(&draw)
        })
        .collect())
}

/// Null distribution of a mean difference by random sign flips.
///
/// Each value is negated independently with probability ½; the mean of
/// the result is one outcome. Typically applied to paired differences.
pub fn sign_flip_means<R: Rng + ?Sized>(
    sample: &[f64],
    trials: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    require_len(sample, 1, "sample")?;
    debug!(routine = "sign_flip_means", trials, n = sample.len(), "starting resampling run");
    let n = sample.len() as f64;
    Ok((0..trials)
        .map(|_| {
            let total: f64 = sample
                .iter()
                .map(|&x| if rng.random_bool(0.5) { -x } else { x })
                .sum();
            total / n
        })
        .collect())
}

/// Permutation distribution of `mean(group1) − mean(group2)`.
///
/// # Examples
/// ```
/// use u_inference::random::create_rng;
/// use u_inference::resampling::shuffled_mean_differences;
/// let a = [1.0, 2.0, 3.0];
/// let b = [4.0, 5.0];
/// let diffs = shuffled_mean_differences(&a, &b, 500, &mut create_rng(9)).unwrap();
/// assert_eq!(diffs.len(), 500);
/// assert_eq!(a, [1.0, 2.0, 3.0]);
/// ```
pub fn shuffled_mean_differences<R: Rng + ?Sized>(
    group1: &[f64],
    group2: &[f64],
    trials: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    require_len(group1, 1, "first group")?;
    require_len(group2, 1, "second group")?;
    debug!(
        routine = "shuffled_mean_differences",
        trials,
        n1 = group1.len(),
        n2 = group2.len(),
        "starting resampling run"
    );
    Ok(shuffle_and_resplit(group1, group2, trials, rng, stats::mean))
}

/// Permutation distribution of `median(group1) − median(group2)`.
pub fn shuffled_median_differences<R: Rng + ?Sized>(
    group1: &[f64],
    group2: &[f64],
    trials: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    require_len(group1, 1, "first group")?;
    require_len(group2, 1, "second group")?;
    debug!(
        routine = "shuffled_median_differences",
        trials,
        n1 = group1.len(),
        n2 = group2.len(),
        "starting resampling run"
    );
    Ok(shuffle_and_resplit(group1, group2, trials, rng, stats::median))
}

/// Permutation distribution of `sd(group1) − sd(group2)`.
///
/// Each value is first centered on its own group's observed mean, once,
/// so that a shift in location does not masquerade as a spread
/// difference.
///
/// # Errors
/// `InvalidInput` when either group has fewer than two values.
pub fn shuffled_sd_differences<R: Rng + ?Sized>(
    group1: &[f64],
    group2: &[f64],
    trials: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    require_len(group1, 2, "first group")?;
    require_len(group2, 2, "second group")?;
    debug!(
        routine = "shuffled_sd_differences",
        trials,
        n1 = group1.len(),
        n2 = group2.len(),
        "starting resampling run"
    );
    let centered = |g: &[f64]| -> Vec<f64> {
        let m = stats::mean(g);
        g.iter().map(|&x| x - m).collect()
    };
    Ok(shuffle_and_resplit(
        &centered(group1),
        &centered(group2),
        trials,
        rng,
        stats::std_dev,
    ))
}

fn shuffle_and_resplit<R: Rng + ?Sized>(
    group1: &[f64],
    group2: &[f64],
    trials: usize,
    rng: &mut R,
    statistic: impl Fn(&[f64]) -> f64,
) -> Vec<f64> {
    let mut pooled: Vec<f64> = group1.iter().chain(group2).copied().collect();
    let split = group1.len();
    (0..trials)
        .map(|_| {
            shuffle(&mut pooled, rng);
            let (left, right) = pooled.split_at(split);
            statistic(left) - statistic(right)
        })
        .collect()
}

/// Null distribution of the least-squares slope of `y` on `x`, with `y`
/// shuffled against the fixed `x` in each trial.
///
/// # Errors
/// `InvalidInput` for mismatched lengths, fewer than two pairs or
/// non-finite values; `DegenerateModel` when the standard deviation of
/// `x` is zero under `tol`.
pub fn permuted_slopes<R: Rng + ?Sized>(
    x: &[f64],
    y: &[f64],
    trials: usize,
    tol: &Tolerance,
    rng: &mut R,
) -> Result<Vec<f64>> {
    check_pairs(x, y)?;
    if tol.is_zero(stats::std_dev(x)) {
        return Err(StatsError::DegenerateModel(
            "x is constant; the slope is undefined".into(),
        ));
    }
    let var_x = stats::variance(x);
    debug!(routine = "permuted_slopes", trials, n = x.len(), "starting resampling run");
    Ok(permute_response(x, y, trials, rng, |x, y| {
        stats::covariance(x, y) / var_x
    }))
}

/// Null distribution of Pearson's r, with `y` shuffled against the fixed
/// `x` in each trial.
///
/// # Errors
/// As [`permuted_slopes`]; also `DegenerateModel` when `y` is constant
/// under `tol`.
pub fn permuted_correlations<R: Rng + ?Sized>(
    x: &[f64],
    y: &[f64],
    trials: usize,
    tol: &Tolerance,
    rng: &mut R,
) -> Result<Vec<f64>> {
    check_pairs(x, y)?;
    if tol.is_zero(stats::std_dev(x)) || tol.is_zero(stats::std_dev(y)) {
        return Err(StatsError::DegenerateModel(
            "a constant variable has no correlation".into(),
        ));
    }
    debug!(routine = "permuted_correlations", trials, n = x.len(), "starting resampling run");
    Ok(permute_response(x, y, trials, rng, stats::correlation))
}

fn check_pairs(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(StatsError::InvalidInput(format!(
            "{} x values but {} y values",
            x.len(),
            y.len()
        )));
    }
    require_len(x, 2, "x")?;
    require_finite(y, "y")
}

fn permute_response<R: Rng + ?Sized>(
    x: &[f64],
    y: &[f64],
    trials: usize,
    rng: &mut R,
    statistic: impl Fn(&[f64], &[f64]) -> f64,
) -> Vec<f64> {
    let mut shuffled = y.to_vec();
    (0..trials)
        .map(|_| {
            shuffle(&mut shuffled, rng);
            statistic(x, &shuffled)
        })
        .collect()
}

/// Sample proportions from `sample_size` Bernoulli(`p`) draws per trial.
///
/// # Errors
/// `InvalidInput` for `p` outside `[0, 1]` or `sample_size = 0`.
///
/// # Examples
/// ```
/// use u_inference::random::create_rng;
/// use u_inference::resampling::binomial_proportions;
/// let props = binomial_proportions(0.5, 20, 100, &mut create_rng(4)).unwrap();
/// assert!(props.iter().all(|p| (0.0..=1.0).contains(p)));
/// ```
pub fn binomial_proportions<R: Rng + ?Sized>(
    p: f64,
    sample_size: usize,
    trials: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    check_binomial(p, sample_size)?;
    debug!(routine = "binomial_proportions", trials, sample_size, p, "starting resampling run");
    Ok((0..trials)
        .map(|_| bernoulli_count(p, sample_size, rng) as f64 / sample_size as f64)
        .collect())
}

/// Success counts from `sample_size` Bernoulli(`p`) draws per trial.
pub fn binomial_counts<R: Rng + ?Sized>(
    p: f64,
    sample_size: usize,
    trials: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    check_binomial(p, sample_size)?;
    debug!(routine = "binomial_counts", trials, sample_size, p, "starting resampling run");
    Ok((0..trials)
        .map(|_| bernoulli_count(p, sample_size, rng))
        .collect())
}

fn check_binomial(p: f64, sample_size: usize) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(StatsError::InvalidInput(format!(
            "success probability must lie in [0, 1], got {p}"
        )));
    }
    if sample_size == 0 {
        return Err(StatsError::InvalidInput("sample size is zero".into()));
    }
    Ok(())
}

/// Share of simulated outcomes at least as extreme as `observed`.
///
/// Ties under `tol` count as extreme in both directions. Two-sided is
/// `min(1, 2 · min(lower, upper))`.
///
/// # Errors
/// `InvalidInput` when `outcomes` is empty or `observed` is not finite.
///
/// # Examples
/// ```
/// use u_inference::inference::Sidedness;
/// use u_inference::resampling::simulated_p_value;
/// use u_inference::tolerance::Tolerance;
/// let sims = [0.1, 0.4, 0.5, 0.9, 1.2];
/// let tol = Tolerance::default();
/// assert_eq!(simulated_p_value(&sims, 0.9, Sidedness::Greater, &tol).unwrap(), 0.4);
/// assert_eq!(simulated_p_value(&sims, 0.9, Sidedness::Less, &tol).unwrap(), 0.8);
/// assert_eq!(simulated_p_value(&sims, 0.9, Sidedness::TwoSided, &tol).unwrap(), 0.8);
/// ```
pub fn simulated_p_value(
    outcomes: &[f64],
    observed: f64,
    sidedness: Sidedness,
    tol: &Tolerance,
) -> Result<f64> {
    if outcomes.is_empty() {
        return Err(StatsError::InvalidInput("no simulated outcomes".into()));
    }
    if !observed.is_finite() {
        return Err(StatsError::InvalidInput(format!(
            "observed statistic is {observed}"
        )));
    }
    let n = outcomes.len() as f64;
    let share = |keep: fn(Ordering) -> bool| {
        outcomes
            .iter()
            .filter(|&&o| tol.compare(o, observed).is_some_and(keep))
            .count() as f64
            / n
    };
    let lower = || share(|o| o != Ordering::Greater);
    let upper = || share(|o| o != Ordering::Less);
    Ok(match sidedness {
        Sidedness::Less => lower(),
        Sidedness::Greater => upper(),
        Sidedness::TwoSided => (2.0 * lower().min(upper())).min(1.0),
    })
}
