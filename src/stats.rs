//! Descriptive statistics.
//!
//! Unlike the inference layer, nothing here rejects input: an empty sample
//! yields NaN, which is what the summary record reports for it.
//!
//! # Algorithms
//!
//! - **Mean**: Neumaier compensated summation.
//! - **Variance/StdDev**: two-pass, squared deviations from the
//!   compensated mean, `n − 1` denominator.
//! - **Quartiles**: split-at-midpoint. Sort; `h = ⌊n/2⌋`; Q1 is the median
//!   of the first `h` values and Q3 the median of the last `h`. For odd
//!   `n` the middle value belongs to neither half.

use std::cmp::Ordering;

/// Five-number summary plus mean and standard deviation of a sample.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SummaryStatistics {
    pub n: usize,
    pub mean: f64,
    /// Sample standard deviation (`n − 1` denominator).
    pub sd: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// `[q1, median, q3]`.
    pub quartiles: [f64; 3],
}

/// Computes the summary record of a sample.
///
/// The input is not modified; quartiles are taken from a sorted copy.
/// An empty sample produces `n = 0` and NaN in every other field. A
/// single observation has empty halves, so Q1 and Q3 fall back to the
/// observation itself.
///
/// # Examples
/// ```
/// use u_inference::stats::one_variable_statistics;
/// let s = one_variable_statistics(&[7.0, 1.0, 3.0, 5.0, 9.0]);
/// assert_eq!(s.median, 5.0);
/// assert_eq!(s.q1, 2.0); // median of [1, 3]
/// assert_eq!(s.q3, 8.0); // median of [7, 9]
/// ```
pub fn one_variable_statistics(sample: &[f64]) -> SummaryStatistics {
    let n = sample.len();
    let sorted = sorted_copy(sample);
    let h = n / 2;
    let median = median_sorted(&sorted);
    let (q1, q3) = if n == 1 {
        (median, median)
    } else {
        (median_sorted(&sorted[..h]), median_sorted(&sorted[n - h..]))
    };
    SummaryStatistics {
        n,
        mean: mean(sample),
        sd: std_dev(sample),
        min: sorted.first().copied().unwrap_or(f64::NAN),
        q1,
        median,
        q3,
        max: sorted.last().copied().unwrap_or(f64::NAN),
        quartiles: [q1, median, q3],
    }
}

/// Mean, standard deviation and size of a sample.
///
/// Tests that accept either raw data or summary values take this record;
/// the raw-data variants compute it once and delegate, so both call shapes
/// agree exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Moments {
    pub mean: f64,
    pub sd: f64,
    pub n: usize,
}

impl Moments {
    pub fn new(mean: f64, sd: f64, n: usize) -> Self {
        Self { mean, sd, n }
    }

    pub fn from_sample(sample: &[f64]) -> Self {
        Self {
            mean: mean(sample),
            sd: std_dev(sample),
            n: sample.len(),
        }
    }

    pub fn variance(&self) -> f64 {
        self.sd * self.sd
    }

    /// Squared standard error of the mean, `s² / n`.
    pub fn variance_of_mean(&self) -> f64 {
        self.variance() / self.n as f64
    }
}

/// Arithmetic mean; NaN for an empty sample.
///
/// # Examples
/// ```
/// use u_inference::stats::mean;
/// assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
/// assert!(mean(&[]).is_nan());
/// ```
pub fn mean(data: &[f64]) -> f64 {
    kahan_sum(data) / data.len() as f64
}

/// Sample variance (`n − 1` denominator); NaN for fewer than two values.
pub fn variance(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return f64::NAN;
    }
    sum_of_squares(data) / (n - 1) as f64
}

/// Sample standard deviation.
///
/// # Examples
/// ```
/// use u_inference::stats::std_dev;
/// let sd = std_dev(&[5.0, 7.0, 9.0, 11.0, 13.0]);
/// assert!((sd - 10f64.sqrt()).abs() < 1e-12);
/// ```
pub fn std_dev(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Sum of squared deviations from the mean, `Σ(xᵢ − x̄)²`.
pub fn sum_of_squares(data: &[f64]) -> f64 {
    let m = mean(data);
    data.iter().map(|&x| (x - m) * (x - m)).sum()
}

pub fn min(data: &[f64]) -> f64 {
    data.iter().copied().reduce(f64::min).unwrap_or(f64::NAN)
}

pub fn max(data: &[f64]) -> f64 {
    data.iter().copied().reduce(f64::max).unwrap_or(f64::NAN)
}

/// Median of an unsorted sample (sorted copy, input untouched).
///
/// # Examples
/// ```
/// use u_inference::stats::median;
/// assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
/// ```
pub fn median(data: &[f64]) -> f64 {
    median_sorted(&sorted_copy(data))
}

/// Median of data already in non-decreasing order; NaN when empty.
pub fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        f64::NAN
    } else if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Sample covariance (`n − 1` denominator); NaN on length mismatch or
/// fewer than two pairs.
pub fn covariance(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n != y.len() || n < 2 {
        return f64::NAN;
    }
    let mean_x = mean(x);
    let mean_y = mean(y);
    let sum: f64 = x
        .iter()
        .zip(y)
        .map(|(&a, &b)| (a - mean_x) * (b - mean_y))
        .sum();
    sum / (n - 1) as f64
}

/// Pearson correlation coefficient.
///
/// # Examples
/// ```
/// use u_inference::stats::correlation;
/// let x = [1.0, 2.0, 3.0, 4.0];
/// let y = [8.0, 6.0, 4.0, 2.0];
/// assert!((correlation(&x, &y) + 1.0).abs() < 1e-12);
/// ```
pub fn correlation(x: &[f64], y: &[f64]) -> f64 {
    covariance(x, y) / (std_dev(x) * std_dev(y))
}

/// Neumaier compensated summation.
///
/// Keeps a running compensation term so the total error stays O(ε)
/// regardless of length, including when an addend dwarfs the running sum.
///
/// Reference: Neumaier (1974), *ZAMM* 54(1), pp. 39–51.
pub fn kahan_sum(data: &[f64]) -> f64 {
    let mut sum = 0.0_f64;
    let mut c = 0.0_f64;
    for &x in data {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            c += (sum - t) + x;
        } else {
            c += (x - t) + sum;
        }
        sum = t;
    }
    sum + c
}

pub(crate) fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}
