//! Tolerance-aware floating-point comparison and significant-digit rounding.
//!
//! Repeated arithmetic leaves rounding noise in the last few bits of a
//! result, so two quantities that are mathematically equal (two medians,
//! a sum of probabilities and 1) rarely compare equal bit for bit. Every
//! comparison in this crate goes through a [`Tolerance`], which treats two
//! values as equal when their difference rounds to zero at a configured
//! number of decimal digits.
//!
//! The significant-digit helpers work on the decimal scientific-notation
//! representation of a value rather than on `log10`, which avoids edge
//! effects exactly at powers of ten (`log10(1000.0)` is not guaranteed to
//! floor to 3 on every platform; the formatted exponent is).

use std::cmp::Ordering;

/// Precision used when formatting a value to read off its exponent or
/// leading digits. 15 significant digits absorbs binary representation
/// noise (`0.3` is `2.9999999999999999e-1` at 17 digits).
const FORMAT_PRECISION: usize = 14;

/// Immutable comparison configuration.
///
/// `zero_tolerance` is a count of decimal digits: a difference smaller
/// than `10^-zero_tolerance` is indistinguishable from zero.
///
/// # Examples
/// ```
/// use u_inference::tolerance::Tolerance;
/// let tol = Tolerance::default();
/// assert!(tol.eq(0.1 + 0.2, 0.3));
/// assert!(tol.is_zero(1e-12));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerance {
    zero_tolerance: u32,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self { zero_tolerance: 10 }
    }
}

impl Tolerance {
    /// Creates a tolerance of `zero_tolerance` decimal digits.
    pub fn new(zero_tolerance: u32) -> Self {
        Self { zero_tolerance }
    }

    pub fn zero_tolerance(&self) -> u32 {
        self.zero_tolerance
    }

    /// Sign of `a − b` after rounding the difference to `zero_tolerance`
    /// decimal places. `None` when either operand is NaN.
    ///
    /// # Examples
    /// ```
    /// use std::cmp::Ordering;
    /// use u_inference::tolerance::Tolerance;
    /// let tol = Tolerance::new(8);
    /// assert_eq!(tol.compare(1.0, 1.0 + 1e-12), Some(Ordering::Equal));
    /// assert_eq!(tol.compare(1.0, 1.1), Some(Ordering::Less));
    /// ```
    pub fn compare(&self, a: f64, b: f64) -> Option<Ordering> {
        let diff = round_to_decimals(a - b, self.zero_tolerance);
        diff.partial_cmp(&0.0)
    }

    /// Tolerance equality; NaN is never equal to anything.
    pub fn eq(&self, a: f64, b: f64) -> bool {
        self.compare(a, b) == Some(Ordering::Equal)
    }

    /// `|v| < 10^-zero_tolerance`.
    pub fn is_zero(&self, v: f64) -> bool {
        v.abs() < 10f64.powi(-(self.zero_tolerance as i32))
    }

    /// Rounds a computed value to `zero_tolerance` significant digits,
    /// stripping accumulated noise (`0.1 + 0.2` becomes `0.3`).
    pub fn clean(&self, v: f64) -> f64 {
        round_to_significance(v, self.zero_tolerance)
    }

    /// Truncates `v` to `places` significant digits, then steps one unit
    /// toward −∞ if truncation moved the value up by more than noise.
    ///
    /// # Examples
    /// ```
    /// use u_inference::tolerance::Tolerance;
    /// let tol = Tolerance::default();
    /// assert_eq!(tol.floor_to_significance(1234.0, 2), 1200.0);
    /// assert_eq!(tol.floor_to_significance(-1234.0, 2), -1300.0);
    /// ```
    pub fn floor_to_significance(&self, v: f64, places: u32) -> f64 {
        let truncated = trunc_to_significance(v, places);
        if self.compare(v, truncated) == Some(Ordering::Less) {
            round_to_significance(truncated - unit_in_place(v, places), 15)
        } else {
            truncated
        }
    }

    /// Truncates `v` to `places` significant digits, then steps one unit
    /// toward +∞ if truncation moved the value down by more than noise.
    ///
    /// # Examples
    /// ```
    /// use u_inference::tolerance::Tolerance;
    /// let tol = Tolerance::default();
    /// assert_eq!(tol.ceil_to_significance(1234.0, 2), 1300.0);
    /// assert_eq!(tol.ceil_to_significance(1200.0000000000002, 2), 1200.0);
    /// ```
    pub fn ceil_to_significance(&self, v: f64, places: u32) -> f64 {
        let truncated = trunc_to_significance(v, places);
        if self.compare(v, truncated) == Some(Ordering::Greater) {
            round_to_significance(truncated + unit_in_place(v, places), 15)
        } else {
            truncated
        }
    }

    /// Exponent of the least-significant nonzero digit of `v` when written
    /// with `zero_tolerance` digits after the leading one.
    ///
    /// Returns `f64::INFINITY` for a value that is zero within tolerance.
    ///
    /// # Examples
    /// ```
    /// use u_inference::tolerance::Tolerance;
    /// let tol = Tolerance::default();
    /// assert_eq!(tol.ls_pow10(1200.0), 2.0);
    /// assert_eq!(tol.ls_pow10(0.1 + 0.2), -1.0);
    /// assert_eq!(tol.ls_pow10(0.0), f64::INFINITY);
    /// ```
    pub fn ls_pow10(&self, v: f64) -> f64 {
        if self.is_zero(v) || !v.is_finite() {
            return f64::INFINITY;
        }
        let formatted = format!("{:.*e}", self.zero_tolerance as usize, v);
        let Some((mantissa, exponent)) = split_scientific(&formatted) else {
            return f64::NAN;
        };
        let fraction = mantissa.split_once('.').map_or("", |(_, f)| f);
        let significant_fraction = fraction.trim_end_matches('0').len() as i32;
        (exponent - significant_fraction) as f64
    }
}

/// Rounds `v` to `places` decimal places (half away from zero).
pub fn round_to_decimals(v: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (v * factor).round() / factor
}

/// Exponent of the most significant digit of `v`.
///
/// Read from the scientific-notation form at 15 significant digits, so
/// `999.9999999999999` (which prints as `1.00000000000000e3`) reports 3.
///
/// # Examples
/// ```
/// use u_inference::tolerance::pow10;
/// assert_eq!(pow10(1000.0), 3);
/// assert_eq!(pow10(0.05), -2);
/// assert_eq!(pow10(-250.0), 2);
/// ```
pub fn pow10(v: f64) -> i32 {
    if !v.is_finite() || v == 0.0 {
        return 0;
    }
    let formatted = format!("{:.*e}", FORMAT_PRECISION, v);
    split_scientific(&formatted).map_or(0, |(_, e)| e)
}

/// Rounds `v` to `places` significant digits.
///
/// # Examples
/// ```
/// use u_inference::tolerance::round_to_significance;
/// assert_eq!(round_to_significance(123456.0, 3), 123000.0);
/// assert_eq!(round_to_significance(0.0012345, 2), 0.0012);
/// ```
pub fn round_to_significance(v: f64, places: u32) -> f64 {
    if !v.is_finite() || v == 0.0 {
        return v;
    }
    let digits = places.max(1) as usize - 1;
    format!("{:.*e}", digits, v).parse().unwrap_or(v)
}

/// Truncates `v` toward zero at `places` significant digits.
///
/// # Examples
/// ```
/// use u_inference::tolerance::trunc_to_significance;
/// assert_eq!(trunc_to_significance(1299.0, 2), 1200.0);
/// assert_eq!(trunc_to_significance(-0.0789, 1), -0.07);
/// ```
pub fn trunc_to_significance(v: f64, places: u32) -> f64 {
    if !v.is_finite() || v == 0.0 {
        return v;
    }
    let formatted = format!("{:.*e}", FORMAT_PRECISION, v);
    let Some((mantissa, exponent)) = split_scientific(&formatted) else {
        return v;
    };
    let (sign, unsigned) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = unsigned
        .chars()
        .filter(char::is_ascii_digit)
        .take(places.max(1) as usize)
        .collect();
    let (lead, rest) = digits.split_at(1);
    let rebuilt = if rest.is_empty() {
        format!("{sign}{lead}e{exponent}")
    } else {
        format!("{sign}{lead}.{rest}e{exponent}")
    };
    rebuilt.parse().unwrap_or(v)
}

/// Value of one unit in the last kept place when `v` is cut to `places`
/// significant digits.
fn unit_in_place(v: f64, places: u32) -> f64 {
    10f64.powi(pow10(v) - places.max(1) as i32 + 1)
}

fn split_scientific(formatted: &str) -> Option<(&str, i32)> {
    let (mantissa, exponent) = formatted.split_once('e')?;
    Some((mantissa, exponent.parse().ok()?))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn compare_is_antisymmetric(a in -1e6_f64..1e6, b in -1e6_f64..1e6) {
            let tol = Tolerance::default();
            let ab = tol.compare(a, b).unwrap();
            let ba = tol.compare(b, a).unwrap();
            prop_assert_eq!(ab, ba.reverse());
        }

        #[test]
        fn floor_le_value_le_ceil(v in -1e6_f64..1e6, places in 1_u32..6) {
            prop_assume!(v.abs() > 1e-6);
            let tol = Tolerance::default();
            let lo = tol.floor_to_significance(v, places);
            let hi = tol.ceil_to_significance(v, places);
            prop_assert!(tol.compare(lo, v) != Some(Ordering::Greater), "floor {} > {}", lo, v);
            prop_assert!(tol.compare(hi, v) != Some(Ordering::Less), "ceil {} < {}", hi, v);
        }

        #[test]
        fn rounding_stays_close(v in 1e-3_f64..1e6, places in 1_u32..10) {
            let r = round_to_significance(v, places);
            let rel = ((r - v) / v).abs();
            prop_assert!(rel <= 0.5 * 10f64.powi(1 - places as i32) + 1e-12);
        }
    }
}
