//! Dense row-major matrix helpers for least squares.
//!
//! Matrices are plain `Vec<Vec<f64>>`; every row of a well-formed matrix
//! has the same length. Sizes here are tiny (design matrices with a handful
//! of columns), so clarity wins over blocking or SIMD.

/// Row-major dense matrix.
pub type Matrix = Vec<Vec<f64>>;

/// Transpose of an `r × c` matrix.
///
/// # Examples
/// ```
/// use u_inference::matrix::transpose;
/// let m = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
/// assert_eq!(transpose(&m), vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);
/// ```
pub fn transpose(m: &[Vec<f64>]) -> Matrix {
    let cols = m.first().map_or(0, Vec::len);
    (0..cols)
        .map(|j| m.iter().map(|row| row[j]).collect())
        .collect()
}

/// Product `a · b`. Returns `None` when the inner dimensions disagree.
///
/// # Examples
/// ```
/// use u_inference::matrix::multiply;
/// let a = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
/// let id = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
/// assert_eq!(multiply(&a, &id), Some(a.clone()));
/// ```
pub fn multiply(a: &[Vec<f64>], b: &[Vec<f64>]) -> Option<Matrix> {
    let inner = a.first().map_or(0, Vec::len);
    if inner != b.len() || a.iter().any(|row| row.len() != inner) {
        return None;
    }
    let cols = b.first().map_or(0, Vec::len);
    Some(
        a.iter()
            .map(|row| {
                (0..cols)
                    .map(|j| row.iter().zip(b).map(|(&x, brow)| x * brow[j]).sum())
                    .collect()
            })
            .collect(),
    )
}

/// Matrix–vector product `a · v`.
pub fn multiply_vector(a: &[Vec<f64>], v: &[f64]) -> Option<Vec<f64>> {
    if a.iter().any(|row| row.len() != v.len()) {
        return None;
    }
    Some(
        a.iter()
            .map(|row| row.iter().zip(v).map(|(&x, &y)| x * y).sum())
            .collect(),
    )
}

/// Inverse of a square matrix by Gauss–Jordan elimination with partial
/// pivoting.
///
/// Returns `None` for a non-square matrix, or when a pivot falls below
/// `n · ε · max|aᵢⱼ|`, i.e. the columns are linearly dependent up to
/// rounding.
///
/// # Examples
/// ```
/// use u_inference::matrix::invert;
/// let m = vec![vec![4.0, 7.0], vec![2.0, 6.0]];
/// let inv = invert(&m).unwrap();
/// assert!((inv[0][0] - 0.6).abs() < 1e-12);
/// assert!((inv[1][0] + 0.2).abs() < 1e-12);
///
/// let singular = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
/// assert!(invert(&singular).is_none());
/// ```
pub fn invert(m: &[Vec<f64>]) -> Option<Matrix> {
    let n = m.len();
    if m.iter().any(|row| row.len() != n) {
        return None;
    }
    let scale = m
        .iter()
        .flatten()
        .fold(0.0_f64, |acc, &x| acc.max(x.abs()));
    if !scale.is_finite() {
        return None;
    }
    let threshold = n as f64 * f64::EPSILON * scale;

    // Augmented [A | I]
    let mut aug: Matrix = m
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut r = row.clone();
            r.extend((0..n).map(|j| if i == j { 1.0 } else { 0.0 }));
            r
        })
        .collect();

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&a, &b| {
            aug[a][col]
                .abs()
                .partial_cmp(&aug[b][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        let pivot = aug[pivot_row][col];
        if pivot.abs() <= threshold {
            return None;
        }
        aug.swap(col, pivot_row);
        for x in aug[col].iter_mut() {
            *x /= pivot;
        }
        let pivot_vals = aug[col].clone();
        for (r, row) in aug.iter_mut().enumerate() {
            if r == col {
                continue;
            }
            let factor = row[col];
            if factor != 0.0 {
                for (x, &p) in row.iter_mut().zip(&pivot_vals) {
                    *x -= factor * p;
                }
            }
        }
    }

    Some(aug.into_iter().map(|row| row[n..].to_vec()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_identity(m: &Matrix) {
        for (i, row) in m.iter().enumerate() {
            for (j, &x) in row.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((x - expected).abs() < 1e-10, "entry ({i},{j}) = {x}");
            }
        }
    }

    #[test]
    fn test_transpose_empty() {
        assert!(transpose(&[]).is_empty());
    }

    #[test]
    fn test_multiply_dimension_mismatch() {
        let a = vec![vec![1.0, 2.0]];
        let b = vec![vec![1.0, 2.0]];
        assert!(multiply(&a, &b).is_none());
    }

    #[test]
    fn test_multiply_rectangular() {
        let a = vec![vec![1.0, 2.0, 3.0]];
        let b = vec![vec![1.0], vec![1.0], vec![1.0]];
        assert_eq!(multiply(&a, &b), Some(vec![vec![6.0]]));
    }

    #[test]
    fn test_multiply_vector() {
        let a = vec![vec![1.0, 2.0], vec![0.0, 1.0]];
        assert_eq!(multiply_vector(&a, &[3.0, 4.0]), Some(vec![11.0, 4.0]));
        assert!(multiply_vector(&a, &[1.0]).is_none());
    }

    #[test]
    fn test_invert_needs_pivoting() {
        let m = vec![
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 3.0],
            vec![4.0, -3.0, 8.0],
        ];
        let inv = invert(&m).unwrap();
        assert_identity(&multiply(&m, &inv).unwrap());
    }

    #[test]
    fn test_invert_gram_matrix() {
        // XᵗX for x = 0..9 with an intercept column
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let design: Matrix = x.iter().map(|&v| vec![1.0, v, v * v]).collect();
        let xt = transpose(&design);
        let gram = multiply(&xt, &design).unwrap();
        let inv = invert(&gram).unwrap();
        assert_identity(&multiply(&gram, &inv).unwrap());
    }

    #[test]
    fn test_invert_collinear_columns() {
        let design: Matrix = (0..6)
            .map(|i| {
                let v = i as f64;
                vec![1.0, v, 2.0 * v + 1.0]
            })
            .collect();
        let gram = multiply(&transpose(&design), &design).unwrap();
        assert!(invert(&gram).is_none());
    }

    #[test]
    fn test_invert_non_square() {
        assert!(invert(&[vec![1.0, 2.0]]).is_none());
    }
}
