//! Symmetric eigendecomposition via cyclic Jacobi rotations.
//!
//! Covariance matrices in this workspace are small (tens of dimensions), so
//! the classic Jacobi sweep is both adequate and free of external linear
//! algebra dependencies. Eigenpairs come back sorted by descending
//! eigenvalue, which is the order PCA consumes them in.

use serde::{Deserialize, Serialize};

const MAX_SWEEPS: usize = 64;
// Sum-of-squares threshold near machine precision; Jacobi converges
// quadratically, so the final sweep overshoots this by orders of magnitude.
const OFF_DIAGONAL_EPS: f64 = 1e-20;

/// Result of a symmetric eigendecomposition.
///
/// `values[i]` pairs with the unit-length row `vectors[i]`, sorted by
/// descending eigenvalue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Eigen {
    pub values: Vec<f64>,
    pub vectors: Vec<Vec<f64>>,
}

/// Decompose a symmetric matrix given as square row-major rows.
///
/// Returns None for an empty or non-square input. Mild asymmetry from
/// accumulated floating error is tolerated; the upper triangle wins.
pub fn symmetric_eigen(matrix: &[Vec<f64>]) -> Option<Eigen> {
    let n = matrix.len();
    if n == 0 || matrix.iter().any(|row| row.len() != n) {
        return None;
    }

    // Working copy of the matrix and accumulated rotations.
    let mut a: Vec<Vec<f64>> = matrix.to_vec();
    let mut v: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    for _ in 0..MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|p| (p + 1..n).map(move |q| (p, q)))
            .map(|(p, q)| a[p][q] * a[p][q])
            .sum();
        if off < OFF_DIAGONAL_EPS {
            break;
        }

        for p in 0..n - 1 {
            for q in p + 1..n {
                if a[p][q].abs() < OFF_DIAGONAL_EPS {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[k][p];
                    let akq = a[k][q];
                    a[k][p] = c * akp - s * akq;
                    a[k][q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[p][k];
                    let aqk = a[q][k];
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in v.iter_mut() {
                    let vp = row[p];
                    let vq = row[q];
                    row[p] = c * vp - s * vq;
                    row[q] = s * vp + c * vq;
                }
            }
        }
    }

    // Diagonal holds the eigenvalues; column j of v is the eigenvector.
    let mut pairs: Vec<(f64, Vec<f64>)> = (0..n)
        .map(|j| (a[j][j], (0..n).map(|i| v[i][j]).collect()))
        .collect();
    pairs.sort_by(|x, y| y.0.total_cmp(&x.0));

    let mut values = Vec::with_capacity(n);
    let mut vectors = Vec::with_capacity(n);
    for (value, mut vector) in pairs {
        let norm: f64 = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for x in vector.iter_mut() {
                *x /= norm;
            }
        }
        values.push(value);
        vectors.push(vector);
    }

    Some(Eigen { values, vectors })
}
