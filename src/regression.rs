use approx::abs_diff_ne;
use faer::{Mat, Side, linalg::solvers::DenseSolveCore};
use tracing::debug;

use crate::error::{BanditError, Result};

/// Regularized least-squares state of a linear bandit.
///
/// Keeps the Gram matrix `G = I + sum(x x^T)`, its inverse, the reward-weighted
/// feature sum `b = sum(x r)`, and the estimate `theta = G^-1 b`. The inverse
/// is maintained with the Sherman-Morrison formula so each update costs
/// O(d^2) instead of a full inversion.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    /// Feature dimension
    pub dimension: usize,
    /// G = I + X^T X
    pub gram: Mat<f64>,
    /// G^-1
    pub gram_inv: Mat<f64>,
    /// X^T y
    pub weighted_sum: Vec<f64>,
    /// theta = G^-1 X^T y
    pub estimate: Vec<f64>,
}

impl LeastSquares {
    /// Identity-seeded model, invertible before any data arrives.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            gram: Mat::<f64>::identity(dimension, dimension),
            gram_inv: Mat::<f64>::identity(dimension, dimension),
            weighted_sum: vec![0.0; dimension],
            estimate: vec![0.0; dimension],
        }
    }

    /// Adds one observation `(x, y)` and refreshes the estimate.
    ///
    /// On error the model is left exactly as it was.
    pub fn fit(&mut self, x: &[f64], y: f64) -> Result<()> {
        let d = self.dimension;
        if x.len() != d {
            return Err(BanditError::DimensionMismatch {
                message: format!("expected {d} features, got {}", x.len()),
            });
        }

        // G + x x^T
        let mut gram = self.gram.clone();
        for i in 0..d {
            for j in 0..d {
                gram[(i, j)] += x[i] * x[j];
            }
        }

        // G_inv - (G_inv x)(G_inv x)^T / (1 + x^T G_inv x)
        let mut g_inv_x = vec![0.0; d];
        for (i, out) in g_inv_x.iter_mut().enumerate() {
            for (j, &xj) in x.iter().enumerate() {
                *out += self.gram_inv[(i, j)] * xj;
            }
        }
        let denominator = 1.0 + x.iter().zip(&g_inv_x).map(|(a, b)| a * b).sum::<f64>();

        let gram_inv = if denominator.is_finite() && abs_diff_ne!(denominator, 0.0, epsilon = 1e-10) {
            let mut updated = self.gram_inv.clone();
            for i in 0..d {
                for j in 0..d {
                    updated[(i, j)] -= g_inv_x[i] * g_inv_x[j] / denominator;
                }
            }
            ensure_finite(&updated)?;
            updated
        } else {
            debug!(denominator, "Sherman-Morrison denominator degenerate, inverting directly");
            invert(&gram)?
        };

        let weighted_sum: Vec<f64> = self
            .weighted_sum
            .iter()
            .zip(x)
            .map(|(acc, &xi)| acc + xi * y)
            .collect();
        let estimate = solve(&gram_inv, &weighted_sum)?;

        self.gram = gram;
        self.gram_inv = gram_inv;
        self.weighted_sum = weighted_sum;
        self.estimate = estimate;
        Ok(())
    }

    /// Recomputes `G^-1` by LU decomposition.
    pub fn refresh_inverse(&mut self) -> Result<()> {
        self.gram_inv = invert(&self.gram)?;
        Ok(())
    }

    /// `<x, theta>`
    pub fn predict(&self, x: &[f64]) -> f64 {
        x.iter().zip(&self.estimate).map(|(a, b)| a * b).sum()
    }

    /// Quadratic form `x^T G^-1 x`.
    pub fn quad_form(&self, x: &[f64]) -> f64 {
        let d = self.dimension;
        let mut result = 0.0;
        for i in 0..d {
            let row: f64 = (0..d).map(|j| self.gram_inv[(i, j)] * x[j]).sum();
            result += x[i] * row;
        }
        result
    }

    /// Lower Cholesky factor of `G^-1`, used to sample from `N(theta, G^-1)`.
    pub fn inverse_cholesky(&self) -> Result<Mat<f64>> {
        let llt = self
            .gram_inv
            .llt(Side::Lower)
            .map_err(|e| BanditError::numerical(format!("inverse Gram matrix not positive-definite: {e:?}")))?;
        Ok(llt.L().to_owned())
    }

    /// Whether the Gram matrix is symmetric and admits a Cholesky factorization.
    pub fn gram_is_positive_definite(&self) -> bool {
        let d = self.dimension;
        for i in 0..d {
            for j in 0..i {
                if abs_diff_ne!(self.gram[(i, j)], self.gram[(j, i)], epsilon = 1e-9) {
                    return false;
                }
            }
        }
        self.gram.llt(Side::Lower).is_ok()
    }

    /// Row-major copy of the Gram matrix.
    pub fn gram_rows(&self) -> Vec<Vec<f64>> {
        (0..self.dimension)
            .map(|i| (0..self.dimension).map(|j| self.gram[(i, j)]).collect())
            .collect()
    }

    /// Reset the model to its identity seed.
    pub fn reset(&mut self) {
        *self = Self::new(self.dimension);
    }
}

fn invert(gram: &Mat<f64>) -> Result<Mat<f64>> {
    let inverse = gram.partial_piv_lu().inverse();
    ensure_finite(&inverse)?;
    Ok(inverse)
}

fn ensure_finite(m: &Mat<f64>) -> Result<()> {
    for j in 0..m.ncols() {
        for i in 0..m.nrows() {
            if !m[(i, j)].is_finite() {
                return Err(BanditError::numerical("Gram matrix is not invertible"));
            }
        }
    }
    Ok(())
}

/// `G^-1 b`, rejected if any entry overflowed.
fn solve(gram_inv: &Mat<f64>, weighted_sum: &[f64]) -> Result<Vec<f64>> {
    let d = weighted_sum.len();
    let estimate: Vec<f64> = (0..d)
        .map(|i| (0..d).map(|j| gram_inv[(i, j)] * weighted_sum[j]).sum())
        .collect();
    if estimate.iter().any(|v| !v.is_finite()) {
        return Err(BanditError::numerical("least-squares estimate is not finite"));
    }
    Ok(estimate)
}
