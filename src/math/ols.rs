//! Least squares solver.
//!
//! Solves small, dense regression problems of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - SVD handles tall design matrices (more rows than columns) robustly.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - The numerical rank is reported alongside β so callers can reject
//!   collinear designs instead of trusting a minimum-norm solution.

use nalgebra::{DMatrix, DVector};

/// Singular values below `RANK_RTOL × σ_max` count as zero.
const RANK_RTOL: f64 = 1e-10;

/// A least squares solution plus the numerical rank of the design.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    pub beta: DVector<f64>,
    pub rank: usize,
}

impl LeastSquares {
    pub fn is_full_rank(&self) -> bool {
        self.rank == self.beta.len()
    }
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system cannot be solved to finite coefficients.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<LeastSquares> {
    if x.nrows() == 0 || x.ncols() == 0 || x.nrows() != y.len() {
        return None;
    }

    let svd = x.clone().svd(true, true);
    let sigma_max = svd.singular_values.max();
    if !(sigma_max.is_finite() && sigma_max > 0.0) {
        return None;
    }
    let rank = svd.rank(sigma_max * RANK_RTOL);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol * sigma_max) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(LeastSquares { beta, rank });
            }
        }
    }

    None
}

/// Coefficient of determination of `y_hat` against `y`.
///
/// Returns 1.0 for a constant target that is matched exactly.
pub fn r_squared(y: &DVector<f64>, y_hat: &DVector<f64>) -> f64 {
    let mean = y.mean();
    let ss_tot: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    let ss_res: f64 = y.iter().zip(y_hat.iter()).map(|(a, b)| (a - b).powi(2)).sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}
