//! Linear least squares.
//!
//! Two uses in this crate:
//! - the damped normal equations inside Levenberg–Marquardt fall back to this
//!   solver when Cholesky fails
//! - zero-noise extrapolation fits a straight line through OTOC values measured
//!   at several noise-amplification factors
//!
//! Implementation choices:
//! - SVD solve, which tolerates tall (more rows than columns) and
//!   rank-deficient systems. (Nalgebra's `QR::solve` is intended for square
//!   systems and will panic for non-square matrices.)
//! - Parameter dimensions are tiny (2–4 columns), so SVD cost is irrelevant.

use nalgebra::{DMatrix, DVector};

use crate::error::AppError;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Moore–Penrose pseudo-inverse of a small symmetric matrix.
pub fn pseudo_inverse(m: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let inv = m.clone().pseudo_inverse(1e-12).ok()?;
    if inv.iter().all(|v| v.is_finite()) {
        Some(inv)
    } else {
        None
    }
}

/// Straight line `y = slope·x + intercept` fitted by least squares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LineFit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Degree-1 polynomial fit.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LineFit, AppError> {
    if x.len() != y.len() {
        return Err(AppError::config(format!(
            "Line fit needs matching lengths (x={}, y={}).",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(AppError::insufficient_data("Line fit needs at least two points."));
    }

    let n = x.len();
    let x_mean = x.iter().sum::<f64>() / n as f64;
    if x.iter().all(|&xi| (xi - x_mean).abs() <= f64::EPSILON * x_mean.abs().max(1.0)) {
        return Err(AppError::numeric("Line fit is singular (all x values equal)."));
    }

    let mut design = DMatrix::zeros(n, 2);
    for (i, &xi) in x.iter().enumerate() {
        design[(i, 0)] = xi;
        design[(i, 1)] = 1.0;
    }
    let rhs = DVector::from_column_slice(y);

    let beta = solve_least_squares(&design, &rhs)
        .ok_or_else(|| AppError::numeric("Line fit least squares failed."))?;

    Ok(LineFit {
        slope: beta[0],
        intercept: beta[1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn line_fit_extrapolates_to_zero() {
        // OTOC degrading linearly with the noise factor.
        let fit = fit_line(&[1.0, 2.0, 3.0], &[0.40, 0.30, 0.20]).unwrap();
        assert!((fit.slope + 0.1).abs() < 1e-12);
        assert!((fit.intercept - 0.5).abs() < 1e-12);
        assert!((fit.at(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn line_fit_rejects_constant_x() {
        let err = fit_line(&[2.0, 2.0, 2.0], &[0.4, 0.5, 0.6]).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn line_fit_rejects_single_point() {
        let err = fit_line(&[1.0], &[0.4]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
