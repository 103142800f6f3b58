//! Levenberg–Marquardt nonlinear least squares.
//!
//! Solves
//!
//! ```text
//! minimize Σ r_i(p)^2,   lower <= p <= upper
//! ```
//!
//! for the handful of parameters our curve models have. Box bounds are handled
//! by projecting every trial step back onto the feasible box, which is enough
//! for the simple bounds used here (decay rates and offsets).
//!
//! The covariance estimate follows the usual curve-fitting convention:
//! `cov = s² (JᵀJ)⁻¹` with `s² = SSE / (n - p)` evaluated at the solution.

use nalgebra::{DMatrix, DVector};

use crate::error::AppError;
use crate::math::ols::{pseudo_inverse, solve_least_squares};

/// Box constraints, one interval per parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Bounds {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self, AppError> {
        if lower.len() != upper.len() {
            return Err(AppError::config("Bounds must have equal lower/upper lengths."));
        }
        if lower.iter().zip(&upper).any(|(lo, hi)| !(lo < hi)) {
            return Err(AppError::config("Each lower bound must be strictly below its upper bound."));
        }
        Ok(Self { lower, upper })
    }

    fn project(&self, p: &mut DVector<f64>) {
        for (i, v) in p.iter_mut().enumerate() {
            *v = v.clamp(self.lower[i], self.upper[i]);
        }
    }

    fn contains(&self, p: &[f64]) -> bool {
        p.iter()
            .enumerate()
            .all(|(i, v)| *v >= self.lower[i] && *v <= self.upper[i])
    }
}

#[derive(Debug, Clone)]
pub struct LmOptions {
    /// Budget of residual evaluations before giving up.
    pub max_evals: usize,
    /// Relative reduction in SSE below which we stop.
    pub ftol: f64,
    /// Relative step size below which we stop.
    pub xtol: f64,
    /// Gradient infinity-norm below which we stop.
    pub gtol: f64,
    pub bounds: Option<Bounds>,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_evals: 5000,
            ftol: 1e-12,
            xtol: 1e-12,
            gtol: 1e-12,
            bounds: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LmSolution {
    pub params: Vec<f64>,
    /// `None` when there are no residual degrees of freedom or `JᵀJ` is singular.
    pub covariance: Option<DMatrix<f64>>,
    pub sse: f64,
    pub evaluations: usize,
    pub iterations: usize,
}

impl LmSolution {
    /// One-sigma standard error of parameter `i` (NaN when unavailable).
    pub fn std_error(&self, i: usize) -> f64 {
        self.covariance
            .as_ref()
            .map(|c| c[(i, i)].max(0.0).sqrt())
            .unwrap_or(f64::NAN)
    }
}

/// Minimize `‖r(p)‖²` starting from `p0`.
///
/// `residuals(p)` returns the residual vector (length `n`), `jacobian(p)` its
/// `n × p` derivative matrix.
pub fn levenberg_marquardt<R, J>(
    residuals: R,
    jacobian: J,
    p0: &[f64],
    opts: &LmOptions,
) -> Result<LmSolution, AppError>
where
    R: Fn(&DVector<f64>) -> DVector<f64>,
    J: Fn(&DVector<f64>) -> DMatrix<f64>,
{
    let n_params = p0.len();
    if n_params == 0 {
        return Err(AppError::config("No parameters to fit."));
    }
    if let Some(b) = &opts.bounds {
        if b.lower.len() != n_params {
            return Err(AppError::config(format!(
                "Bounds have {} entries, model has {n_params} parameters.",
                b.lower.len()
            )));
        }
        if !b.contains(p0) {
            return Err(AppError::config("Initial guess lies outside the bounds."));
        }
    }

    let mut p = DVector::from_column_slice(p0);
    let mut r = residuals(&p);
    let mut evaluations = 1usize;
    if r.len() < n_params {
        return Err(AppError::insufficient_data(format!(
            "{} observations cannot determine {n_params} parameters.",
            r.len()
        )));
    }
    if !r.iter().all(|v| v.is_finite()) {
        return Err(AppError::numeric("Residuals are not finite at the initial guess."));
    }
    let mut sse = r.norm_squared();

    let mut jac = jacobian(&p);
    let mut jtj = jac.transpose() * &jac;
    let mut mu = 1e-3 * (0..n_params).map(|i| jtj[(i, i)]).fold(0.0_f64, f64::max).max(1e-12);
    let mut iterations = 0usize;

    'outer: loop {
        iterations += 1;
        let grad = jac.transpose() * &r;
        if grad.amax() <= opts.gtol {
            break;
        }

        loop {
            let mut damped = jtj.clone();
            for i in 0..n_params {
                damped[(i, i)] += mu * jtj[(i, i)].max(1e-12);
            }

            let rhs = -&grad;
            let step = match damped.clone().cholesky() {
                Some(ch) => ch.solve(&rhs),
                None => match solve_least_squares(&damped, &rhs) {
                    Some(s) => s,
                    None => {
                        mu *= 10.0;
                        if mu > 1e16 {
                            break 'outer;
                        }
                        continue;
                    }
                },
            };

            let mut trial = &p + &step;
            if let Some(b) = &opts.bounds {
                b.project(&mut trial);
            }

            let r_trial = residuals(&trial);
            evaluations += 1;
            let sse_trial = if r_trial.iter().all(|v| v.is_finite()) {
                r_trial.norm_squared()
            } else {
                f64::INFINITY
            };

            if sse_trial < sse {
                let step_norm = (&trial - &p).norm();
                let reduction = sse - sse_trial;
                p = trial;
                r = r_trial;
                sse = sse_trial;
                mu = (mu * 0.3).max(1e-15);

                if reduction <= opts.ftol * sse.max(f64::MIN_POSITIVE)
                    || step_norm <= opts.xtol * (p.norm() + opts.xtol)
                {
                    break 'outer;
                }

                jac = jacobian(&p);
                jtj = jac.transpose() * &jac;
                break;
            }

            mu *= 10.0;
            if mu > 1e16 {
                // No direction reduces the objective any further.
                break 'outer;
            }
            if evaluations >= opts.max_evals {
                return Err(AppError::numeric(format!(
                    "Optimal parameters not found: number of calls to function has reached max_evals = {}.",
                    opts.max_evals
                )));
            }
        }

        if evaluations >= opts.max_evals {
            return Err(AppError::numeric(format!(
                "Optimal parameters not found: number of calls to function has reached max_evals = {}.",
                opts.max_evals
            )));
        }
    }

    if !p.iter().all(|v| v.is_finite()) {
        return Err(AppError::numeric("Fit diverged to non-finite parameters."));
    }

    let n_obs = r.len();
    let jac = jacobian(&p);
    let covariance = if n_obs > n_params {
        let s2 = sse / (n_obs - n_params) as f64;
        pseudo_inverse(&(jac.transpose() * &jac)).map(|inv| inv * s2)
    } else {
        None
    };

    Ok(LmSolution {
        params: p.iter().copied().collect(),
        covariance,
        sse,
        evaluations,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_problem(
        x: Vec<f64>,
        y: Vec<f64>,
    ) -> (
        impl Fn(&DVector<f64>) -> DVector<f64>,
        impl Fn(&DVector<f64>) -> DMatrix<f64>,
    ) {
        let xr = x.clone();
        let res = move |p: &DVector<f64>| {
            DVector::from_iterator(xr.len(), xr.iter().zip(&y).map(|(xi, yi)| p[0] * xi + p[1] - yi))
        };
        let jac = move |_: &DVector<f64>| {
            let mut j = DMatrix::zeros(x.len(), 2);
            for (i, xi) in x.iter().enumerate() {
                j[(i, 0)] = *xi;
                j[(i, 1)] = 1.0;
            }
            j
        };
        (res, jac)
    }

    #[test]
    fn recovers_linear_parameters() {
        let x = vec![0.0, 1.0, 2.0, 3.0];
        let y = vec![1.0, 3.0, 5.0, 7.0];
        let (r, j) = line_problem(x, y);
        let sol = levenberg_marquardt(r, j, &[0.0, 0.0], &LmOptions::default()).unwrap();
        assert!((sol.params[0] - 2.0).abs() < 1e-8);
        assert!((sol.params[1] - 1.0).abs() < 1e-8);
        assert!(sol.sse < 1e-12);
    }

    #[test]
    fn bounds_clamp_the_solution() {
        let x = vec![0.0, 1.0, 2.0, 3.0];
        let y = vec![1.0, 3.0, 5.0, 7.0];
        let (r, j) = line_problem(x, y);
        let opts = LmOptions {
            bounds: Some(Bounds::new(vec![0.0, 0.0], vec![1.5, 10.0]).unwrap()),
            ..LmOptions::default()
        };
        let sol = levenberg_marquardt(r, j, &[1.0, 0.0], &opts).unwrap();
        assert!(sol.params[0] <= 1.5 + 1e-12);
        assert!(sol.params[0] > 1.4);
    }

    #[test]
    fn rejects_initial_guess_outside_bounds() {
        let (r, j) = line_problem(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0]);
        let opts = LmOptions {
            bounds: Some(Bounds::new(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap()),
            ..LmOptions::default()
        };
        let err = levenberg_marquardt(r, j, &[2.0, 0.0], &opts).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn covariance_present_with_spare_degrees_of_freedom() {
        let x = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let y = vec![1.1, 2.9, 5.2, 6.8, 9.1];
        let (r, j) = line_problem(x, y);
        let sol = levenberg_marquardt(r, j, &[0.0, 0.0], &LmOptions::default()).unwrap();
        assert!(sol.std_error(0).is_finite());
        assert!(sol.std_error(0) > 0.0);
    }
}
