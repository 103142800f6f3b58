//! From a fitted decay rate to the λ parameter.
//!
//! The Lyapunov-like rate λ_L is normalized by the Maldacena–Shenker–Stanford
//! bound `2πT` and clipped to `[0, 1]`; α then follows from `α = −0.5 − λ`.

use std::f64::consts::PI;

use crate::domain::OtocSeries;
use crate::error::AppError;
use crate::fit::{DecayFit, FitOptions, fit_otoc_decay};
use crate::physics::alpha_from_lambda;

/// Effective temperature used for the MSS normalization.
pub const DEFAULT_T_EFF: f64 = 0.5;

/// Maximal chaos bound `2πT`.
pub fn mss_bound(t_eff: f64) -> f64 {
    2.0 * PI * t_eff
}

/// `clip(λ_L / 2πT, 0, 1)`.
pub fn kaelion_lambda(lambda_l: f64, t_eff: f64) -> f64 {
    (lambda_l / mss_bound(t_eff)).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambdaEstimate {
    pub lambda_l: f64,
    pub lambda_k: f64,
    pub alpha: f64,
}

impl LambdaEstimate {
    pub fn from_lyapunov(lambda_l: f64, t_eff: f64) -> Self {
        let lambda_k = kaelion_lambda(lambda_l, t_eff);
        Self {
            lambda_l,
            lambda_k,
            alpha: alpha_from_lambda(lambda_k),
        }
    }
}

/// Fit `series` and derive λ/α from the decay rate.
pub fn estimate_lambda(
    series: &OtocSeries,
    opts: &FitOptions,
    t_eff: f64,
) -> Result<(DecayFit, LambdaEstimate), AppError> {
    if series.is_empty() {
        return Err(AppError::insufficient_data(format!(
            "No OTOC values for the {} family.",
            series.family.display_name()
        )));
    }
    let fit = fit_otoc_decay(&series.depths, &series.values, opts)?;
    let estimate = LambdaEstimate::from_lyapunov(fit.lambda_l, t_eff);
    tracing::debug!(
        family = series.family.display_name(),
        lambda_l = estimate.lambda_l,
        lambda_k = estimate.lambda_k,
        alpha = estimate.alpha,
        "lambda estimated"
    );
    Ok((fit, estimate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CircuitFamily;

    #[test]
    fn lambda_is_clipped_to_unit_interval() {
        assert_eq!(kaelion_lambda(100.0, DEFAULT_T_EFF), 1.0);
        assert_eq!(kaelion_lambda(-1.0, DEFAULT_T_EFF), 0.0);
        assert!((kaelion_lambda(PI / 2.0, DEFAULT_T_EFF) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn estimate_links_alpha_to_lambda() {
        let e = LambdaEstimate::from_lyapunov(1.2, DEFAULT_T_EFF);
        assert!((e.alpha - (-0.5 - e.lambda_k)).abs() < 1e-12);
    }

    #[test]
    fn estimate_lambda_from_clean_series() {
        let depths = [1, 2, 4, 6, 8, 10, 14];
        let values = depths
            .iter()
            .map(|&d| 0.8 * (-0.6 * d as f64).exp() + 0.02)
            .collect();
        let series = OtocSeries::new(CircuitFamily::Chaotic, &depths, values);
        let (fit, est) = estimate_lambda(&series, &FitOptions::hardware_decay(), DEFAULT_T_EFF).unwrap();
        assert!((fit.lambda_l - 0.6).abs() < 1e-4);
        assert!((est.lambda_k - 0.6 / PI).abs() < 1e-4);
    }

    #[test]
    fn empty_series_is_insufficient_data() {
        let series = OtocSeries::new(CircuitFamily::Syk, &[], Vec::new());
        let err = estimate_lambda(&series, &FitOptions::hardware_decay(), DEFAULT_T_EFF).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
