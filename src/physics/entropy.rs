//! The entropy formula `S = A/4 + α(λ)·ln A` and the linear λ ↔ α relation.

/// LQG limit of the λ interpolation.
pub const LAMBDA_LQG: f64 = 0.0;
/// Holographic limit of the λ interpolation.
pub const LAMBDA_HOLOGRAPHIC: f64 = 1.0;

/// `α(λ) = -0.5 - λ`.
pub fn alpha_from_lambda(lambda: f64) -> f64 {
    -0.5 - lambda
}

/// Inverse of [`alpha_from_lambda`].
pub fn lambda_from_alpha(alpha: f64) -> f64 {
    -0.5 - alpha
}

/// Bekenstein–Hawking area law `S = A/4`.
pub fn bekenstein_hawking(area: f64) -> f64 {
    area / 4.0
}

/// Log-corrected entropy `S = A/4 + α(λ)·ln A`.
pub fn kaelion_entropy(area: f64, lambda: f64) -> f64 {
    bekenstein_hawking(area) + alpha_from_lambda(lambda) * area.ln()
}

/// Whether `α` lies inside the band spanned by the two limits, `[-1.5, -0.5]`.
pub fn alpha_in_band(alpha: f64) -> bool {
    let lo = alpha_from_lambda(LAMBDA_HOLOGRAPHIC);
    let hi = alpha_from_lambda(LAMBDA_LQG);
    (lo..=hi).contains(&alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_lambda_round_trip_limits() {
        assert_eq!(alpha_from_lambda(0.0), -0.5);
        assert_eq!(alpha_from_lambda(1.0), -1.5);
        assert!((lambda_from_alpha(alpha_from_lambda(0.37)) - 0.37).abs() < 1e-15);
    }

    #[test]
    fn entropy_reduces_to_area_law_at_unit_area() {
        // ln(1) = 0, so the correction vanishes.
        assert!((kaelion_entropy(1.0, 0.8) - 0.25).abs() < 1e-15);
    }

    #[test]
    fn band_check() {
        assert!(alpha_in_band(-1.0));
        assert!(alpha_in_band(-0.5));
        assert!(!alpha_in_band(-1.6));
        assert!(!alpha_in_band(-0.4));
    }
}
