//! Schwarzschild black-hole observables in geometric units (`G = c = 1`).
//!
//! Masses are given in solar masses and used directly as the geometric mass,
//! which is what the toy estimates below need: only ratios such as
//! `ln A / A` enter the detectability argument.

use std::f64::consts::PI;

use crate::physics::entropy::{alpha_from_lambda, bekenstein_hawking, kaelion_entropy};

/// Confidence level (in sigma) required to claim a detection.
pub const DETECTION_CONFIDENCE: f64 = 5.0;

/// Typical signal-to-noise ratio of a current ground-based GW event.
pub const CURRENT_GW_SNR: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackHole {
    pub mass: f64,
}

impl BlackHole {
    pub fn new(mass: f64) -> Self {
        Self { mass }
    }

    /// Horizon area `A = 16πM²`.
    pub fn area(&self) -> f64 {
        16.0 * PI * self.mass * self.mass
    }

    pub fn standard_entropy(&self) -> f64 {
        bekenstein_hawking(self.area())
    }

    pub fn kaelion_entropy(&self, lambda: f64) -> f64 {
        kaelion_entropy(self.area(), lambda)
    }

    /// `(S_K - S_BH) / S_BH`.
    pub fn correction_fraction(&self, lambda: f64) -> f64 {
        let s_bh = self.standard_entropy();
        (self.kaelion_entropy(lambda) - s_bh) / s_bh
    }

    /// Relative quasinormal-mode frequency shift `δω/ω ≈ α·ln A / A`.
    pub fn qnm_correction(&self, lambda: f64) -> f64 {
        let a = self.area();
        alpha_from_lambda(lambda) * a.ln() / a
    }

    /// Damped ringdown strain `h(t) = exp(-t/τ)·cos(ωt)` with the base
    /// frequency `1/M` and damping time `10M` shifted by the QNM correction.
    pub fn ringdown(&self, t: f64, lambda: f64) -> f64 {
        let omega_0 = 1.0 / self.mass;
        let tau_0 = 10.0 * self.mass;
        let delta = self.qnm_correction(lambda);
        let omega = omega_0 * (1.0 + delta);
        let tau = tau_0 * (1.0 - delta);
        (-t / tau).exp() * (omega * t).cos()
    }
}

/// Size of the log correction relative to the leading area term.
pub fn correction_size(mass: f64, lambda: f64) -> f64 {
    let a = BlackHole::new(mass).area();
    (alpha_from_lambda(lambda) * a.ln() / (a / 4.0)).abs()
}

/// SNR needed to resolve a relative correction at `confidence` sigma.
pub fn snr_required(correction: f64, confidence: f64) -> f64 {
    confidence / correction
}

/// Detectability verdict for one mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detectability {
    pub mass: f64,
    pub correction: f64,
    pub snr_needed: f64,
    pub detectable: bool,
}

pub fn detectability(mass: f64, lambda: f64, current_snr: f64) -> Detectability {
    let correction = correction_size(mass, lambda);
    let snr_needed = snr_required(correction, DETECTION_CONFIDENCE);
    Detectability {
        mass,
        correction,
        snr_needed,
        detectable: current_snr > snr_needed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_solar_mass_area_and_entropy() {
        let bh = BlackHole::new(30.0);
        assert!((bh.area() - 45_238.934).abs() < 1e-3);
        assert!((bh.standard_entropy() - 11_309.734).abs() < 1e-3);
        // Correction is negative for every λ in [0, 1].
        for lam in [0.0, 0.5, 1.0] {
            assert!(bh.correction_fraction(lam) < 0.0);
        }
    }

    #[test]
    fn correction_shrinks_with_mass() {
        let small = correction_size(10.0, 0.5);
        let large = correction_size(1e6, 0.5);
        assert!(small > large);
        assert!(large < 1e-9);
    }

    #[test]
    fn nothing_detectable_at_current_snr() {
        for m in [10.0, 30.0, 100.0, 1000.0, 1e6] {
            let d = detectability(m, 0.5, CURRENT_GW_SNR);
            assert!(!d.detectable, "mass {m} unexpectedly detectable");
            assert!(d.snr_needed > CURRENT_GW_SNR);
        }
    }

    #[test]
    fn ringdown_starts_at_unit_strain() {
        let bh = BlackHole::new(30.0);
        assert!((bh.ringdown(0.0, 0.0) - 1.0).abs() < 1e-15);
        assert!(bh.ringdown(50.0, 1.0).abs() < 1.0);
    }
}
