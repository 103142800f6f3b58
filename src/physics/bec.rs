//! Acoustic black hole in a flowing Bose–Einstein condensate.
//!
//! A horizon forms where the flow velocity exceeds the speed of sound. All
//! quantities are in natural units (`ħ = k_B = 1`).

use std::f64::consts::PI;

use crate::physics::entropy::kaelion_entropy;

/// Healing length used in the surface-gravity estimate.
pub const HEALING_LENGTH: f64 = 0.1;

/// Central charge of the 1D boundary theory in the entanglement estimate.
pub const CENTRAL_CHARGE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BecAnalog {
    pub sound_speed: f64,
    pub flow_velocity: f64,
}

impl BecAnalog {
    pub fn new(sound_speed: f64, flow_velocity: f64) -> Self {
        Self {
            sound_speed,
            flow_velocity,
        }
    }

    pub fn has_horizon(&self) -> bool {
        self.flow_velocity > self.sound_speed
    }

    /// `κ ≈ (v - c) / ξ`, zero when the flow stays subsonic.
    pub fn surface_gravity(&self) -> f64 {
        if !self.has_horizon() {
            return 0.0;
        }
        (self.flow_velocity - self.sound_speed) / HEALING_LENGTH
    }

    /// `T_H = κ / 2π`.
    pub fn hawking_temperature(&self) -> f64 {
        self.surface_gravity() / (2.0 * PI)
    }

    /// In the quasi-1D geometry the horizon "area" is its transverse width.
    pub fn horizon_perimeter(&self, width: f64) -> f64 {
        width
    }

    pub fn entropy_kaelion(&self, lambda: f64, width: f64) -> f64 {
        kaelion_entropy(self.horizon_perimeter(width), lambda)
    }
}

/// 1D area law with log correction, `S = (c/3)·ln(L + 1)`.
pub fn entanglement_entropy(subsystem_size: f64) -> f64 {
    (CENTRAL_CHARGE / 3.0) * (subsystem_size + 1.0).ln()
}

/// Bose–Einstein occupation `1 / (exp(ω/T) - 1)`.
///
/// Returns `0` for a non-positive temperature (no horizon, no radiation).
pub fn planck_occupation(omega: f64, temperature: f64) -> f64 {
    if temperature <= 0.0 {
        return 0.0;
    }
    1.0 / (omega / temperature).exp_m1()
}

/// Model flow profile across the horizon, `v(x) = 1.5·(1 + 0.3·tanh x)`.
pub fn flow_profile(x: f64) -> f64 {
    1.5 * (1.0 + 0.3 * x.tanh())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_condensate_has_horizon() {
        let bec = BecAnalog::new(1.0, 1.5);
        assert!(bec.has_horizon());
        assert!((bec.surface_gravity() - 5.0).abs() < 1e-12);
        assert!((bec.hawking_temperature() - 0.795_774_7).abs() < 1e-6);
    }

    #[test]
    fn subsonic_flow_is_cold() {
        let bec = BecAnalog::new(1.0, 0.8);
        assert!(!bec.has_horizon());
        assert_eq!(bec.surface_gravity(), 0.0);
        assert_eq!(planck_occupation(1.0, bec.hawking_temperature()), 0.0);
    }

    #[test]
    fn occupation_decreases_with_frequency() {
        let t = 0.8;
        assert!(planck_occupation(0.1, t) > planck_occupation(1.0, t));
        assert!(planck_occupation(5.0, t) > 0.0);
    }

    #[test]
    fn horizon_entropy_uses_the_width_as_area() {
        let bec = BecAnalog::new(1.0, 1.5);
        assert_eq!(bec.horizon_perimeter(4.0), 4.0);
        let s = bec.entropy_kaelion(1.0, 4.0);
        assert!((s - (1.0 - 1.5 * 4.0_f64.ln())).abs() < 1e-12);
        assert!(bec.entropy_kaelion(0.0, 4.0) > s);
    }

    #[test]
    fn entanglement_grows_logarithmically() {
        assert_eq!(entanglement_entropy(0.0), 0.0);
        assert!((entanglement_entropy(std::f64::consts::E - 1.0) - 1.0 / 3.0).abs() < 1e-12);
    }
}
