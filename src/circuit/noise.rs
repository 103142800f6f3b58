//! Noise amplification for zero-noise extrapolation, and the local noise model.

use std::f64::consts::PI;

use rand::Rng;

use crate::circuit::builder::Circuit;
use crate::circuit::gates::Gate;
use crate::error::AppError;
use crate::math::fit_line;

/// Fold every CX and CZ: each is followed by `factor − 1` identity pairs of itself.
pub fn amplify_noise(circuit: &Circuit, factor: u32) -> Result<Circuit, AppError> {
    if factor == 0 {
        return Err(AppError::config("Noise factor must be at least 1."));
    }
    let mut out = Circuit::new(circuit.num_qubits);
    for g in &circuit.gates {
        out.push(*g);
        if matches!(g, Gate::Cx { .. } | Gate::Cz(..)) {
            for _ in 1..factor {
                out.push(*g).push(*g);
            }
        }
    }
    Ok(out)
}

/// Linear extrapolation of `values(factor)` to factor 0, clamped to `[0, 1]`.
pub fn zne_extrapolate(factors: &[f64], values: &[f64]) -> Result<f64, AppError> {
    let line = fit_line(factors, values)?;
    Ok(line.intercept.clamp(0.0, 1.0))
}

/// Error rates applied by the local sampler.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NoiseModel {
    /// Probability that a measured bit is flipped.
    pub readout_error: f64,
    /// Probability of a uniformly random Pauli on each qubit after a two-qubit gate.
    pub two_qubit_error: f64,
}

impl NoiseModel {
    pub fn validate(&self) -> Result<(), AppError> {
        for (name, p) in [
            ("readout error", self.readout_error),
            ("two-qubit error", self.two_qubit_error),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(AppError::config(format!("{name} must lie in [0, 1], got {p}.")));
            }
        }
        Ok(())
    }

    pub fn is_ideal(&self) -> bool {
        self.readout_error == 0.0 && self.two_qubit_error == 0.0
    }

    pub fn has_gate_noise(&self) -> bool {
        self.two_qubit_error > 0.0
    }

    /// One stochastic realization of the circuit with Pauli errors inserted.
    pub fn noisy_trajectory<R: Rng + ?Sized>(&self, circuit: &Circuit, rng: &mut R) -> Circuit {
        let mut out = Circuit::new(circuit.num_qubits);
        for g in &circuit.gates {
            out.push(*g);
            if g.is_two_qubit() {
                for q in g.qubits() {
                    if rng.gen_bool(self.two_qubit_error) {
                        out.push(random_pauli(q, rng));
                    }
                }
            }
        }
        out
    }

    /// Flip each bit of a measured bitstring with the readout error probability.
    pub fn corrupt_readout<R: Rng + ?Sized>(&self, bits: &str, rng: &mut R) -> String {
        if self.readout_error == 0.0 {
            return bits.to_string();
        }
        bits.chars()
            .map(|b| {
                if rng.gen_bool(self.readout_error) {
                    if b == '0' { '1' } else { '0' }
                } else {
                    b
                }
            })
            .collect()
    }
}

fn random_pauli<R: Rng + ?Sized>(q: usize, rng: &mut R) -> Gate {
    match rng.gen_range(0..3) {
        0 => Gate::X(q),
        // Y up to global phase.
        1 => Gate::Ry(q, PI),
        _ => Gate::Z(q),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn two_cx() -> Circuit {
        let mut c = Circuit::new(2);
        c.push(Gate::H(0))
            .push(Gate::Cx { control: 0, target: 1 })
            .push(Gate::Cz(0, 1));
        c
    }

    #[test]
    fn factor_one_is_unchanged() {
        let c = two_cx();
        assert_eq!(amplify_noise(&c, 1).unwrap(), c);
    }

    #[test]
    fn factor_three_adds_two_pairs_per_entangler() {
        let c = amplify_noise(&two_cx(), 3).unwrap();
        assert_eq!(c.two_qubit_count(), 2 * 5);
        assert_eq!(c.gate_count(), 1 + 10);
    }

    #[test]
    fn zero_factor_is_rejected() {
        assert_eq!(amplify_noise(&two_cx(), 0).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn extrapolation_takes_the_intercept() {
        let v = zne_extrapolate(&[1.0, 2.0, 3.0], &[0.5, 0.4, 0.3]).unwrap();
        assert!((v - 0.6).abs() < 1e-12);
    }

    #[test]
    fn extrapolation_is_clamped() {
        let v = zne_extrapolate(&[1.0, 2.0, 3.0], &[0.9, 0.6, 0.3]).unwrap();
        assert_eq!(v, 1.0);
    }

    #[test]
    fn certain_readout_error_flips_every_bit() {
        let model = NoiseModel {
            readout_error: 1.0,
            two_qubit_error: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(model.corrupt_readout("0011", &mut rng), "1100");
    }

    #[test]
    fn out_of_range_rates_are_rejected() {
        let model = NoiseModel {
            readout_error: 1.5,
            two_qubit_error: 0.0,
        };
        assert!(model.validate().is_err());
    }
}
