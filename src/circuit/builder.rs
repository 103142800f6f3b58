//! Circuit container and the OTOC circuit families.
//!
//! Every OTOC circuit has the same skeleton on `n` qubits:
//!
//! ```text
//! H(0) X(0) | U | Z(n-1) | U† | X(0) | measure all
//! ```
//!
//! so the probability of reading `0…0` is the OTOC value `F(d)` at depth `d`.
//! Families only differ in the forward evolution `U`.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::circuit::gates::Gate;
use crate::domain::CircuitFamily;
use crate::error::AppError;

/// Register size used throughout the campaign.
pub const DEFAULT_QUBITS: usize = 4;
/// Kicked-Ising coupling and transverse field.
pub const ISING_J: f64 = 0.9;
pub const ISING_H: f64 = 0.7;
/// Floquet drive angles.
pub const FLOQUET_THETA: f64 = 0.8;
pub const FLOQUET_PHI: f64 = 1.2;
/// Above this, the dense statevector no longer fits comfortably in memory.
pub const MAX_QUBITS: usize = 20;

/// Ordered gate list on `num_qubits` qubits; all qubits are measured at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    pub num_qubits: usize,
    pub gates: Vec<Gate>,
}

impl Circuit {
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            gates: Vec::new(),
        }
    }

    pub fn push(&mut self, gate: Gate) -> &mut Self {
        self.gates.push(gate);
        self
    }

    pub fn append(&mut self, other: &Circuit) -> &mut Self {
        self.gates.extend_from_slice(&other.gates);
        self
    }

    /// Reverse order, invert every gate.
    pub fn inverse(&self) -> Circuit {
        Circuit {
            num_qubits: self.num_qubits,
            gates: self.gates.iter().rev().map(Gate::inverse).collect(),
        }
    }

    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    pub fn two_qubit_count(&self) -> usize {
        self.gates.iter().filter(|g| g.is_two_qubit()).count()
    }

    /// Number of layers when every gate is scheduled as early as possible.
    pub fn depth(&self) -> usize {
        let mut level = vec![0usize; self.num_qubits];
        for g in &self.gates {
            let qs = g.qubits();
            let next = qs.iter().map(|&q| level[q]).max().unwrap_or(0) + 1;
            for q in qs {
                level[q] = next;
            }
        }
        level.into_iter().max().unwrap_or(0)
    }

    /// Check every gate addresses a qubit inside the register.
    pub fn validate(&self) -> Result<(), AppError> {
        for g in &self.gates {
            let qs = g.qubits();
            if let Some(q) = qs.iter().find(|&&q| q >= self.num_qubits) {
                return Err(AppError::config(format!(
                    "Gate {} addresses qubit {q} on a {}-qubit register.",
                    g.name(),
                    self.num_qubits
                )));
            }
            if qs.len() == 2 && qs[0] == qs[1] {
                return Err(AppError::config(format!(
                    "Two-qubit gate {} uses qubit {} twice.",
                    g.name(),
                    qs[0]
                )));
            }
        }
        Ok(())
    }
}

/// Parameters of one OTOC circuit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OtocSpec {
    pub family: CircuitFamily,
    pub num_qubits: usize,
    pub depth: usize,
    pub seed: u64,
    /// Reuse `seed` for every depth (the v1 campaign did this by mistake).
    pub legacy_seed: bool,
}

impl OtocSpec {
    pub fn new(family: CircuitFamily, depth: usize, seed: u64) -> Self {
        Self {
            family,
            num_qubits: DEFAULT_QUBITS,
            depth,
            seed,
            legacy_seed: false,
        }
    }

    /// Seed for the random angles of this depth.
    pub fn layer_seed(&self) -> u64 {
        if self.legacy_seed {
            self.seed
        } else {
            self.seed.wrapping_add(100 * self.depth as u64)
        }
    }
}

/// Forward evolution `U` for a family.
pub fn forward_evolution(spec: &OtocSpec) -> Result<Circuit, AppError> {
    let n = spec.num_qubits;
    if n < 2 {
        return Err(AppError::config("OTOC circuits need at least two qubits."));
    }
    if n > MAX_QUBITS {
        return Err(AppError::config(format!(
            "{n} qubits exceeds the simulator limit of {MAX_QUBITS}."
        )));
    }

    let mut rng = StdRng::seed_from_u64(spec.layer_seed());
    let mut u = Circuit::new(n);
    for _ in 0..spec.depth {
        match spec.family {
            CircuitFamily::Chaotic => {
                for q in 0..n {
                    let theta = rng.gen_range(0.0..2.0 * PI);
                    let phi = rng.gen_range(0.0..2.0 * PI);
                    u.push(Gate::U {
                        qubit: q,
                        theta,
                        phi,
                        lambda: 0.0,
                    });
                }
                cx_chain(&mut u);
                u.push(Gate::Cx {
                    control: n - 1,
                    target: 0,
                });
            }
            CircuitFamily::Integrable => {
                for q in 0..n {
                    u.push(Gate::H(q));
                }
                cx_chain(&mut u);
            }
            CircuitFamily::Intermediate => {
                for q in 0..n {
                    u.push(Gate::H(q)).push(Gate::T(q));
                }
                cx_chain(&mut u);
            }
            CircuitFamily::KickedIsing => {
                for q in 0..n {
                    u.push(Gate::Rx(q, 2.0 * ISING_H));
                }
                rzz_ring(&mut u, 2.0 * ISING_J);
            }
            CircuitFamily::Syk => {
                for q in 0..n {
                    let theta = rng.gen_range(0.0..PI);
                    let phi = rng.gen_range(0.0..2.0 * PI);
                    u.push(Gate::U {
                        qubit: q,
                        theta,
                        phi,
                        lambda: 0.0,
                    });
                }
                for i in 0..n {
                    for j in (i + 1)..n {
                        let coupling = rng.gen_range(0.5..1.5);
                        u.push(Gate::Rzz(i, j, 2.0 * coupling));
                    }
                }
            }
            CircuitFamily::Floquet => {
                for q in 0..n {
                    u.push(Gate::Rx(q, 2.0 * FLOQUET_THETA))
                        .push(Gate::Ry(q, 2.0 * FLOQUET_PHI));
                }
                rzz_ring(&mut u, 2.0 * ISING_J);
                for q in (0..n - 1).step_by(2) {
                    u.push(Gate::Cz(q, q + 1));
                }
            }
        }
    }
    Ok(u)
}

/// Full OTOC circuit: preparation, `U`, `W = Z(n−1)`, `U†`, `V† = X(0)`.
pub fn build_otoc(spec: &OtocSpec) -> Result<Circuit, AppError> {
    let u = forward_evolution(spec)?;
    let n = spec.num_qubits;

    let mut qc = Circuit::new(n);
    qc.push(Gate::H(0)).push(Gate::X(0));
    qc.append(&u);
    qc.push(Gate::Z(n - 1));
    qc.append(&u.inverse());
    qc.push(Gate::X(0));
    Ok(qc)
}

/// Readout calibration pair: measure `|0…0⟩`, and `|1…1⟩` prepared with X on all.
pub fn calibration_circuits(num_qubits: usize) -> (Circuit, Circuit) {
    let zero = Circuit::new(num_qubits);
    let mut one = Circuit::new(num_qubits);
    for q in 0..num_qubits {
        one.push(Gate::X(q));
    }
    (zero, one)
}

fn cx_chain(c: &mut Circuit) {
    for q in 0..c.num_qubits - 1 {
        c.push(Gate::Cx {
            control: q,
            target: q + 1,
        });
    }
}

fn rzz_ring(c: &mut Circuit, theta: f64) {
    let n = c.num_qubits;
    for q in 0..n - 1 {
        c.push(Gate::Rzz(q, q + 1, theta));
    }
    c.push(Gate::Rzz(n - 1, 0, theta));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_changes_the_random_layers() {
        let a = forward_evolution(&OtocSpec::new(CircuitFamily::Chaotic, 2, 42)).unwrap();
        let b = forward_evolution(&OtocSpec::new(CircuitFamily::Chaotic, 4, 42)).unwrap();
        // Fresh seeds per depth: the first layer differs.
        assert_ne!(a.gates[0], b.gates[0]);
    }

    #[test]
    fn legacy_seed_shares_the_first_layer() {
        let spec = |d| OtocSpec {
            legacy_seed: true,
            ..OtocSpec::new(CircuitFamily::Chaotic, d, 42)
        };
        let a = forward_evolution(&spec(2)).unwrap();
        let b = forward_evolution(&spec(4)).unwrap();
        assert_eq!(a.gates[..4], b.gates[..4]);
    }

    #[test]
    fn layer_seed_ignores_depth_in_legacy_mode() {
        let per_depth = OtocSpec::new(CircuitFamily::Chaotic, 3, 42);
        assert_eq!(per_depth.layer_seed(), 342);
        let legacy = OtocSpec {
            legacy_seed: true,
            ..per_depth
        };
        assert_eq!(legacy.layer_seed(), 42);
    }

    #[test]
    fn chaotic_layer_has_closing_cx() {
        let u = forward_evolution(&OtocSpec::new(CircuitFamily::Chaotic, 1, 42)).unwrap();
        assert_eq!(u.gate_count(), 4 + 3 + 1);
        assert_eq!(u.gates.last(), Some(&Gate::Cx { control: 3, target: 0 }));
    }

    #[test]
    fn syk_couples_every_pair() {
        let u = forward_evolution(&OtocSpec::new(CircuitFamily::Syk, 1, 7)).unwrap();
        assert_eq!(u.two_qubit_count(), 6);
    }

    #[test]
    fn otoc_skeleton_wraps_forward_evolution() {
        let spec = OtocSpec::new(CircuitFamily::Integrable, 3, 42);
        let qc = build_otoc(&spec).unwrap();
        let u = forward_evolution(&spec).unwrap();
        assert_eq!(qc.gate_count(), 2 + 2 * u.gate_count() + 2);
        assert!(qc.validate().is_ok());
    }

    #[test]
    fn single_qubit_register_is_rejected() {
        let spec = OtocSpec {
            num_qubits: 1,
            ..OtocSpec::new(CircuitFamily::Chaotic, 1, 1)
        };
        assert_eq!(build_otoc(&spec).unwrap_err().exit_code(), 2);
    }
}
