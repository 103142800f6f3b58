//! Dense statevector simulation.
//!
//! Amplitudes are indexed little-endian: qubit `q` is bit `q` of the basis
//! index, so the bitstring of index `i` printed in binary has qubit `n−1`
//! leftmost (the same convention as the cloud sampler's counts).

use num_complex::Complex64;
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

use crate::circuit::builder::{Circuit, MAX_QUBITS};
use crate::circuit::gates::{Gate, Matrix2};
use crate::domain::Counts;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    num_qubits: usize,
    amps: Vec<Complex64>,
}

impl Statevector {
    /// `|0…0⟩` on `num_qubits` qubits.
    pub fn zero(num_qubits: usize) -> Result<Self, AppError> {
        if num_qubits == 0 || num_qubits > MAX_QUBITS {
            return Err(AppError::config(format!(
                "Statevector size must be between 1 and {MAX_QUBITS} qubits, got {num_qubits}."
            )));
        }
        let mut amps = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amps[0] = Complex64::new(1.0, 0.0);
        Ok(Self { num_qubits, amps })
    }

    /// Run `circuit` from `|0…0⟩`.
    pub fn from_circuit(circuit: &Circuit) -> Result<Self, AppError> {
        circuit.validate()?;
        let mut sv = Self::zero(circuit.num_qubits)?;
        for g in &circuit.gates {
            sv.apply(g);
        }
        Ok(sv)
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amps
    }

    pub fn apply(&mut self, gate: &Gate) {
        if let Some(m) = gate.matrix() {
            self.apply_single(gate.qubits()[0], &m);
            return;
        }
        match *gate {
            Gate::Cx { control, target } => {
                let (cb, tb) = (1 << control, 1 << target);
                for i in 0..self.amps.len() {
                    if i & cb != 0 && i & tb == 0 {
                        self.amps.swap(i, i | tb);
                    }
                }
            }
            Gate::Cz(a, b) => {
                let mask = (1 << a) | (1 << b);
                for (i, amp) in self.amps.iter_mut().enumerate() {
                    if i & mask == mask {
                        *amp = -*amp;
                    }
                }
            }
            Gate::Rzz(a, b, theta) => {
                let even = Complex64::from_polar(1.0, -theta / 2.0);
                let odd = Complex64::from_polar(1.0, theta / 2.0);
                for (i, amp) in self.amps.iter_mut().enumerate() {
                    let parity = ((i >> a) ^ (i >> b)) & 1;
                    *amp *= if parity == 0 { even } else { odd };
                }
            }
            Gate::Swap(a, b) => {
                let (ab, bb) = (1 << a, 1 << b);
                for i in 0..self.amps.len() {
                    if i & ab != 0 && i & bb == 0 {
                        self.amps.swap(i, (i & !ab) | bb);
                    }
                }
            }
            _ => unreachable!("single-qubit gates are handled through their matrix"),
        }
    }

    fn apply_single(&mut self, q: usize, m: &Matrix2) {
        let bit = 1 << q;
        for i in 0..self.amps.len() {
            if i & bit == 0 {
                let a0 = self.amps[i];
                let a1 = self.amps[i | bit];
                self.amps[i] = m[0][0] * a0 + m[0][1] * a1;
                self.amps[i | bit] = m[1][0] * a0 + m[1][1] * a1;
            }
        }
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.amps.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Probability of measuring basis state `index`.
    pub fn probability(&self, index: usize) -> f64 {
        self.amps.get(index).map(|a| a.norm_sqr()).unwrap_or(0.0)
    }

    /// Draw `shots` measurements of every qubit.
    pub fn sample<R: Rng + ?Sized>(&self, shots: u64, rng: &mut R) -> Result<Counts, AppError> {
        let dist = WeightedIndex::new(self.probabilities())
            .map_err(|e| AppError::numeric(format!("Invalid outcome distribution: {e}")))?;
        let mut hist = vec![0u64; self.amps.len()];
        for _ in 0..shots {
            hist[dist.sample(rng)] += 1;
        }
        Ok(hist
            .into_iter()
            .enumerate()
            .filter(|(_, c)| *c > 0)
            .map(|(i, c)| (bitstring(i, self.num_qubits), c))
            .collect())
    }
}

/// Binary label of basis index `index`, qubit `n−1` leftmost.
pub fn bitstring(index: usize, num_qubits: usize) -> String {
    format!("{index:0num_qubits$b}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::builder::{OtocSpec, build_otoc};
    use crate::domain::CircuitFamily;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn assert_is_zero_state(sv: &Statevector) {
        assert!((sv.probability(0) - 1.0).abs() < 1e-10, "p0 = {}", sv.probability(0));
    }

    #[test]
    fn every_gate_followed_by_its_inverse_is_identity() {
        let gates = [
            Gate::H(0),
            Gate::X(1),
            Gate::Z(2),
            Gate::S(0),
            Gate::T(1),
            Gate::Sx(2),
            Gate::Rx(0, 0.3),
            Gate::Ry(1, 1.7),
            Gate::Rz(2, -0.9),
            Gate::U {
                qubit: 1,
                theta: 2.1,
                phi: 0.4,
                lambda: -1.3,
            },
            Gate::Cx { control: 0, target: 2 },
            Gate::Cz(1, 2),
            Gate::Rzz(0, 1, 1.1),
            Gate::Swap(0, 2),
        ];
        // Scramble first so the identity check is not trivially about |000⟩.
        let mut prep = Circuit::new(3);
        prep.push(Gate::H(0))
            .push(Gate::Ry(1, 0.8))
            .push(Gate::Cx { control: 0, target: 2 })
            .push(Gate::T(2));
        for g in gates {
            let mut c = prep.clone();
            c.push(g).push(g.inverse());
            c.append(&prep.inverse());
            let sv = Statevector::from_circuit(&c).unwrap();
            assert_is_zero_state(&sv);
        }
    }

    #[test]
    fn bell_state_probabilities() {
        let mut c = Circuit::new(2);
        c.push(Gate::H(0)).push(Gate::Cx { control: 0, target: 1 });
        let p = Statevector::from_circuit(&c).unwrap().probabilities();
        assert!((p[0] - 0.5).abs() < 1e-12);
        assert!((p[3] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn depth_zero_otoc_leaves_qubit_zero_in_superposition() {
        let qc = build_otoc(&OtocSpec::new(CircuitFamily::Chaotic, 0, 42)).unwrap();
        let sv = Statevector::from_circuit(&qc).unwrap();
        assert!((sv.probability(0) - 0.5).abs() < 1e-12);
        assert!((sv.probability(1) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn sampling_matches_shot_total_and_labels() {
        let mut c = Circuit::new(3);
        c.push(Gate::X(0));
        let sv = Statevector::from_circuit(&c).unwrap();
        let counts = sv.sample(100, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(counts.get("001"), Some(&100));
    }

    #[test]
    fn oversized_register_is_rejected() {
        assert!(Statevector::zero(MAX_QUBITS + 1).is_err());
    }
}
