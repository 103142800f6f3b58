//! The sampler seam: run a batch of circuits, get back one histogram per circuit.
//!
//! The local implementation simulates the statevector (optionally with a
//! stochastic noise model); the cloud implementation lives in `crate::ibm`.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::circuit::builder::Circuit;
use crate::circuit::noise::NoiseModel;
use crate::circuit::statevector::Statevector;
use crate::circuit::transpile::{Target, transpile};
use crate::domain::Counts;
use crate::error::AppError;

/// Number of noisy trajectories the local sampler averages over.
const TRAJECTORIES: u64 = 128;

/// Histograms for one submitted batch.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerJob {
    pub counts: Vec<Counts>,
    /// Gate count of each circuit after lowering to the backend.
    pub transpiled_gates: Vec<usize>,
    pub job_id: Option<String>,
}

pub trait Sampler {
    fn backend_name(&self) -> &str;

    /// Execute every circuit with `shots` shots. `seed` only affects local sampling.
    fn run(&self, circuits: &[Circuit], shots: u64, seed: u64) -> Result<SamplerJob, AppError>;
}

/// Statevector sampler with an optional noise model.
#[derive(Debug, Clone)]
pub struct LocalSampler {
    name: String,
    noise: NoiseModel,
}

impl LocalSampler {
    pub fn ideal() -> Self {
        Self {
            name: "local_statevector".to_string(),
            noise: NoiseModel::default(),
        }
    }

    pub fn noisy(noise: NoiseModel) -> Result<Self, AppError> {
        noise.validate()?;
        let name = if noise.is_ideal() {
            "local_statevector".to_string()
        } else {
            format!(
                "local_noisy(readout={}, 2q={})",
                noise.readout_error, noise.two_qubit_error
            )
        };
        Ok(Self { name, noise })
    }

    fn run_one(&self, circuit: &Circuit, shots: u64, seed: u64) -> Result<Counts, AppError> {
        let mut rng = StdRng::seed_from_u64(seed);

        let raw = if self.noise.has_gate_noise() {
            let trajectories = TRAJECTORIES.min(shots.max(1));
            let mut merged = Counts::new();
            for k in 0..trajectories {
                let share = shots / trajectories + u64::from(k < shots % trajectories);
                if share == 0 {
                    continue;
                }
                let noisy = self.noise.noisy_trajectory(circuit, &mut rng);
                let counts = Statevector::from_circuit(&noisy)?.sample(share, &mut rng)?;
                for (bits, c) in counts {
                    *merged.entry(bits).or_insert(0) += c;
                }
            }
            merged
        } else {
            Statevector::from_circuit(circuit)?.sample(shots, &mut rng)?
        };

        if self.noise.readout_error == 0.0 {
            return Ok(raw);
        }
        let mut out = Counts::new();
        for (bits, c) in raw {
            for _ in 0..c {
                *out.entry(self.noise.corrupt_readout(&bits, &mut rng)).or_insert(0) += 1;
            }
        }
        Ok(out)
    }
}

impl Sampler for LocalSampler {
    fn backend_name(&self) -> &str {
        &self.name
    }

    fn run(&self, circuits: &[Circuit], shots: u64, seed: u64) -> Result<SamplerJob, AppError> {
        if shots == 0 {
            return Err(AppError::config("Shots must be > 0."));
        }

        let counts = circuits
            .par_iter()
            .enumerate()
            .map(|(i, c)| self.run_one(c, shots, seed.wrapping_add(i as u64)))
            .collect::<Result<Vec<_>, _>>()?;

        let transpiled_gates = circuits
            .iter()
            .map(|c| transpile(c, &Target::linear(c.num_qubits)).map(|t| t.gate_count()))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            backend = %self.name,
            circuits = circuits.len(),
            shots,
            "local sampler batch finished"
        );

        Ok(SamplerJob {
            counts,
            transpiled_gates,
            job_id: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::builder::{OtocSpec, build_otoc, calibration_circuits};
    use crate::domain::{CircuitFamily, probability_of, total_shots};

    #[test]
    fn ideal_sampler_is_deterministic_per_seed() {
        let qc = build_otoc(&OtocSpec::new(CircuitFamily::Chaotic, 2, 42)).unwrap();
        let s = LocalSampler::ideal();
        let a = s.run(std::slice::from_ref(&qc), 1000, 9).unwrap();
        let b = s.run(std::slice::from_ref(&qc), 1000, 9).unwrap();
        assert_eq!(a, b);
        assert_eq!(total_shots(&a.counts[0]), 1000);
    }

    #[test]
    fn readout_error_degrades_calibration() {
        let (zero, _) = calibration_circuits(4);
        let s = LocalSampler::noisy(NoiseModel {
            readout_error: 0.05,
            two_qubit_error: 0.0,
        })
        .unwrap();
        let job = s.run(&[zero], 4000, 1).unwrap();
        let fid = probability_of(&job.counts[0], "0000");
        // (1 - 0.05)^4 ≈ 0.81
        assert!(fid > 0.75 && fid < 0.87, "fidelity {fid}");
    }

    #[test]
    fn gate_noise_keeps_shot_total() {
        let qc = build_otoc(&OtocSpec::new(CircuitFamily::Integrable, 2, 42)).unwrap();
        let s = LocalSampler::noisy(NoiseModel {
            readout_error: 0.0,
            two_qubit_error: 0.02,
        })
        .unwrap();
        let job = s.run(&[qc], 1000, 5).unwrap();
        assert_eq!(total_shots(&job.counts[0]), 1000);
    }

    #[test]
    fn zero_shots_rejected() {
        let (zero, _) = calibration_circuits(2);
        assert!(LocalSampler::ideal().run(&[zero], 0, 0).is_err());
    }
}
