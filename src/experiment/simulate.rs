//! Noise-free OTOC curves from the statevector simulator, compared with the
//! values recorded on hardware.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::circuit::{DEFAULT_QUBITS, OtocSpec, Statevector, build_otoc};
use crate::data::recorded;
use crate::domain::{CircuitFamily, CountsMode, DEFAULT_DEPTHS, OtocSeries, RunRecord};
use crate::error::AppError;
use crate::experiment::{FamilyFit, otoc_from_counts};
use crate::fit::{DEFAULT_T_EFF, FitOptions};

pub const DEFAULT_SIM_SHOTS: u64 = 100_000;

#[derive(Debug, Clone)]
pub struct SimulateConfig {
    pub families: Vec<CircuitFamily>,
    pub depths: Vec<usize>,
    pub num_qubits: usize,
    pub seed: u64,
    pub legacy_seed: bool,
    pub mode: CountsMode,
    pub shots: u64,
    pub t_eff: f64,
}

impl Default for SimulateConfig {
    fn default() -> Self {
        Self {
            families: CircuitFamily::baseline().to_vec(),
            depths: DEFAULT_DEPTHS.to_vec(),
            num_qubits: DEFAULT_QUBITS,
            seed: 42,
            legacy_seed: false,
            mode: CountsMode::Sampled,
            shots: DEFAULT_SIM_SHOTS,
            t_eff: DEFAULT_T_EFF,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedFamily {
    pub result: FamilyFit,
    /// λ_K recorded on hardware for the same family, when there is one.
    pub hardware_lambda: Option<f64>,
}

impl SimulatedFamily {
    pub fn lambda_gap(&self) -> Option<f64> {
        let ideal = self.result.estimate()?.lambda_k;
        Some((ideal - self.hardware_lambda?).abs())
    }
}

#[derive(Debug, Clone)]
pub struct SimulateReport {
    pub mode: CountsMode,
    pub shots: u64,
    pub num_qubits: usize,
    pub families: Vec<SimulatedFamily>,
}

impl SimulateReport {
    pub fn record(&self) -> RunRecord {
        let mut rec = RunRecord::new("simulate");
        rec.backend = Some("local_statevector".to_string());
        rec.scalar("num_qubits", self.num_qubits as f64);
        if self.mode == CountsMode::Sampled {
            rec.scalar("shots", self.shots as f64);
        }
        for f in &self.families {
            rec.series.push(f.result.record(f.result.series.family.display_name()));
        }
        rec
    }
}

fn validate(cfg: &SimulateConfig) -> Result<(), AppError> {
    if cfg.families.is_empty() {
        return Err(AppError::config("Select at least one circuit family."));
    }
    if cfg.depths.is_empty() {
        return Err(AppError::config("Select at least one depth."));
    }
    if cfg.num_qubits < 2 {
        return Err(AppError::config("OTOC circuits need at least 2 qubits."));
    }
    if cfg.mode == CountsMode::Sampled && cfg.shots == 0 {
        return Err(AppError::config("Shots must be > 0."));
    }
    if !(cfg.t_eff > 0.0) {
        return Err(AppError::config("Effective temperature must be > 0."));
    }
    Ok(())
}

/// OTOC of a single circuit: exact `P(0…0)` or its sampled estimate.
fn otoc_point(spec: &OtocSpec, mode: CountsMode, shots: u64, sample_seed: u64) -> Result<f64, AppError> {
    let circuit = build_otoc(spec)?;
    let state = Statevector::from_circuit(&circuit)?;
    match mode {
        CountsMode::Exact => Ok(state.probability(0)),
        CountsMode::Sampled => {
            let mut rng = StdRng::seed_from_u64(sample_seed);
            let counts = state.sample(shots, &mut rng)?;
            Ok(otoc_from_counts(&counts, spec.num_qubits))
        }
    }
}

/// OTOC values of one family at every depth. Depths run in parallel; the
/// result is identical to a sequential sweep.
pub fn simulate_family(
    family: CircuitFamily,
    cfg: &SimulateConfig,
) -> Result<OtocSeries, AppError> {
    let values = cfg
        .depths
        .par_iter()
        .map(|&depth| {
            let spec = OtocSpec {
                family,
                num_qubits: cfg.num_qubits,
                depth,
                seed: cfg.seed,
                legacy_seed: cfg.legacy_seed,
            };
            otoc_point(&spec, cfg.mode, cfg.shots, cfg.seed.wrapping_add(depth as u64))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(OtocSeries::new(family, &cfg.depths, values))
}

pub fn run(cfg: &SimulateConfig) -> Result<SimulateReport, AppError> {
    validate(cfg)?;
    let opts = FitOptions::hardware_decay();

    let mut families = Vec::with_capacity(cfg.families.len());
    for &family in &cfg.families {
        let series = simulate_family(family, cfg)?;
        tracing::info!(
            family = family.display_name(),
            points = series.len(),
            "ideal simulation finished"
        );
        families.push(SimulatedFamily {
            result: FamilyFit::new(series, &opts, cfg.t_eff),
            hardware_lambda: recorded(family).map(|r| r.lambda_k),
        });
    }

    Ok(SimulateReport {
        mode: cfg.mode,
        shots: cfg.shots,
        num_qubits: cfg.num_qubits,
        families,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(mode: CountsMode) -> SimulateConfig {
        SimulateConfig {
            depths: vec![1, 2, 4, 6],
            mode,
            shots: 2000,
            ..SimulateConfig::default()
        }
    }

    #[test]
    fn exact_values_are_probabilities() {
        let series = simulate_family(CircuitFamily::Chaotic, &small(CountsMode::Exact)).unwrap();
        assert_eq!(series.len(), 4);
        assert!(series.values.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn parallel_sweep_matches_point_by_point() {
        let cfg = small(CountsMode::Exact);
        let series = simulate_family(CircuitFamily::Intermediate, &cfg).unwrap();
        for (i, &depth) in cfg.depths.iter().enumerate() {
            let spec = OtocSpec::new(CircuitFamily::Intermediate, depth, cfg.seed);
            let v = otoc_point(&spec, CountsMode::Exact, 0, 0).unwrap();
            assert!((series.values[i] - v).abs() < 1e-12);
        }
    }

    #[test]
    fn sampled_estimate_tracks_exact_probability() {
        let exact = simulate_family(CircuitFamily::Integrable, &small(CountsMode::Exact)).unwrap();
        let sampled = simulate_family(CircuitFamily::Integrable, &small(CountsMode::Sampled)).unwrap();
        for (e, s) in exact.values.iter().zip(&sampled.values) {
            // 2000 shots: a binomial standard error of at most ~0.011.
            assert!((e - s).abs() < 0.06, "exact {e} vs sampled {s}");
        }
    }

    #[test]
    fn baseline_families_are_compared_with_hardware() {
        let report = run(&small(CountsMode::Exact)).unwrap();
        assert_eq!(report.families.len(), 3);
        assert!(report.families.iter().all(|f| f.hardware_lambda.is_some()));
        let rec = report.record();
        assert_eq!(rec.series.len(), 3);
        assert!(!rec.scalars.contains_key("shots"));
    }

    #[test]
    fn non_baseline_family_has_no_hardware_reference() {
        let cfg = SimulateConfig {
            families: vec![CircuitFamily::KickedIsing],
            ..small(CountsMode::Exact)
        };
        let report = run(&cfg).unwrap();
        assert!(report.families[0].hardware_lambda.is_none());
        assert!(report.families[0].lambda_gap().is_none());
    }

    #[test]
    fn rejects_empty_depth_list() {
        let cfg = SimulateConfig {
            depths: Vec::new(),
            ..SimulateConfig::default()
        };
        assert_eq!(run(&cfg).unwrap_err().exit_code(), 2);
    }
}
