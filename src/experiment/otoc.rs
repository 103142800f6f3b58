//! OTOC measurement protocol: circuit catalogue, procedure and expected results.
//!
//! Nothing here touches a sampler. The expected-results table comes from
//! synthetic decays drawn from one seeded RNG, in scenario order.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::circuit::{Circuit, DEFAULT_QUBITS, OtocSpec, build_otoc, to_qasm3};
use crate::data::{OTOC_SCENARIOS, OtocScenario, SyntheticOtoc, synthetic_otoc};
use crate::domain::{CircuitFamily, RunRecord, SeriesRecord};
use crate::error::AppError;
use crate::fit::{DEFAULT_T_EFF, DecayFit, FitOptions, FitStatus, LambdaEstimate, fit_otoc_decay};

/// Gate palette and expected λ range of one circuit class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircuitConfig {
    pub name: &'static str,
    pub single_qubit: &'static [&'static str],
    pub two_qubit: &'static [&'static str],
    pub structure: &'static str,
    pub expected_lambda: (f64, f64),
}

pub const CIRCUIT_CONFIGS: [CircuitConfig; 3] = [
    CircuitConfig {
        name: "chaotic",
        single_qubit: &["RX", "RY", "RZ", "H"],
        two_qubit: &["CNOT", "CZ", "SWAP", "iSWAP"],
        structure: "random",
        expected_lambda: (0.7, 1.0),
    },
    CircuitConfig {
        name: "integrable",
        single_qubit: &["H", "S", "X", "Y", "Z"],
        two_qubit: &["CNOT", "CZ"],
        structure: "regular",
        expected_lambda: (0.0, 0.3),
    },
    CircuitConfig {
        name: "intermediate",
        single_qubit: &["H", "T", "RZ(π/8)"],
        two_qubit: &["CNOT", "CZ"],
        structure: "semi-random",
        expected_lambda: (0.3, 0.7),
    },
];

pub const MEASUREMENT_STEPS: [&str; 8] = [
    "1. Initialize |00...0>",
    "2. Apply V (local operator on qubit 0)",
    "3. Apply U(t) (forward evolution)",
    "4. Apply W (local operator on qubit n-1)",
    "5. Apply U(t)† (backward evolution)",
    "6. Apply V† (undo local operator)",
    "7. Measure all qubits",
    "8. Compute <ψ|final> for OTOC",
];

pub const REPETITIONS: &str = "1000-10000 shots per time point";
pub const TIME_POINTS: &str = "10-50 different depths";

pub const ANALYSIS_STEPS: [&str; 8] = [
    "1. Collect OTOC F(t) for multiple time points t",
    "2. Fit F(t) = A * exp(-λ_L * t) + B",
    "3. Extract λ_L (Lyapunov exponent)",
    "4. Compute effective temperature T from energy",
    "5. Calculate λ_Kaelion = λ_L / (2πT)",
    "6. Verify λ ∈ [0, 1]",
    "7. Compute α = -0.5 - λ",
    "8. Compare with entropy measurements (if available)",
];

#[derive(Debug, Clone)]
pub struct OtocProtocolConfig {
    pub seed: u64,
    pub t_eff: f64,
    pub synthetic: SyntheticOtoc,
    /// Family and depth of the circuit printed as OpenQASM.
    pub example_family: CircuitFamily,
    pub example_depth: usize,
    pub num_qubits: usize,
}

impl Default for OtocProtocolConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            t_eff: DEFAULT_T_EFF,
            synthetic: SyntheticOtoc::default(),
            example_family: CircuitFamily::Chaotic,
            example_depth: 2,
            num_qubits: DEFAULT_QUBITS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub scenario: OtocScenario,
    pub t: Vec<f64>,
    pub otoc: Vec<f64>,
    pub fit: FitStatus<(DecayFit, LambdaEstimate)>,
}

#[derive(Debug, Clone)]
pub struct OtocProtocolReport {
    pub t_eff: f64,
    pub scenarios: Vec<ScenarioResult>,
    pub example: Circuit,
    pub example_spec: OtocSpec,
    pub example_qasm: String,
}

pub fn run(cfg: &OtocProtocolConfig) -> Result<OtocProtocolReport, AppError> {
    if !(cfg.t_eff > 0.0) {
        return Err(AppError::config("Effective temperature must be > 0."));
    }
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let opts = FitOptions::protocol_decay();

    let mut scenarios = Vec::with_capacity(OTOC_SCENARIOS.len());
    for scenario in OTOC_SCENARIOS {
        let (t, otoc) = synthetic_otoc(&mut rng, scenario.lambda_l, &cfg.synthetic)?;
        let fit = FitStatus::from_result(
            fit_otoc_decay(&t, &otoc, &opts)
                .map(|f| (f.clone(), LambdaEstimate::from_lyapunov(f.lambda_l, cfg.t_eff))),
        );
        if let Some((_, est)) = fit.fitted() {
            tracing::debug!(
                scenario = scenario.name,
                lambda_l = est.lambda_l,
                lambda_k = est.lambda_k,
                "scenario fitted"
            );
        }
        scenarios.push(ScenarioResult {
            scenario,
            t,
            otoc,
            fit,
        });
    }

    let mut example_spec = OtocSpec::new(cfg.example_family, cfg.example_depth, cfg.seed);
    example_spec.num_qubits = cfg.num_qubits;
    let example = build_otoc(&example_spec)?;
    let example_qasm = to_qasm3(&example);

    Ok(OtocProtocolReport {
        t_eff: cfg.t_eff,
        scenarios,
        example,
        example_spec,
        example_qasm,
    })
}

impl OtocProtocolReport {
    pub fn record(&self) -> RunRecord {
        let mut rec = RunRecord::new("otoc");
        rec.scalar("t_eff", self.t_eff);
        for s in &self.scenarios {
            let est = s.fit.fitted().map(|(_, e)| *e);
            rec.series.push(SeriesRecord {
                label: s.scenario.name.to_string(),
                x: s.t.clone(),
                y: s.otoc.clone(),
                lambda_l: est.map(|e| e.lambda_l),
                lambda_k: est.map(|e| e.lambda_k),
                alpha: est.map(|e| e.alpha),
                fit_error: s.fit.failure().map(str::to_string),
            });
        }
        rec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenarios_keep_their_ordering_of_decay_rates() {
        let report = run(&OtocProtocolConfig::default()).unwrap();
        assert_eq!(report.scenarios.len(), 3);
        let lambdas: Vec<f64> = report
            .scenarios
            .iter()
            .map(|s| s.fit.fitted().unwrap().1.lambda_l)
            .collect();
        // Chaotic 2.5 > intermediate 1.2 > integrable 0.3.
        assert!(lambdas[0] > lambdas[1]);
        assert!(lambdas[1] > lambdas[2]);
        for s in &report.scenarios {
            let (_, est) = s.fit.fitted().unwrap();
            assert!((0.0..=1.0).contains(&est.lambda_k));
            assert!((est.alpha + 0.5 + est.lambda_k).abs() < 1e-12);
        }
    }

    #[test]
    fn same_seed_same_report() {
        let a = run(&OtocProtocolConfig::default()).unwrap();
        let b = run(&OtocProtocolConfig::default()).unwrap();
        assert_eq!(a.scenarios[1].otoc, b.scenarios[1].otoc);
        assert_eq!(a.example_qasm, b.example_qasm);
    }

    #[test]
    fn example_listing_is_openqasm3() {
        let report = run(&OtocProtocolConfig::default()).unwrap();
        assert!(report.example_qasm.starts_with("OPENQASM 3.0;"));
        assert_eq!(report.example.num_qubits, DEFAULT_QUBITS);
    }

    #[test]
    fn record_carries_one_series_per_scenario() {
        let rec = run(&OtocProtocolConfig::default()).unwrap().record();
        assert_eq!(rec.analysis, "otoc");
        assert_eq!(rec.series.len(), 3);
        assert!(rec.series.iter().all(|s| s.lambda_k.is_some()));
    }

    #[test]
    fn rejects_non_positive_temperature() {
        let cfg = OtocProtocolConfig {
            t_eff: 0.0,
            ..OtocProtocolConfig::default()
        };
        assert_eq!(run(&cfg).unwrap_err().exit_code(), 2);
    }
}
