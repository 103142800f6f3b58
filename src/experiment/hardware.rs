//! OTOC campaigns through a `Sampler`: the local simulator or a cloud backend.
//!
//! One campaign per backend:
//!
//! 1. optional readout calibration (`|0…0⟩` and `|1…1⟩`)
//! 2. `runs` repetitions, one sampler job per family and run
//! 3. optional zero-noise extrapolation on the first run's circuits
//! 4. verdicts: α relation, universality, stability, variability

use chrono::{DateTime, Utc};

use crate::circuit::{
    Circuit, DEFAULT_QUBITS, OtocSpec, Sampler, SamplerJob, amplify_noise, build_otoc,
    calibration_circuits, zne_extrapolate,
};
use crate::domain::{CircuitFamily, DEFAULT_DEPTHS, OtocSeries, RunRecord, probability_of};
use crate::error::AppError;
use crate::experiment::{FamilyFit, otoc_from_counts};
use crate::fit::{DEFAULT_T_EFF, FitOptions};
use crate::math::Summary;
use crate::physics::alpha_from_lambda;

pub const DEFAULT_HW_SHOTS: u64 = 4096;
/// Seed stride between repeated runs.
pub const RUN_SEED_STRIDE: u64 = 1000;
/// |α_measured − α_predicted| below which the relation counts as verified.
pub const ALPHA_MATCH_TOLERANCE: f64 = 0.01;
/// |Δλ| between two chaotic families below which they count as universal.
pub const UNIVERSALITY_TOLERANCE: f64 = 0.2;
/// Run-to-run std of λ above which hardware variability is "high".
pub const HIGH_VARIABILITY_STD: f64 = 0.1;
/// Floor on the reference spread in the stability comparison.
const MIN_REFERENCE_STD: f64 = 0.001;
/// Calibration fidelity required before the readout correction is applied.
const MIN_CALIBRATION_FIDELITY: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct HardwareConfig {
    pub families: Vec<CircuitFamily>,
    pub depths: Vec<usize>,
    pub num_qubits: usize,
    pub shots: u64,
    pub seed: u64,
    pub legacy_seed: bool,
    pub runs: usize,
    /// Reuse `seed` for every run so any spread comes from the device.
    pub fixed_seed: bool,
    pub calibrate: bool,
    pub zne_factors: Option<Vec<u32>>,
    pub t_eff: f64,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            families: CircuitFamily::baseline().to_vec(),
            depths: DEFAULT_DEPTHS.to_vec(),
            num_qubits: DEFAULT_QUBITS,
            shots: DEFAULT_HW_SHOTS,
            seed: 42,
            legacy_seed: false,
            runs: 1,
            fixed_seed: false,
            calibrate: false,
            zne_factors: None,
            t_eff: DEFAULT_T_EFF,
        }
    }
}

impl HardwareConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.families.is_empty() {
            return Err(AppError::config("Select at least one circuit family."));
        }
        if self.depths.is_empty() {
            return Err(AppError::config("Select at least one depth."));
        }
        if self.num_qubits < 2 {
            return Err(AppError::config("OTOC circuits need at least 2 qubits."));
        }
        if self.shots == 0 {
            return Err(AppError::config("Shots must be > 0."));
        }
        if self.runs == 0 {
            return Err(AppError::config("Runs must be >= 1."));
        }
        if let Some(factors) = &self.zne_factors {
            if factors.len() < 2 {
                return Err(AppError::config("ZNE needs at least two noise factors."));
            }
            if factors.contains(&0) {
                return Err(AppError::config("Noise factors must be >= 1."));
            }
            let mut distinct = factors.clone();
            distinct.sort_unstable();
            distinct.dedup();
            if distinct.len() != factors.len() {
                return Err(AppError::config("Noise factors must be distinct."));
            }
        }
        if !(self.t_eff > 0.0) {
            return Err(AppError::config("Effective temperature must be > 0."));
        }
        Ok(())
    }

    /// Seed the circuits of run `run` are built from.
    pub fn circuit_seed(&self, run: usize) -> u64 {
        if self.fixed_seed {
            self.seed
        } else {
            self.seed.wrapping_add(RUN_SEED_STRIDE * run as u64)
        }
    }

    fn otoc_circuits(&self, family: CircuitFamily, seed: u64) -> Result<Vec<Circuit>, AppError> {
        self.depths
            .iter()
            .map(|&depth| {
                build_otoc(&OtocSpec {
                    family,
                    num_qubits: self.num_qubits,
                    depth,
                    seed,
                    legacy_seed: self.legacy_seed,
                })
            })
            .collect()
    }
}

/// Readout fidelity measured on the two basis states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// `P(0…0 | prepared 0…0)`.
    pub fid_zero: f64,
    /// `P(1…1 | prepared 1…1)`.
    pub fid_one: f64,
    pub factor: f64,
}

impl Calibration {
    pub fn from_fidelities(fid_zero: f64, fid_one: f64) -> Self {
        let factor = if fid_zero > MIN_CALIBRATION_FIDELITY {
            1.0 / fid_zero
        } else {
            1.0
        };
        Self {
            fid_zero,
            fid_one,
            factor,
        }
    }

    pub fn readout_fidelity(&self) -> f64 {
        (self.fid_zero + self.fid_one) / 2.0
    }

    pub fn correct(&self, raw: f64) -> f64 {
        (raw * self.factor).min(1.0)
    }
}

pub fn calibrate(sampler: &dyn Sampler, num_qubits: usize, shots: u64, seed: u64) -> Result<Calibration, AppError> {
    let (zero, one) = calibration_circuits(num_qubits);
    let job = sampler.run(&[zero, one], shots, seed)?;
    let [zero_counts, one_counts] = job.counts.as_slice() else {
        return Err(AppError::remote(format!(
            "Calibration returned {} histograms, expected 2.",
            job.counts.len()
        )));
    };
    let cal = Calibration::from_fidelities(
        probability_of(zero_counts, &"0".repeat(num_qubits)),
        probability_of(one_counts, &"1".repeat(num_qubits)),
    );
    tracing::info!(
        backend = sampler.backend_name(),
        fid_zero = cal.fid_zero,
        fid_one = cal.fid_one,
        factor = cal.factor,
        "readout calibration"
    );
    Ok(cal)
}

/// One family within one run.
#[derive(Debug, Clone)]
pub struct FamilyRun {
    pub family: CircuitFamily,
    pub raw: FamilyFit,
    /// Present when a calibration was applied.
    pub corrected: Option<FamilyFit>,
    pub transpiled_gates: Vec<usize>,
    pub job_id: Option<String>,
}

impl FamilyRun {
    /// Corrected fit when available, raw otherwise.
    pub fn best(&self) -> &FamilyFit {
        self.corrected.as_ref().unwrap_or(&self.raw)
    }
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub index: usize,
    pub circuit_seed: u64,
    pub families: Vec<FamilyRun>,
}

impl RunResult {
    pub fn family(&self, family: CircuitFamily) -> Option<&FamilyRun> {
        self.families.iter().find(|f| f.family == family)
    }
}

/// λ_K of one family across repeated runs.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatStats {
    pub family: CircuitFamily,
    pub lambdas: Vec<f64>,
    pub failed: usize,
    pub summary: Option<Summary>,
}

impl RepeatStats {
    /// α from the mean λ, with the λ spread carried over.
    pub fn alpha(&self) -> Option<(f64, f64)> {
        self.summary.map(|s| (alpha_from_lambda(s.mean), s.std))
    }
}

#[derive(Debug, Clone)]
pub struct ZneResult {
    pub family: CircuitFamily,
    pub factors: Vec<u32>,
    /// `otoc_by_factor[i][j]`: factor `i`, depth `j`.
    pub otoc_by_factor: Vec<Vec<f64>>,
    pub raw: FamilyFit,
    pub extrapolated: FamilyFit,
}

impl ZneResult {
    /// Whether extrapolation moved λ by less than 0.1.
    pub fn consistent(&self) -> Option<bool> {
        let raw = self.raw.estimate()?.lambda_k;
        let zne = self.extrapolated.estimate()?.lambda_k;
        Some((zne - raw).abs() < 0.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verification {
    pub family: CircuitFamily,
    pub lambda: f64,
    pub alpha_measured: f64,
    pub alpha_predicted: f64,
}

impl Verification {
    pub fn matches(&self) -> bool {
        (self.alpha_measured - self.alpha_predicted).abs() < ALPHA_MATCH_TOLERANCE
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Universality {
    pub first: CircuitFamily,
    pub second: CircuitFamily,
    pub lambda_first: f64,
    pub lambda_second: f64,
}

impl Universality {
    pub fn delta(&self) -> f64 {
        (self.lambda_first - self.lambda_second).abs()
    }

    pub fn universal(&self) -> bool {
        self.delta() < UNIVERSALITY_TOLERANCE
    }
}

/// Spread of one family relative to the `chaotic` reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stability {
    pub family: CircuitFamily,
    pub std: f64,
    pub reference_std: f64,
}

impl Stability {
    pub fn reduction_pct(&self) -> f64 {
        (1.0 - self.std / self.reference_std.max(MIN_REFERENCE_STD)) * 100.0
    }

    pub fn more_stable(&self) -> bool {
        self.std < self.reference_std
    }
}

/// Fixed-seed spread: circuits are identical across runs, so this is device noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variability {
    pub family: CircuitFamily,
    pub std: f64,
}

impl Variability {
    pub fn high(&self) -> bool {
        self.std > HIGH_VARIABILITY_STD
    }
}

#[derive(Debug, Clone)]
pub struct BackendReport {
    pub backend: String,
    pub calibration: Option<Calibration>,
    pub runs: Vec<RunResult>,
    pub repeat_stats: Vec<RepeatStats>,
    pub zne: Vec<ZneResult>,
    pub verification: Vec<Verification>,
    pub universality: Option<Universality>,
    pub stability: Vec<Stability>,
    pub variability: Vec<Variability>,
}

impl BackendReport {
    /// λ_K of `family` in the first run.
    pub fn first_run_lambda(&self, family: CircuitFamily) -> Option<f64> {
        self.runs
            .first()?
            .family(family)?
            .best()
            .estimate()
            .map(|e| e.lambda_k)
    }

    /// λ used for cross-family verdicts: the mean over runs when there are
    /// several, the first run otherwise.
    pub fn headline_lambda(&self, family: CircuitFamily) -> Option<f64> {
        if self.runs.len() > 1 {
            self.repeat_stats
                .iter()
                .find(|s| s.family == family)?
                .summary
                .map(|s| s.mean)
        } else {
            self.first_run_lambda(family)
        }
    }
}

#[derive(Debug, Clone)]
pub struct HardwareReport {
    pub started_at: DateTime<Utc>,
    pub config: HardwareConfig,
    pub backends: Vec<BackendReport>,
}

impl HardwareReport {
    pub fn record(&self) -> RunRecord {
        let mut rec = RunRecord::new("hardware");
        rec.backend = Some(
            self.backends
                .iter()
                .map(|b| b.backend.as_str())
                .collect::<Vec<_>>()
                .join(","),
        );
        rec.scalar("shots", self.config.shots as f64)
            .scalar("runs", self.config.runs as f64);
        for b in &self.backends {
            if let Some(cal) = &b.calibration {
                rec.scalar(format!("{}.fid_zero", b.backend), cal.fid_zero)
                    .scalar(format!("{}.correction_factor", b.backend), cal.factor);
            }
            for s in &b.repeat_stats {
                if let Some(sum) = s.summary {
                    let key = format!("{}.{}", b.backend, s.family.display_name());
                    rec.scalar(format!("{key}.lambda_mean"), sum.mean)
                        .scalar(format!("{key}.lambda_std"), sum.std);
                }
            }
            if let Some(run) = b.runs.first() {
                for f in &run.families {
                    rec.series.push(
                        f.best()
                            .record(format!("{}/{}", b.backend, f.family.display_name())),
                    );
                }
            }
        }
        rec
    }
}

/// One histogram per submitted circuit, or a remote error.
fn check_histograms(job: &SamplerJob, circuits: usize) -> Result<(), AppError> {
    if job.counts.len() != circuits {
        return Err(AppError::remote(format!(
            "Sampler returned {} histograms for {} circuits.",
            job.counts.len(),
            circuits
        )));
    }
    Ok(())
}

fn run_family(
    sampler: &dyn Sampler,
    cfg: &HardwareConfig,
    family: CircuitFamily,
    circuit_seed: u64,
    sample_seed: u64,
    calibration: Option<&Calibration>,
    opts: &FitOptions,
) -> Result<FamilyRun, AppError> {
    let circuits = cfg.otoc_circuits(family, circuit_seed)?;
    let job = sampler.run(&circuits, cfg.shots, sample_seed)?;
    check_histograms(&job, circuits.len())?;

    let raw_values: Vec<f64> = job
        .counts
        .iter()
        .map(|c| otoc_from_counts(c, cfg.num_qubits))
        .collect();
    for (depth, v) in cfg.depths.iter().zip(&raw_values) {
        tracing::debug!(family = family.display_name(), depth, otoc = v, "otoc measured");
    }

    let corrected = calibration.map(|cal| {
        let values = raw_values.iter().map(|&v| cal.correct(v)).collect();
        FamilyFit::new(OtocSeries::new(family, &cfg.depths, values), opts, cfg.t_eff)
    });
    let raw = FamilyFit::new(
        OtocSeries::new(family, &cfg.depths, raw_values),
        opts,
        cfg.t_eff,
    );

    Ok(FamilyRun {
        family,
        raw,
        corrected,
        transpiled_gates: job.transpiled_gates,
        job_id: job.job_id,
    })
}

fn run_zne(
    sampler: &dyn Sampler,
    cfg: &HardwareConfig,
    family: CircuitFamily,
    factors: &[u32],
    opts: &FitOptions,
) -> Result<ZneResult, AppError> {
    let circuits = cfg.otoc_circuits(family, cfg.circuit_seed(0))?;

    let mut otoc_by_factor = Vec::with_capacity(factors.len());
    for (i, &factor) in factors.iter().enumerate() {
        let amplified = circuits
            .iter()
            .map(|c| amplify_noise(c, factor))
            .collect::<Result<Vec<_>, _>>()?;
        let seed = cfg.seed.wrapping_add(7 * RUN_SEED_STRIDE).wrapping_add(i as u64 * 31);
        let job = sampler.run(&amplified, cfg.shots, seed)?;
        check_histograms(&job, amplified.len())?;
        let values: Vec<f64> = job
            .counts
            .iter()
            .map(|c| otoc_from_counts(c, cfg.num_qubits))
            .collect();
        tracing::debug!(family = family.display_name(), factor, ?values, "zne factor measured");
        otoc_by_factor.push(values);
    }

    let xs: Vec<f64> = factors.iter().map(|&f| f64::from(f)).collect();
    let mut extrapolated = Vec::with_capacity(cfg.depths.len());
    for j in 0..cfg.depths.len() {
        let ys: Vec<f64> = otoc_by_factor.iter().map(|v| v[j]).collect();
        extrapolated.push(zne_extrapolate(&xs, &ys)?);
    }

    // The unamplified curve is the factor-1 measurement when one was taken.
    let raw_values = factors
        .iter()
        .position(|&f| f == 1)
        .map(|i| otoc_by_factor[i].clone())
        .unwrap_or_else(|| otoc_by_factor[0].clone());

    Ok(ZneResult {
        family,
        factors: factors.to_vec(),
        raw: FamilyFit::new(OtocSeries::new(family, &cfg.depths, raw_values), opts, cfg.t_eff),
        extrapolated: FamilyFit::new(
            OtocSeries::new(family, &cfg.depths, extrapolated),
            opts,
            cfg.t_eff,
        ),
        otoc_by_factor,
    })
}

fn repeat_stats(cfg: &HardwareConfig, runs: &[RunResult]) -> Vec<RepeatStats> {
    cfg.families
        .iter()
        .map(|&family| {
            let mut lambdas = Vec::with_capacity(runs.len());
            let mut failed = 0;
            for run in runs {
                match run
                    .family(family)
                    .and_then(|f| f.best().estimate())
                {
                    Some(e) => lambdas.push(e.lambda_k),
                    None => failed += 1,
                }
            }
            RepeatStats {
                family,
                summary: Summary::of(&lambdas),
                lambdas,
                failed,
            }
        })
        .collect()
}

fn verification(runs: &[RunResult]) -> Vec<Verification> {
    let Some(first) = runs.first() else {
        return Vec::new();
    };
    first
        .families
        .iter()
        .filter_map(|f| {
            let est = f.best().estimate()?;
            Some(Verification {
                family: f.family,
                lambda: est.lambda_k,
                alpha_measured: est.alpha,
                alpha_predicted: alpha_from_lambda(est.lambda_k),
            })
        })
        .collect()
}

fn universality(cfg: &HardwareConfig, report: &BackendReport) -> Option<Universality> {
    let mut chaotic = cfg.families.iter().copied().filter(|f| f.is_chaotic());
    let first = chaotic.next()?;
    let second = chaotic.next()?;
    Some(Universality {
        first,
        second,
        lambda_first: report.headline_lambda(first)?,
        lambda_second: report.headline_lambda(second)?,
    })
}

fn stability(stats: &[RepeatStats]) -> Vec<Stability> {
    let Some(reference) = stats
        .iter()
        .find(|s| s.family == CircuitFamily::Chaotic)
        .and_then(|s| s.summary)
    else {
        return Vec::new();
    };
    stats
        .iter()
        .filter(|s| s.family != CircuitFamily::Chaotic)
        .filter_map(|s| {
            Some(Stability {
                family: s.family,
                std: s.summary?.std,
                reference_std: reference.std,
            })
        })
        .collect()
}

/// Full campaign on one sampler.
pub fn run_on(sampler: &dyn Sampler, cfg: &HardwareConfig) -> Result<BackendReport, AppError> {
    cfg.validate()?;
    let opts = FitOptions::hardware_decay();
    let backend = sampler.backend_name().to_string();
    tracing::info!(
        backend = %backend,
        families = cfg.families.len(),
        depths = cfg.depths.len(),
        runs = cfg.runs,
        "hardware campaign started"
    );

    let calibration = if cfg.calibrate {
        Some(calibrate(sampler, cfg.num_qubits, cfg.shots, cfg.seed)?)
    } else {
        None
    };

    let mut runs = Vec::with_capacity(cfg.runs);
    for run in 0..cfg.runs {
        let circuit_seed = cfg.circuit_seed(run);
        let mut families = Vec::with_capacity(cfg.families.len());
        for (i, &family) in cfg.families.iter().enumerate() {
            // Sampling noise differs between runs even when circuits do not.
            let sample_seed = cfg
                .seed
                .wrapping_add(RUN_SEED_STRIDE * run as u64)
                .wrapping_add(10 * i as u64 + 1);
            let fr = run_family(
                sampler,
                cfg,
                family,
                circuit_seed,
                sample_seed,
                calibration.as_ref(),
                &opts,
            )?;
            if let Some(e) = fr.best().estimate() {
                tracing::info!(
                    run = run + 1,
                    family = family.display_name(),
                    lambda_k = e.lambda_k,
                    job = fr.job_id.as_deref().unwrap_or("-"),
                    "family finished"
                );
            }
            families.push(fr);
        }
        runs.push(RunResult {
            index: run,
            circuit_seed,
            families,
        });
    }

    let zne = match &cfg.zne_factors {
        Some(factors) => cfg
            .families
            .iter()
            .map(|&family| run_zne(sampler, cfg, family, factors, &opts))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    let repeat_stats = repeat_stats(cfg, &runs);
    let stability = if cfg.runs > 1 {
        stability(&repeat_stats)
    } else {
        Vec::new()
    };
    let variability = if cfg.fixed_seed && cfg.runs > 1 {
        repeat_stats
            .iter()
            .filter_map(|s| {
                Some(Variability {
                    family: s.family,
                    std: s.summary?.std,
                })
            })
            .collect()
    } else {
        Vec::new()
    };

    let mut report = BackendReport {
        backend,
        calibration,
        verification: verification(&runs),
        runs,
        repeat_stats,
        zne,
        universality: None,
        stability,
        variability,
    };
    report.universality = universality(cfg, &report);
    Ok(report)
}

/// Campaign on every sampler in turn.
pub fn run(samplers: &[Box<dyn Sampler>], cfg: &HardwareConfig) -> Result<HardwareReport, AppError> {
    if samplers.is_empty() {
        return Err(AppError::config("No backend available to run on."));
    }
    let started_at = Utc::now();
    let backends = samplers
        .iter()
        .map(|s| run_on(s.as_ref(), cfg))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(HardwareReport {
        started_at,
        config: cfg.clone(),
        backends,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{LocalSampler, NoiseModel};

    fn quick() -> HardwareConfig {
        HardwareConfig {
            depths: vec![1, 2, 4, 6],
            shots: 1000,
            ..HardwareConfig::default()
        }
    }

    #[test]
    fn calibration_factor_only_above_half_fidelity() {
        let good = Calibration::from_fidelities(0.8, 0.7);
        assert!((good.factor - 1.25).abs() < 1e-12);
        assert!((good.readout_fidelity() - 0.75).abs() < 1e-12);
        assert!((good.correct(0.9) - 1.0).abs() < 1e-12);

        let bad = Calibration::from_fidelities(0.4, 0.3);
        assert_eq!(bad.factor, 1.0);
        assert_eq!(bad.correct(0.2), 0.2);
    }

    #[test]
    fn calibration_on_noisy_sampler_sees_readout_loss() {
        let sampler = LocalSampler::noisy(NoiseModel {
            readout_error: 0.05,
            two_qubit_error: 0.0,
        })
        .unwrap();
        let cal = calibrate(&sampler, 4, 4000, 1).unwrap();
        // 0.95^4 ≈ 0.81.
        assert!(cal.fid_zero > 0.75 && cal.fid_zero < 0.88, "{}", cal.fid_zero);
        assert!(cal.factor > 1.0);
    }

    #[test]
    fn calibration_is_perfect_on_ideal_sampler() {
        let cal = calibrate(&LocalSampler::ideal(), 3, 500, 1).unwrap();
        assert_eq!(cal.fid_zero, 1.0);
        assert_eq!(cal.fid_one, 1.0);
        assert_eq!(cal.factor, 1.0);
    }

    #[test]
    fn single_run_produces_fits_and_verification() {
        let report = run_on(&LocalSampler::ideal(), &quick()).unwrap();
        assert_eq!(report.runs.len(), 1);
        assert_eq!(report.runs[0].families.len(), 3);
        assert!(report.calibration.is_none());
        for fr in &report.runs[0].families {
            assert_eq!(fr.transpiled_gates.len(), 4);
            assert!(fr.corrected.is_none());
        }
        assert!(report.verification.iter().all(Verification::matches));
        assert!(report.stability.is_empty());
        assert!(report.universality.is_none());
    }

    #[test]
    fn calibrated_run_keeps_raw_and_corrected_curves() {
        let cfg = HardwareConfig {
            calibrate: true,
            families: vec![CircuitFamily::Integrable],
            ..quick()
        };
        let sampler = LocalSampler::noisy(NoiseModel {
            readout_error: 0.03,
            two_qubit_error: 0.0,
        })
        .unwrap();
        let report = run_on(&sampler, &cfg).unwrap();
        let fr = &report.runs[0].families[0];
        let corrected = fr.corrected.as_ref().unwrap();
        for (raw, corr) in fr.raw.series.values.iter().zip(&corrected.series.values) {
            assert!(corr >= raw);
            assert!(*corr <= 1.0);
        }
    }

    #[test]
    fn repeated_runs_use_distinct_circuit_seeds() {
        let cfg = HardwareConfig {
            runs: 3,
            families: vec![CircuitFamily::Chaotic, CircuitFamily::KickedIsing],
            ..quick()
        };
        let report = run_on(&LocalSampler::ideal(), &cfg).unwrap();
        let seeds: Vec<u64> = report.runs.iter().map(|r| r.circuit_seed).collect();
        assert_eq!(seeds, vec![42, 1042, 2042]);
        assert_eq!(report.repeat_stats.len(), 2);
        for s in &report.repeat_stats {
            assert_eq!(s.lambdas.len() + s.failed, 3);
        }
        // Two chaotic families: a universality verdict and a stability row.
        assert!(report.universality.is_some());
        assert!(report.stability.iter().all(|s| s.family == CircuitFamily::KickedIsing));
        assert!(report.variability.is_empty());
    }

    #[test]
    fn fixed_seed_reuses_circuits_and_diagnoses_variability() {
        let cfg = HardwareConfig {
            runs: 2,
            fixed_seed: true,
            families: vec![CircuitFamily::Integrable],
            ..quick()
        };
        let report = run_on(&LocalSampler::ideal(), &cfg).unwrap();
        assert!(report.runs.iter().all(|r| r.circuit_seed == 42));
        assert_eq!(report.variability.len(), 1);
    }

    #[test]
    fn zne_extrapolates_every_depth() {
        let cfg = HardwareConfig {
            families: vec![CircuitFamily::Chaotic],
            zne_factors: Some(vec![1, 2, 3]),
            ..quick()
        };
        let sampler = LocalSampler::noisy(NoiseModel {
            readout_error: 0.0,
            two_qubit_error: 0.02,
        })
        .unwrap();
        let report = run_on(&sampler, &cfg).unwrap();
        let z = &report.zne[0];
        assert_eq!(z.otoc_by_factor.len(), 3);
        assert_eq!(z.extrapolated.series.len(), 4);
        assert!(z.extrapolated.series.values.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    /// Drops the last histogram, like a partially returned cloud job.
    struct TruncatingSampler(LocalSampler);

    impl Sampler for TruncatingSampler {
        fn backend_name(&self) -> &str {
            "truncating"
        }

        fn run(&self, circuits: &[Circuit], shots: u64, seed: u64) -> Result<SamplerJob, AppError> {
            let mut job = self.0.run(circuits, shots, seed)?;
            job.counts.pop();
            Ok(job)
        }
    }

    #[test]
    fn zne_rejects_missing_histograms() {
        let cfg = quick();
        let sampler = TruncatingSampler(LocalSampler::ideal());
        let err = run_zne(
            &sampler,
            &cfg,
            CircuitFamily::Chaotic,
            &[1, 2],
            &FitOptions::hardware_decay(),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("histograms"));
    }

    #[test]
    fn rejects_repeated_zne_factors() {
        let cfg = HardwareConfig {
            zne_factors: Some(vec![2, 2]),
            ..quick()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("distinct"));
    }

    #[test]
    fn stability_reduction_uses_floor() {
        let s = Stability {
            family: CircuitFamily::KickedIsing,
            std: 0.0005,
            reference_std: 0.0,
        };
        assert!((s.reduction_pct() - 50.0).abs() < 1e-9);
        assert!(!s.more_stable());
    }

    #[test]
    fn variability_threshold() {
        let v = Variability {
            family: CircuitFamily::Chaotic,
            std: 0.15,
        };
        assert!(v.high());
        assert!(!Variability { std: 0.05, ..v }.high());
    }

    #[test]
    fn rejects_single_zne_factor_and_zero_runs() {
        let cfg = HardwareConfig {
            zne_factors: Some(vec![2]),
            ..quick()
        };
        assert_eq!(cfg.validate().unwrap_err().exit_code(), 2);
        let cfg = HardwareConfig { runs: 0, ..quick() };
        assert_eq!(cfg.validate().unwrap_err().exit_code(), 2);
    }

    #[test]
    fn multi_backend_run_and_record() {
        let samplers: Vec<Box<dyn Sampler>> = vec![
            Box::new(LocalSampler::ideal()),
            Box::new(
                LocalSampler::noisy(NoiseModel {
                    readout_error: 0.02,
                    two_qubit_error: 0.0,
                })
                .unwrap(),
            ),
        ];
        let cfg = HardwareConfig {
            families: vec![CircuitFamily::Integrable],
            ..quick()
        };
        let report = run(&samplers, &cfg).unwrap();
        assert_eq!(report.backends.len(), 2);
        let rec = report.record();
        assert_eq!(rec.series.len(), 2);
        assert!(rec.backend.unwrap().contains(','));
    }
}
