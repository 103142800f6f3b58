//! Command-line parsing.
//!
//! Argument parsing stays here; `app` turns the parsed arguments into analysis
//! configs and dispatches.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::circuit::DEFAULT_QUBITS;
use crate::domain::{CircuitFamily, CountsMode, DEFAULT_DEPTHS};
use crate::experiment::hardware::DEFAULT_HW_SHOTS;
use crate::experiment::simulate::DEFAULT_SIM_SHOTS;
use crate::fit::DEFAULT_T_EFF;
use crate::physics::CURRENT_GW_SNR;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "kaelion",
    version,
    about = "Experimental protocols and OTOC measurements for the Kaelion λ parameter"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Debug-level diagnostics on stderr (`RUST_LOG` still wins).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Output options shared by every analysis.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Write SVG figures into this directory.
    #[arg(long, global = true, value_name = "DIR")]
    pub plot_dir: Option<PathBuf>,

    /// Render an ASCII plot in the terminal.
    #[arg(long, global = true)]
    pub ascii_plot: bool,

    /// ASCII plot width (columns).
    #[arg(long, global = true, default_value_t = 80)]
    pub width: usize,

    /// ASCII plot height (rows).
    #[arg(long, global = true, default_value_t = 20)]
    pub height: usize,

    /// Export the run record (`.csv` for a flat series table, JSON otherwise).
    #[arg(long, global = true, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Experiment 1: quantum-circuit OTOC protocol and expected results.
    Otoc(OtocArgs),
    /// Experiment 2: analog black hole in a flowing BEC.
    Bec(BecArgs),
    /// Experiment 3: astrophysical signatures and detectability.
    Astro(AstroArgs),
    /// Noise-free statevector OTOC curves per circuit family.
    Simulate(SimulateArgs),
    /// OTOC campaign on the local noisy sampler or IBM Quantum hardware.
    Hardware(HardwareArgs),
    /// Paper figures from the recorded ibm_torino run.
    Figures,
}

#[derive(Debug, Args, Clone)]
pub struct OtocArgs {
    /// Seed for the synthetic decays and the example circuit.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Effective temperature T in λ_K = λ_L / (2πT).
    #[arg(long, default_value_t = DEFAULT_T_EFF)]
    pub t_eff: f64,

    /// Family of the example circuit listed as OpenQASM.
    #[arg(long, value_enum, default_value_t = CircuitFamily::Chaotic)]
    pub family: CircuitFamily,

    /// Depth of the example circuit.
    #[arg(long, default_value_t = 2)]
    pub depth: usize,

    #[arg(long, default_value_t = DEFAULT_QUBITS)]
    pub qubits: usize,
}

#[derive(Debug, Args, Clone)]
pub struct BecArgs {
    /// Speed of sound c.
    #[arg(long, default_value_t = 1.0)]
    pub sound_speed: f64,

    /// Asymptotic flow velocity v (a horizon needs v > c).
    #[arg(long, default_value_t = 1.5)]
    pub flow_velocity: f64,

    /// λ used to generate the simulated entropy data.
    #[arg(long, default_value_t = 0.6)]
    pub lambda_true: f64,

    /// Standard deviation of the entropy noise.
    #[arg(long, default_value_t = 0.1)]
    pub noise: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Debug, Args, Clone)]
pub struct AstroArgs {
    /// Black hole mass in solar masses.
    #[arg(long, default_value_t = 30.0)]
    pub mass: f64,

    /// SNR reachable by current detectors.
    #[arg(long, default_value_t = CURRENT_GW_SNR)]
    pub snr: f64,
}

/// Circuit selection shared by `simulate` and `hardware`.
#[derive(Debug, Args, Clone)]
pub struct CircuitArgs {
    /// Circuit families to run (repeat or comma-separate).
    #[arg(
        long = "family",
        value_enum,
        value_delimiter = ',',
        default_values_t = CircuitFamily::baseline()
    )]
    pub families: Vec<CircuitFamily>,

    /// Circuit depths.
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_DEPTHS)]
    pub depths: Vec<usize>,

    #[arg(long, default_value_t = DEFAULT_QUBITS)]
    pub qubits: usize,

    /// Seed for the random circuit layers.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Reuse `seed` for every depth instead of `seed + 100·depth`.
    #[arg(long)]
    pub legacy_seed: bool,

    #[arg(long, default_value_t = DEFAULT_T_EFF)]
    pub t_eff: f64,
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub circuits: CircuitArgs,

    /// Exact probabilities or sampled counts.
    #[arg(long, value_enum, default_value_t = CountsMode::Sampled)]
    pub mode: CountsMode,

    #[arg(long, default_value_t = DEFAULT_SIM_SHOTS)]
    pub shots: u64,
}

#[derive(Debug, Args, Clone)]
pub struct HardwareArgs {
    #[command(flatten)]
    pub circuits: CircuitArgs,

    #[arg(long, default_value_t = DEFAULT_HW_SHOTS)]
    pub shots: u64,

    /// Submit to IBM Quantum instead of the local sampler.
    #[arg(long)]
    pub cloud: bool,

    /// Cloud backend name (default: least busy).
    #[arg(long, requires = "cloud")]
    pub backend: Option<String>,

    /// Run on up to this many of the least busy cloud backends.
    #[arg(long, default_value_t = 1)]
    pub max_backends: usize,

    /// Repeat the campaign this many times.
    #[arg(long, default_value_t = 1)]
    pub runs: usize,

    /// Reuse the seed on every run, so any spread is hardware noise.
    #[arg(long)]
    pub fixed_seed: bool,

    /// Measure readout fidelity first and correct the OTOC values.
    #[arg(long)]
    pub calibrate: bool,

    /// Zero-noise extrapolation with these gate-folding factors, e.g. `1,2,3`.
    #[arg(long, value_delimiter = ',')]
    pub zne_factors: Option<Vec<u32>>,

    /// Local sampler: probability of a flipped readout bit.
    #[arg(long, default_value_t = 0.0)]
    pub readout_error: f64,

    /// Local sampler: depolarizing probability after each two-qubit gate.
    #[arg(long, default_value_t = 0.0)]
    pub two_qubit_error: f64,
}
