//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - turns arguments into an analysis config and runs it
//! - prints the report, then the optional ASCII plot, SVG figures and export

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::circuit::{LocalSampler, NoiseModel, Sampler};
use crate::cli::{
    AstroArgs, BecArgs, Cli, Command, HardwareArgs, OtocArgs, OutputArgs, SimulateArgs,
};
use crate::data::{SyntheticEntropy, SyntheticOtoc};
use crate::domain::RunRecord;
use crate::error::AppError;
use crate::experiment::{astro, bec, figures, hardware, otoc, simulate};
use crate::ibm::{IbmClient, IbmSampler};
use crate::math::linspace;
use crate::plot::{self, AsciiSeries};
use crate::report;

/// Entry point for the `kaelion` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    crate::logging::init(cli.verbose);

    let out = cli.output;
    match cli.command {
        Command::Otoc(args) => handle_otoc(&args, &out),
        Command::Bec(args) => handle_bec(&args, &out),
        Command::Astro(args) => handle_astro(&args, &out),
        Command::Simulate(args) => handle_simulate(&args, &out),
        Command::Hardware(args) => handle_hardware(&args, &out),
        Command::Figures => handle_figures(&out),
    }
}

/// Report text and plot data every handler hands to `finish`.
struct Output<'a> {
    text: String,
    axes: (&'a str, &'a str),
    ascii: Vec<AsciiSeries>,
    record: RunRecord,
}

/// Print the report, then the optional ASCII plot, figures and export.
fn finish<P>(out: &OutputArgs, f: Output<'_>, figures: P) -> Result<(), AppError>
where
    P: FnOnce(&Path) -> Result<Vec<PathBuf>, AppError>,
{
    println!("{}", f.text);

    if out.ascii_plot && !f.ascii.is_empty() {
        println!(
            "{}",
            plot::render_ascii_plot(&f.ascii, f.axes, out.width, out.height)
        );
    }

    // Figures are optional output: a drawing failure is reported, not fatal.
    if let Some(dir) = &out.plot_dir {
        match figures(dir) {
            Ok(paths) => {
                for p in paths {
                    println!("Figure saved: {}", p.display());
                }
            }
            Err(e) => tracing::warn!(error = %e, "figures not written"),
        }
    }

    if let Some(path) = &out.export {
        crate::io::write_run_record(path, &f.record)?;
        println!("Run record saved: {}", path.display());
    }
    Ok(())
}

fn handle_otoc(args: &OtocArgs, out: &OutputArgs) -> Result<(), AppError> {
    let cfg = otoc::OtocProtocolConfig {
        seed: args.seed,
        t_eff: args.t_eff,
        synthetic: SyntheticOtoc::default(),
        example_family: args.family,
        example_depth: args.depth,
        num_qubits: args.qubits,
    };
    let rep = otoc::run(&cfg)?;

    let glyphs = ['*', '+', 'o'];
    let ascii: Vec<AsciiSeries> = rep
        .scenarios
        .iter()
        .enumerate()
        .map(|(i, s)| AsciiSeries {
            label: s.scenario.name.to_string(),
            glyph: glyphs[i % glyphs.len()],
            points: s.t.iter().copied().zip(s.otoc.iter().copied()).collect(),
            curve: s
                .fit
                .fitted()
                .map(|(d, _)| s.t.iter().map(|&t| (t, d.predict(t))).collect())
                .unwrap_or_default(),
        })
        .collect();

    finish(
        out,
        Output {
            text: report::format_otoc_protocol(&rep),
            axes: ("t", "otoc"),
            ascii,
            record: rep.record(),
        },
        |dir: &Path| Ok(vec![plot::write_otoc_figure(&rep, dir)?]),
    )
}

fn handle_bec(args: &BecArgs, out: &OutputArgs) -> Result<(), AppError> {
    let cfg = bec::BecConfig {
        sound_speed: args.sound_speed,
        flow_velocity: args.flow_velocity,
        seed: args.seed,
        entropy: SyntheticEntropy {
            lambda_true: args.lambda_true,
            noise: args.noise,
            ..SyntheticEntropy::default()
        },
    };
    let rep = bec::run(&cfg)?;

    let curve = match (rep.fit.fitted(), rep.areas.first(), rep.areas.last()) {
        (Some(f), Some(&lo), Some(&hi)) => linspace(lo, hi, 60)
            .into_iter()
            .map(|a| (a, f.predict(a)))
            .collect(),
        _ => Vec::new(),
    };
    let ascii = vec![AsciiSeries {
        label: "S(A)".to_string(),
        glyph: 'o',
        points: rep
            .areas
            .iter()
            .copied()
            .zip(rep.entropies.iter().copied())
            .collect(),
        curve,
    }];

    finish(
        out,
        Output {
            text: report::format_bec(&rep),
            axes: ("area", "entropy"),
            ascii,
            record: rep.record(),
        },
        |dir: &Path| Ok(vec![plot::write_bec_figure(&rep, dir)?]),
    )
}

fn handle_astro(args: &AstroArgs, out: &OutputArgs) -> Result<(), AppError> {
    let rep = astro::run(&astro::AstroConfig {
        mass: args.mass,
        current_snr: args.snr,
    })?;

    let c = &rep.curves;
    let ascii = vec![
        AsciiSeries {
            label: "λ=0 (LQG)".to_string(),
            glyph: 'o',
            points: Vec::new(),
            curve: c.ringdown_t.iter().copied().zip(c.ringdown_lqg.iter().copied()).collect(),
        },
        AsciiSeries {
            label: "λ=1 (holographic)".to_string(),
            glyph: '*',
            points: Vec::new(),
            curve: c
                .ringdown_t
                .iter()
                .copied()
                .zip(c.ringdown_holographic.iter().copied())
                .collect(),
        },
    ];

    finish(
        out,
        Output {
            text: report::format_astro(&rep),
            axes: ("t", "strain"),
            ascii,
            record: rep.record(),
        },
        |dir: &Path| Ok(vec![plot::write_astro_figure(&rep, dir)?]),
    )
}

fn handle_simulate(args: &SimulateArgs, out: &OutputArgs) -> Result<(), AppError> {
    let c = &args.circuits;
    let cfg = simulate::SimulateConfig {
        families: c.families.clone(),
        depths: c.depths.clone(),
        num_qubits: c.qubits,
        seed: c.seed,
        legacy_seed: c.legacy_seed,
        mode: args.mode,
        shots: args.shots,
        t_eff: c.t_eff,
    };
    let rep = simulate::run(&cfg)?;

    finish(
        out,
        Output {
            text: report::format_simulate(&rep),
            axes: ("depth", "otoc"),
            ascii: rep
                .families
                .iter()
                .map(|f| AsciiSeries::from_family(&f.result))
                .collect(),
            record: rep.record(),
        },
        |dir: &Path| Ok(vec![plot::write_simulate_figure(&rep, dir)?]),
    )
}

fn hardware_config(args: &HardwareArgs) -> hardware::HardwareConfig {
    let c = &args.circuits;
    hardware::HardwareConfig {
        families: c.families.clone(),
        depths: c.depths.clone(),
        num_qubits: c.qubits,
        shots: args.shots,
        seed: c.seed,
        legacy_seed: c.legacy_seed,
        runs: args.runs,
        fixed_seed: args.fixed_seed,
        calibrate: args.calibrate,
        zne_factors: args.zne_factors.clone(),
        t_eff: c.t_eff,
    }
}

/// Cloud samplers for `--backend`, or the least busy eligible devices.
fn cloud_samplers(args: &HardwareArgs) -> Result<Vec<Box<dyn Sampler>>, AppError> {
    if args.max_backends == 0 {
        return Err(AppError::config("--max-backends must be >= 1."));
    }
    let client = IbmClient::from_env()?;
    let names: Vec<String> = match &args.backend {
        Some(name) => vec![name.clone()],
        None if args.max_backends == 1 => {
            let b = client.least_busy(args.circuits.qubits)?;
            tracing::info!(backend = %b.name, pending = b.pending_jobs, "backend selected");
            vec![b.name]
        }
        None => {
            let eligible = client.eligible_backends(args.circuits.qubits)?;
            if eligible.is_empty() {
                return Err(AppError::remote(format!(
                    "No operational backend with at least {} qubits.",
                    args.circuits.qubits
                )));
            }
            eligible
                .into_iter()
                .take(args.max_backends)
                .map(|b| {
                    tracing::info!(backend = %b.name, pending = b.pending_jobs, "backend selected");
                    b.name
                })
                .collect()
        }
    };

    names
        .iter()
        .map(|name| {
            IbmSampler::new(client.clone(), name).map(|s| Box::new(s) as Box<dyn Sampler>)
        })
        .collect()
}

fn local_sampler(args: &HardwareArgs) -> Result<Box<dyn Sampler>, AppError> {
    let noise = NoiseModel {
        readout_error: args.readout_error,
        two_qubit_error: args.two_qubit_error,
    };
    Ok(Box::new(LocalSampler::noisy(noise)?))
}

fn handle_hardware(args: &HardwareArgs, out: &OutputArgs) -> Result<(), AppError> {
    let cfg = hardware_config(args);
    // Fail on bad flags before contacting the cloud.
    cfg.validate()?;

    let samplers = if args.cloud {
        cloud_samplers(args)?
    } else {
        vec![local_sampler(args)?]
    };
    let rep = hardware::run(&samplers, &cfg)?;

    let ascii: Vec<AsciiSeries> = rep
        .backends
        .first()
        .and_then(|b| b.runs.first())
        .map(|run| {
            run.families
                .iter()
                .map(|f| AsciiSeries::from_family(f.best()))
                .collect()
        })
        .unwrap_or_default();

    finish(
        out,
        Output {
            text: report::format_hardware(&rep),
            axes: ("depth", "otoc"),
            ascii,
            record: rep.record(),
        },
        |dir: &Path| Ok(vec![plot::write_hardware_figure(&rep, dir)?]),
    )
}

fn handle_figures(out: &OutputArgs) -> Result<(), AppError> {
    let rep = figures::run()?;

    let ascii: Vec<AsciiSeries> = rep
        .panels
        .iter()
        .map(|p| AsciiSeries {
            label: p.family.display_name().to_string(),
            glyph: plot::family_glyph(p.family),
            points: p
                .series
                .depths
                .iter()
                .copied()
                .zip(p.series.values.iter().copied())
                .collect(),
            curve: match &p.guide {
                figures::PanelGuide::Fit { curve, .. } => curve.clone(),
                figures::PanelGuide::Mean(_) => Vec::new(),
            },
        })
        .collect();

    finish(
        out,
        Output {
            text: report::format_figures(&rep),
            axes: ("depth", "otoc"),
            ascii,
            record: rep.record(),
        },
        |dir: &Path| plot::write_paper_figures(&rep, dir),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Cli {
        Cli::parse_from(argv)
    }

    #[test]
    fn hardware_flags_become_config() {
        let cli = parse(&["kaelion", "hardware", "--runs", "3", "--calibrate", "--depths", "1,2,4,6"]);
        let Command::Hardware(args) = cli.command else {
            panic!("expected hardware");
        };
        let cfg = hardware_config(&args);
        assert_eq!(cfg.runs, 3);
        assert!(cfg.calibrate);
        assert_eq!(cfg.depths, vec![1, 2, 4, 6]);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn noiseless_flags_pick_the_ideal_sampler() {
        let cli = parse(&["kaelion", "hardware"]);
        let Command::Hardware(args) = cli.command else {
            panic!("expected hardware");
        };
        assert!(local_sampler(&args).is_ok());
    }

    #[test]
    fn invalid_noise_is_a_config_error() {
        let cli = parse(&["kaelion", "hardware", "--readout-error", "1.5"]);
        let Command::Hardware(args) = cli.command else {
            panic!("expected hardware");
        };
        assert_eq!(local_sampler(&args).err().map(|e| e.exit_code()), Some(2));
    }

    #[test]
    fn export_writes_record_for_figures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figures.json");
        let out = OutputArgs {
            plot_dir: None,
            ascii_plot: false,
            width: 80,
            height: 20,
            export: Some(path.clone()),
        };
        handle_figures(&out).unwrap();
        let rec = crate::io::read_run_record(&path).unwrap();
        assert_eq!(rec.analysis, "figures");
    }
}
