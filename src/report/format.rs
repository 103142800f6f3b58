//! Formatted terminal output for every analysis.
//!
//! Formatting lives here so the analyses stay free of printing and output
//! changes stay local. All functions are pure and return `String`.

use crate::domain::CircuitFamily;
use crate::experiment::astro::{
    AstroReport, EHT_OBSERVABLES, EHT_STATUS, NEAR_TERM_STRATEGY, TIMELINE, XRAY_OBSERVABLES,
    XRAY_TARGETS,
};
use crate::experiment::bec::{BecReport, MATCH_TOLERANCE, MEASUREMENT_STEPS as BEC_STEPS, REGIMES};
use crate::experiment::figures::{FiguresReport, PanelGuide};
use crate::experiment::hardware::{BackendReport, FamilyRun, HardwareReport};
use crate::experiment::otoc::{
    ANALYSIS_STEPS, CIRCUIT_CONFIGS, MEASUREMENT_STEPS as OTOC_STEPS, OtocProtocolReport,
    REPETITIONS, TIME_POINTS,
};
use crate::experiment::simulate::SimulateReport;
use crate::experiment::{FamilyFit, Step};
use crate::fit::{DecayFit, LambdaEstimate};

const WIDTH: usize = 70;

const OTOC_OVERVIEW: [Step; 3] = [
    Step {
        title: "OBJECTIVE:",
        items: &[
            "Measure Kaelion parameter λ in a quantum circuit",
            "via Out-of-Time-Order Correlator (OTOC) decay",
        ],
    },
    Step {
        title: "PREDICTION:",
        items: &[
            "λ = λ_L / (2πT)",
            "where λ_L = Lyapunov exponent from OTOC decay",
        ],
    },
    Step {
        title: "EXPECTED RANGE:",
        items: &[
            "Chaotic circuits: λ → 1 (holographic limit)",
            "Integrable circuits: λ → 0 (LQG limit)",
        ],
    },
];

const OTOC_CONCLUSION: [Step; 3] = [
    Step {
        title: "EXPECTED RESULTS:",
        items: &[
            "• Chaotic circuits: λ ≈ 0.8, α ≈ -1.3",
            "• Integrable circuits: λ ≈ 0.1, α ≈ -0.6",
            "• Intermediate: λ ≈ 0.4, α ≈ -0.9",
        ],
    },
    Step {
        title: "FALSIFIABLE PREDICTION:",
        items: &[
            "If measured λ falls outside [0, 1] or",
            "α ≠ -0.5 - λ within error bars,",
            "Kaelion is FALSIFIED.",
        ],
    },
    Step {
        title: "NEXT STEPS:",
        items: &[
            "1. Run on the ideal simulator (kaelion simulate)",
            "2. Run on real quantum hardware (kaelion hardware --cloud)",
            "3. Compare with theoretical predictions",
        ],
    },
];

const BEC_OVERVIEW: [Step; 3] = [
    Step {
        title: "PRINCIPLE:",
        items: &[
            "Supersonic flow in BEC creates acoustic horizon",
            "Phonons cannot escape → Analog of event horizon",
            "Hawking radiation → Correlated phonon pairs",
        ],
    },
    Step {
        title: "KAELION PREDICTION:",
        items: &[
            "Entropy of acoustic horizon follows:",
            "S = A/4 + α(λ)·log(A)",
            "where A = horizon \"area\" (perimeter in 1D)",
        ],
    },
    Step {
        title: "MEASURABLE:",
        items: &[
            "• Hawking temperature T_H",
            "• Correlation functions",
            "• Entanglement entropy",
        ],
    },
];

const BEC_CONCLUSION: [Step; 2] = [
    Step {
        title: "KAELION PREDICTIONS:",
        items: &[
            "• Strong interactions: λ ~ 0.2, α ~ -0.7",
            "• Weak interactions: λ ~ 0.8, α ~ -1.3",
            "• Intermediate: λ ~ 0.5, α ~ -1.0",
        ],
    },
    Step {
        title: "FALSIFIABLE:",
        items: &["If α ∉ [-1.5, -0.5] or α ≠ -0.5 - λ,", "Kaelion is FALSIFIED."],
    },
];

const ASTRO_OVERVIEW: [Step; 2] = [
    Step {
        title: "KEY INSIGHT:",
        items: &[
            "Kaelion predicts: S = A/4 + α(λ)·log(A)",
            "The log correction affects thermodynamics",
            "This should be visible in:",
            "  • Hawking radiation spectrum (modified)",
            "  • Quasinormal mode frequencies",
            "  • Merger ringdown waveforms",
        ],
    },
    Step {
        title: "CHALLENGE:",
        items: &[
            "Effects are tiny: O(log(M)/M) corrections",
            "Need high-precision observations",
        ],
    },
];

const ASTRO_CONCLUSION: [Step; 3] = [
    Step {
        title: "CURRENT DETECTABILITY:",
        items: &[
            "• LIGO/Virgo: NO (need 100x better)",
            "• EHT: NO (need 1000x better)",
            "• X-ray: NO (need better spectroscopy)",
        ],
    },
    Step {
        title: "FUTURE PROSPECTS:",
        items: &[
            "• Einstein Telescope (2035): MAYBE",
            "• LISA (2037): POSSIBLE for EMRIs",
            "• Advanced future tech: LIKELY",
        ],
    },
    Step {
        title: "RECOMMENDATION:",
        items: &[
            "• Priority: Lab experiments (circuits, BEC)",
            "• Secondary: Prepare analysis pipelines",
            "• Long-term: Wait for next-gen instruments",
        ],
    },
];

/// Title block between two rules.
pub fn banner(title: &str, subtitle: &str) -> String {
    let rule = "=".repeat(WIDTH);
    let mut out = format!("{rule}\n{title}\n");
    if !subtitle.is_empty() {
        out.push_str(subtitle);
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');
    out
}

pub fn section(title: &str) -> String {
    let rule = "=".repeat(WIDTH);
    format!("\n{rule}\n{title}\n{rule}\n")
}

/// Double-line box with a centered title and titled blocks of lines.
pub fn boxed(title: &str, blocks: &[Step]) -> String {
    let mut out = String::new();
    let bar = "═".repeat(WIDTH);
    let blank = format!("║{}║\n", " ".repeat(WIDTH));

    out.push_str(&format!("╔{bar}╗\n"));
    out.push_str(&blank);
    out.push_str(&box_line(&center(title, WIDTH)));
    out.push_str(&blank);
    out.push_str(&format!("╠{bar}╣\n"));
    out.push_str(&blank);
    for block in blocks {
        out.push_str(&box_line(&format!("  {}", block.title)));
        for item in block.items {
            out.push_str(&box_line(&format!("    {item}")));
        }
        out.push_str(&blank);
    }
    out.push_str(&format!("╚{bar}╝\n"));
    out
}

fn box_line(text: &str) -> String {
    let text = truncate(text, WIDTH);
    let pad = WIDTH.saturating_sub(text.chars().count());
    format!("║{text}{}║\n", " ".repeat(pad))
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let left = width.saturating_sub(len) / 2;
    format!("{}{text}", " ".repeat(left))
}

fn steps(blocks: &[Step]) -> String {
    let mut out = String::new();
    for block in blocks {
        out.push_str(&format!("\n{}\n", block.title));
        for item in block.items {
            out.push_str(&format!("   - {item}\n"));
        }
    }
    out
}

fn numbered(lines: &[&str]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&format!("  {line}\n"));
    }
    out
}

fn rule(widths: &[usize]) -> String {
    let parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    format!("{}\n", parts.join(" "))
}

fn check(ok: bool) -> &'static str {
    if ok { "✓" } else { "✗" }
}

fn yes_no(ok: bool) -> &'static str {
    if ok { "YES" } else { "NO" }
}

/// `λ_L=…, λ_K=…, α=…` or the failure reason.
fn fit_line(fit: Option<(&DecayFit, &LambdaEstimate)>, failure: Option<&str>) -> String {
    match (fit, failure) {
        (Some((d, e)), _) => format!(
            "λ_L={:.4}, λ_K={:.4}, α={:.4} (rmse {:.4})",
            e.lambda_l, e.lambda_k, e.alpha, d.rmse
        ),
        (None, Some(reason)) => format!("fit failed: {reason}"),
        (None, None) => "no fit".to_string(),
    }
}

fn family_fit_line(ff: &FamilyFit) -> String {
    fit_line(ff.fit.fitted().map(|(d, e)| (d, e)), ff.fit.failure())
}

fn fmt_values(values: &[f64], decimals: usize) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.decimals$}")).collect();
    format!("[{}]", parts.join(", "))
}

fn fmt_opt(v: Option<f64>, width: usize, decimals: usize) -> String {
    match v {
        Some(x) => format!("{x:<width$.decimals$}"),
        None => format!("{:<width$}", "n/a"),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

pub fn format_otoc_protocol(report: &OtocProtocolReport) -> String {
    let mut out = String::new();
    out.push_str(&banner(
        "KAELION EXPERIMENT 1: QUANTUM CIRCUITS",
        "Measuring λ via OTOC Decay",
    ));
    out.push('\n');
    out.push_str(&boxed("EXPERIMENTAL PROTOCOL FOR λ MEASUREMENT", &OTOC_OVERVIEW));

    out.push_str(&section("PART 1: CIRCUIT DESIGN"));
    out.push_str("\nCircuit configurations:\n");
    for (i, c) in CIRCUIT_CONFIGS.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. {} (expect λ in [{:.1}, {:.1}]):\n",
            i + 1,
            c.name.to_uppercase(),
            c.expected_lambda.0,
            c.expected_lambda.1
        ));
        out.push_str(&format!("   single_qubit_gates: {}\n", c.single_qubit.join(", ")));
        out.push_str(&format!("   two_qubit_gates: {}\n", c.two_qubit.join(", ")));
        out.push_str(&format!("   structure: {}\n", c.structure));
    }

    out.push_str(&section("PART 2: OTOC MEASUREMENT PROTOCOL"));
    out.push_str("\nOTOC Measurement Steps:\n");
    out.push_str(&numbered(&OTOC_STEPS));
    out.push_str(&format!("\nRepetitions: {REPETITIONS}\n"));
    out.push_str(&format!("Time points: {TIME_POINTS}\n"));

    out.push_str(&section("PART 3: DATA ANALYSIS PROTOCOL"));
    out.push('\n');
    out.push_str(&numbered(&ANALYSIS_STEPS));

    out.push_str(&section("PART 4: EXPECTED RESULTS"));
    out.push_str(&format!("\nEffective temperature T_eff = {}\n\n", report.t_eff));
    out.push_str(
        format!(
            "{:<15} {:<15} {:<15} {:<15} {:<10}\n",
            "Circuit Type", "λ_L (true)", "λ_L (fitted)", "λ_Kaelion", "α"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&rule(&[15, 15, 15, 15, 10]));
    for s in &report.scenarios {
        match s.fit.fitted() {
            Some((_, e)) => out.push_str(
                format!(
                    "{:<15} {:<15.3} {:<15.3} {:<15.3} {:<10.3}\n",
                    s.scenario.name, s.scenario.lambda_l, e.lambda_l, e.lambda_k, e.alpha
                )
                .trim_end(),
            ),
            None => out.push_str(&format!(
                "{:<15} {:<15.3} fit failed: {}",
                s.scenario.name,
                s.scenario.lambda_l,
                s.fit.failure().unwrap_or("unknown")
            )),
        }
        out.push('\n');
    }

    out.push_str(&section("PART 5: CIRCUIT IMPLEMENTATION"));
    let spec = &report.example_spec;
    out.push_str(&format!(
        "\nExample OTOC circuit: family={} depth={} qubits={} seed={}\n",
        spec.family.display_name(),
        spec.depth,
        spec.num_qubits,
        spec.seed
    ));
    out.push_str(&format!(
        "Gates: {} ({} two-qubit), circuit depth {}\n\n",
        report.example.gate_count(),
        report.example.two_qubit_count(),
        report.example.depth()
    ));
    out.push_str(&report.example_qasm);
    if !report.example_qasm.ends_with('\n') {
        out.push('\n');
    }

    out.push_str(&section("CONCLUSIONS"));
    out.push('\n');
    out.push_str(&boxed("QUANTUM CIRCUIT EXPERIMENT - READY", &OTOC_CONCLUSION));
    out
}

pub fn format_bec(report: &BecReport) -> String {
    let mut out = String::new();
    out.push_str(&banner(
        "KAELION EXPERIMENT 2: BEC ANALOG GRAVITY",
        "Measuring λ in Analog Black Holes",
    ));
    out.push('\n');
    out.push_str(&boxed("BEC ANALOG BLACK HOLE EXPERIMENT", &BEC_OVERVIEW));

    let sys = &report.system;
    out.push_str(&section("PART 1: BEC SYSTEM SETUP"));
    out.push_str("BEC Parameters:\n");
    out.push_str(&format!("  Speed of sound: c = {}\n", sys.sound_speed));
    out.push_str(&format!("  Flow velocity: v = {}\n", sys.flow_velocity));
    out.push_str(&format!("  Horizon exists: {}\n", sys.has_horizon()));
    out.push_str(&format!("  Surface gravity: κ = {:.3}\n", sys.surface_gravity()));
    out.push_str(&format!(
        "  Hawking temperature: T_H = {:.4}\n",
        sys.hawking_temperature()
    ));

    out.push_str(&section("PART 2: MEASUREMENT PROTOCOL"));
    out.push_str(&steps(&BEC_STEPS));

    out.push_str(&section("PART 3: DATA ANALYSIS"));
    out.push_str("\nSimulated Data Analysis:\n");
    out.push_str(&format!("  True λ = {}\n", report.lambda_true));
    out.push_str(&format!("  True α = {}\n", report.alpha_true()));
    match (report.fit.fitted(), report.recovery) {
        (Some(f), Some(r)) => {
            out.push_str(&format!("  Fitted α = {:.3} ± {:.3}\n", f.alpha, f.alpha_err));
            out.push_str(&format!("  Extracted λ = {:.3}\n", r.lambda_fit));
            out.push_str(&format!(
                "  Match (|Δλ| < {MATCH_TOLERANCE}): {}\n",
                r.matches
            ));
            out.push_str(&format!(
                "  α within [-1.5, -0.5]: {} {}\n",
                yes_no(r.alpha_in_band),
                check(r.alpha_in_band)
            ));
        }
        _ => out.push_str(&format!(
            "  fit failed: {}\n",
            report.fit.failure().unwrap_or("unknown")
        )),
    }

    out.push_str(&section("PART 4: EXPECTED RESULTS BY REGIME"));
    out.push('\n');
    out.push_str(
        format!("{:<25} {:<15} {:<15}\n", "Regime", "Expected λ", "Expected α").trim_end(),
    );
    out.push('\n');
    out.push_str(&rule(&[25, 15, 15]));
    for r in REGIMES {
        out.push_str(
            format!("{:<25} {:<15.1} {:<15.1}\n", r.name, r.lambda, r.alpha()).trim_end(),
        );
        out.push('\n');
    }

    out.push_str(&section("CONCLUSIONS"));
    out.push('\n');
    out.push_str(&boxed("BEC EXPERIMENT - PROTOCOL READY", &BEC_CONCLUSION));
    out
}

pub fn format_astro(report: &AstroReport) -> String {
    let mut out = String::new();
    out.push_str(&banner(
        "KAELION EXPERIMENT 3: ASTROPHYSICAL SIGNATURES",
        "Searching for λ in Black Hole Observations",
    ));
    out.push('\n');
    out.push_str(&boxed("ASTROPHYSICAL SIGNATURES OF KAELION", &ASTRO_OVERVIEW));

    let bh = &report.black_hole;
    out.push_str(&section("PART 1: GRAVITATIONAL WAVE SIGNATURES"));
    out.push_str(&format!("Black Hole Parameters (M = {} M_sun):\n", bh.mass));
    out.push_str(&format!("  Horizon area: A = {:.1}\n", bh.area()));
    out.push_str(&format!("  Standard entropy: S_BH = {:.1}\n", bh.standard_entropy()));
    out.push_str("\nKaelion corrections:\n");
    out.push_str(format!("{:<10} {:<15} {:<15}\n", "λ", "S_Kaelion", "Correction").trim_end());
    out.push('\n');
    out.push_str(&rule(&[10, 15, 15]));
    for c in &report.corrections {
        out.push_str(
            format!(
                "{:<10.1} {:<15.1} {:<15.2e}\n",
                c.lambda, c.kaelion_entropy, c.fraction
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out.push_str(&section("PART 2: EVENT HORIZON TELESCOPE SIGNATURES"));
    out.push_str("\nObservable effects:\n");
    out.push_str(&steps(&EHT_OBSERVABLES));
    out.push_str(&steps(&[EHT_STATUS]));

    out.push_str(&section("PART 3: X-RAY SIGNATURES"));
    out.push_str(&steps(&XRAY_OBSERVABLES));
    out.push_str(&steps(&[XRAY_TARGETS]));

    out.push_str(&section("PART 4: DETECTABILITY ANALYSIS"));
    out.push_str("Detectability by Mass:\n");
    out.push_str(
        format!(
            "{:<12} {:<15} {:<15} {:<12}\n",
            "M (M_sun)", "Correction", "SNR needed", "Detectable?"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&rule(&[12, 15, 15, 12]));
    for d in &report.detectability {
        out.push_str(
            format!(
                "{:<12.0} {:<15.2e} {:<15.1} {:<12}\n",
                d.mass,
                d.correction,
                d.snr_needed,
                if d.detectable { "YES ✓" } else { "NO ✗" }
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out.push_str(&section("PART 5: FUTURE DETECTION PROSPECTS"));
    out.push_str(&steps(&TIMELINE));
    out.push_str("\nRECOMMENDED STRATEGY:\n");
    out.push_str(&numbered(&NEAR_TERM_STRATEGY));

    out.push_str(&section("CONCLUSIONS"));
    out.push('\n');
    out.push_str(&boxed("ASTROPHYSICAL SIGNATURES - ANALYSIS COMPLETE", &ASTRO_CONCLUSION));
    out
}

pub fn format_simulate(report: &SimulateReport) -> String {
    let mut out = String::new();
    out.push_str(&banner("KAELION OTOC - IDEAL SIMULATOR (noise-free)", ""));
    out.push_str(&format!(
        "Qubits: {} | mode: {:?}{}\n",
        report.num_qubits,
        report.mode,
        if report.mode == crate::domain::CountsMode::Sampled {
            format!(" ({} shots)", report.shots)
        } else {
            String::new()
        }
    ));

    for f in &report.families {
        let s = &f.result.series;
        out.push_str(&format!("\n  ▶ {}\n", s.family.display_name().to_uppercase()));
        for (d, v) in s.depths.iter().zip(&s.values) {
            out.push_str(&format!("    Depth {:2}: OTOC = {v:.6}\n", *d as usize));
        }
    }

    out.push_str(&section("IDEAL SIMULATOR RESULTS"));
    out.push_str(format!("\n{:<15} {:<12} {:<10}\n", "Type", "λ_Kaelion", "α").trim_end());
    out.push('\n');
    out.push_str(&rule(&[15, 12, 10]));
    for f in &report.families {
        let name = f.result.series.family.display_name();
        match f.result.estimate() {
            Some(e) => out.push_str(
                format!("{name:<15} {:<12.4} {:<10.4}\n", e.lambda_k, e.alpha).trim_end(),
            ),
            None => out.push_str(&format!(
                "{name:<15} fit failed: {}",
                f.result.fit.failure().unwrap_or("unknown")
            )),
        }
        out.push('\n');
    }

    if report.families.iter().any(|f| f.hardware_lambda.is_some()) {
        out.push_str(&section("COMPARISON: IDEAL vs HARDWARE (recorded)"));
        out.push_str(
            format!(
                "\n{:<15} {:<12} {:<12} {:<10}\n",
                "Type", "λ ideal", "λ hardware", "|Δλ|"
            )
            .trim_end(),
        );
        out.push('\n');
        out.push_str(&rule(&[15, 12, 12, 10]));
        for f in report.families.iter().filter(|f| f.hardware_lambda.is_some()) {
            out.push_str(
                format!(
                    "{:<15} {} {} {}\n",
                    f.result.series.family.display_name(),
                    fmt_opt(f.result.estimate().map(|e| e.lambda_k), 12, 4),
                    fmt_opt(f.hardware_lambda, 12, 4),
                    fmt_opt(f.lambda_gap(), 10, 4)
                )
                .trim_end(),
            );
            out.push('\n');
        }
    }
    out
}

fn format_family_run(out: &mut String, fr: &FamilyRun) {
    out.push_str(&format!("  ▶ {}\n", fr.family.display_name().to_uppercase()));
    if let Some(id) = &fr.job_id {
        out.push_str(&format!("    Job: {id}\n"));
    }
    if !fr.transpiled_gates.is_empty() {
        let gates: Vec<String> = fr.transpiled_gates.iter().map(|g| g.to_string()).collect();
        out.push_str(&format!("    Transpiled gates: [{}]\n", gates.join(", ")));
    }
    out.push_str(&format!("    OTOC raw: {}\n", fmt_values(&fr.raw.series.values, 4)));
    out.push_str(&format!("    {:<10}: {}\n", "raw", family_fit_line(&fr.raw)));
    if let Some(c) = &fr.corrected {
        out.push_str(&format!("    OTOC corr: {}\n", fmt_values(&c.series.values, 4)));
        out.push_str(&format!("    {:<10}: {}\n", "corrected", family_fit_line(c)));
    }
}

fn format_backend(out: &mut String, b: &BackendReport, runs: usize) {
    out.push_str(&section(&format!("BACKEND: {}", b.backend)));

    if let Some(cal) = &b.calibration {
        out.push_str("Readout calibration:\n");
        out.push_str(&format!("  P(0…0|prep 0…0) = {:.4}\n", cal.fid_zero));
        out.push_str(&format!("  P(1…1|prep 1…1) = {:.4}\n", cal.fid_one));
        out.push_str(&format!("  Readout fidelity ≈ {:.4}\n", cal.readout_fidelity()));
        out.push_str(&format!("  Correction factor = {:.4}\n", cal.factor));
    }

    for run in &b.runs {
        out.push_str(&format!(
            "\n[Run {}/{}] circuit seed {}\n",
            run.index + 1,
            runs,
            run.circuit_seed
        ));
        for fr in &run.families {
            format_family_run(out, fr);
        }
    }

    if b.runs.len() > 1 {
        out.push_str(&format!("\nStatistics ({} runs):\n", b.runs.len()));
        out.push_str(
            format!(
                "{:<15} {:<12} {:<12} {:<10} {:<8}\n",
                "Type", "λ mean", "λ std", "Error %", "failed"
            )
            .trim_end(),
        );
        out.push('\n');
        out.push_str(&rule(&[15, 12, 12, 10, 8]));
        for s in &b.repeat_stats {
            let name = s.family.display_name();
            match s.summary {
                Some(sum) => out.push_str(
                    format!(
                        "{name:<15} {:<12.4} {:<12.4} {:<10} {:<8}\n",
                        sum.mean,
                        sum.std,
                        format!("{:.1}%", sum.relative_error_pct()),
                        s.failed
                    )
                    .trim_end(),
                ),
                None => out.push_str(&format!("{name:<15} every fit failed ({} runs)", s.failed)),
            }
            out.push('\n');
        }
        out.push_str("\nλ and α with error bars:\n");
        for s in &b.repeat_stats {
            if let (Some(sum), Some((alpha, err))) = (s.summary, s.alpha()) {
                out.push_str(&format!(
                    "  {:<15} λ = {:.3} ± {:.3}   α = {alpha:.3} ± {err:.3}\n",
                    s.family.display_name(),
                    sum.mean,
                    sum.std
                ));
            }
        }
    }

    if !b.zne.is_empty() {
        out.push_str("\nZero-noise extrapolation:\n");
        for z in &b.zne {
            out.push_str(&format!("  ▶ {}\n", z.family.display_name().to_uppercase()));
            for (factor, values) in z.factors.iter().zip(&z.otoc_by_factor) {
                out.push_str(&format!("    factor {factor}x: {}\n", fmt_values(values, 3)));
            }
            out.push_str(&format!(
                "    ZNE OTOC: {}\n",
                fmt_values(&z.extrapolated.series.values, 3)
            ));
        }
        out.push_str(
            format!("\n{:<15} {:<12} {:<12} {:<10}\n", "Type", "λ raw", "λ ZNE", "Consistent")
                .trim_end(),
        );
        out.push('\n');
        out.push_str(&rule(&[15, 12, 12, 10]));
        for z in &b.zne {
            out.push_str(
                format!(
                    "{:<15} {} {} {}\n",
                    z.family.display_name(),
                    fmt_opt(z.raw.estimate().map(|e| e.lambda_k), 12, 4),
                    fmt_opt(z.extrapolated.estimate().map(|e| e.lambda_k), 12, 4),
                    z.consistent().map(check).unwrap_or("n/a")
                )
                .trim_end(),
            );
            out.push('\n');
        }
    }

    out.push_str("\nVerification: α(λ) = -0.5 - λ\n");
    out.push_str(
        format!(
            "{:<15} {:<10} {:<12} {:<12} {}\n",
            "Circuit", "λ", "α measured", "α predicted", "Match"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&rule(&[15, 10, 12, 12, 5]));
    for v in &b.verification {
        out.push_str(
            format!(
                "{:<15} {:<10.4} {:<12.4} {:<12.4} {}\n",
                v.family.display_name(),
                v.lambda,
                v.alpha_measured,
                v.alpha_predicted,
                check(v.matches())
            )
            .trim_end(),
        );
        out.push('\n');
    }

    if let Some(u) = &b.universality {
        out.push_str(&format!(
            "\nUniversality ({} vs {}): λ = {:.3} vs {:.3}, |Δλ| = {:.3} → {}\n",
            u.first.display_name(),
            u.second.display_name(),
            u.lambda_first,
            u.lambda_second,
            u.delta(),
            if u.universal() {
                "UNIVERSAL ✓"
            } else {
                "NOT universal ✗"
            }
        ));
    }

    if !b.stability.is_empty() {
        out.push_str("\nStability vs chaotic:\n");
        for s in &b.stability {
            out.push_str(&format!(
                "  {:<15} std = {:.4} (chaotic {:.4}) → {} ({:+.1}% spread reduction)\n",
                s.family.display_name(),
                s.std,
                s.reference_std,
                if s.more_stable() { "more stable" } else { "less stable" },
                s.reduction_pct()
            ));
        }
    }

    if !b.variability.is_empty() {
        out.push_str("\nDiagnosis (fixed seed, spread is hardware noise):\n");
        for v in &b.variability {
            out.push_str(&format!(
                "  {:<15} std = {:.3} → {}\n",
                v.family.display_name(),
                v.std,
                if v.high() {
                    "HIGH hardware variability"
                } else {
                    "hardware stable"
                }
            ));
        }
    }
}

pub fn format_hardware(report: &HardwareReport) -> String {
    let cfg = &report.config;
    let mut out = String::new();
    out.push_str(&banner(
        "KAELION OTOC - HARDWARE RUN",
        &format!("Timestamp: {}", report.started_at.format("%Y-%m-%d %H:%M:%S UTC")),
    ));
    let families: Vec<&str> = cfg.families.iter().map(|f| f.display_name()).collect();
    let depths: Vec<String> = cfg.depths.iter().map(|d| d.to_string()).collect();
    out.push_str(&format!("Families: {}\n", families.join(", ")));
    out.push_str(&format!("Depths: [{}]\n", depths.join(", ")));
    out.push_str(&format!(
        "Qubits: {} | shots: {} | runs: {} | seed: {}{}\n",
        cfg.num_qubits,
        cfg.shots,
        cfg.runs,
        cfg.seed,
        if cfg.fixed_seed { " (fixed)" } else { "" }
    ));

    for b in &report.backends {
        format_backend(&mut out, b, cfg.runs);
    }

    if report.backends.len() > 1 {
        out.push_str(&section("RESULTS BY BACKEND"));
        let mut header = format!("\n{:<20}", "Backend");
        for f in &cfg.families {
            header.push_str(&format!(" {:<14}", format!("{} λ", f.display_name())));
        }
        out.push_str(header.trim_end());
        out.push('\n');
        let mut widths = vec![20];
        widths.extend(std::iter::repeat_n(14, cfg.families.len()));
        out.push_str(&rule(&widths));
        for b in &report.backends {
            let mut row = format!("{:<20}", truncate(&b.backend, 20));
            for &f in &cfg.families {
                row.push_str(&format!(" {}", fmt_opt(b.headline_lambda(f), 14, 4)));
            }
            out.push_str(row.trim_end());
            out.push('\n');
        }
    }
    out
}

pub fn format_figures(report: &FiguresReport) -> String {
    let mut out = String::new();
    out.push_str(&banner(
        "KAELION OTOC - PAPER FIGURES",
        &format!("Recorded run on {}", report.backend),
    ));

    out.push_str("\nFigure 1: OTOC decay\n");
    for p in &report.panels {
        let guide = match &p.guide {
            PanelGuide::Fit { fit, .. } => match fit.fitted() {
                Some(f) => format!("fit A={:.3} λ_L={:.3} B={:.3}", f.amplitude, f.lambda_l, f.offset),
                None => format!("fit failed: {}", fit.failure().unwrap_or("unknown")),
            },
            PanelGuide::Mean(m) => format!("mean = {m:.4}"),
        };
        out.push_str(&format!(
            "  {:<13} λ = {:.2}, α = {:.2} | {guide}\n",
            p.family.display_name(),
            p.lambda_k,
            p.alpha
        ));
    }

    out.push_str("\nFigure 2: λ by circuit type\n");
    for (f, l) in &report.lambda_bars {
        out.push_str(&format!("  {:<13} λ = {l:.3}\n", f.display_name()));
    }

    out.push_str("\nFigure 3: α(λ) = -0.5 - λ\n");
    let outliers = report.alpha_outliers();
    if outliers.is_empty() {
        out.push_str("  every family lies on the line ✓\n");
    } else {
        let names: Vec<&str> = outliers.iter().map(|f| f.display_name()).collect();
        out.push_str(&format!("  off the line: {}\n", names.join(", ")));
    }

    out.push_str("\nFigure 4: transpiled gate counts\n");
    let mut header = format!("  {:<13}", "Depth");
    for d in &report.depths {
        header.push_str(&format!(" {:>6}", *d as usize));
    }
    out.push_str(&header);
    out.push('\n');
    for (f, gates) in &report.transpiled {
        let mut row = format!("  {:<13}", f.display_name());
        for g in gates {
            row.push_str(&format!(" {g:>6}"));
        }
        out.push_str(&row);
        out.push('\n');
    }

    out.push_str("\nFigure 5: reproducibility\n");
    let families = CircuitFamily::baseline();
    let mut header = format!("  {:<30}", "Run");
    for f in families {
        header.push_str(&format!(" {:<13}", f.display_name()));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    for run in report.reproducibility {
        let mut row = format!("  {:<30}", run.label);
        for f in families {
            row.push_str(&format!(" {}", fmt_opt(run.lambda_for(f), 13, 4)));
        }
        out.push_str(row.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::LocalSampler;
    use crate::circuit::Sampler;
    use crate::experiment::{astro, bec, figures, hardware, otoc};

    #[test]
    fn box_lines_have_equal_width() {
        let txt = boxed("TITLE", &OTOC_OVERVIEW);
        let widths: Vec<usize> = txt.lines().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|&w| w == WIDTH + 2), "{widths:?}");
        assert!(txt.contains("λ = λ_L / (2πT)"));
    }

    #[test]
    fn banner_has_rules_around_title() {
        let b = banner("A", "B");
        let lines: Vec<&str> = b.lines().collect();
        assert_eq!(lines, vec!["=".repeat(WIDTH).as_str(), "A", "B", "=".repeat(WIDTH).as_str()]);
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }

    #[test]
    fn otoc_report_lists_every_scenario_and_qasm() {
        let txt = format_otoc_protocol(&otoc::run(&otoc::OtocProtocolConfig::default()).unwrap());
        for name in ["Chaotic", "Intermediate", "Integrable"] {
            assert!(txt.contains(name));
        }
        assert!(txt.contains("OPENQASM 3.0;"));
        assert!(txt.contains("PART 5"));
    }

    #[test]
    fn bec_report_shows_regime_table() {
        let txt = format_bec(&bec::run(&bec::BecConfig::default()).unwrap());
        assert!(txt.contains("Strong interactions       0.2"));
        assert!(txt.contains("Extracted λ"));
    }

    #[test]
    fn astro_report_has_one_row_per_mass() {
        let txt = format_astro(&astro::run(&astro::AstroConfig::default()).unwrap());
        assert_eq!(txt.matches("NO ✗").count(), 5);
    }

    #[test]
    fn hardware_report_includes_verification_and_failures() {
        let cfg = hardware::HardwareConfig {
            depths: vec![1, 2],
            shots: 200,
            ..hardware::HardwareConfig::default()
        };
        let samplers: Vec<Box<dyn Sampler>> = vec![Box::new(LocalSampler::ideal())];
        let txt = format_hardware(&hardware::run(&samplers, &cfg).unwrap());
        assert!(txt.contains("Timestamp: "));
        // Two depths cannot support a three-parameter fit.
        assert!(txt.contains("fit failed: "));
        assert!(txt.contains("Verification"));
    }

    #[test]
    fn figures_report_covers_all_five_figures() {
        let txt = format_figures(&figures::run().unwrap());
        for n in 1..=5 {
            assert!(txt.contains(&format!("Figure {n}:")));
        }
        assert!(txt.contains("every family lies on the line"));
    }
}
