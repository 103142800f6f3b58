//! SVG figures rendered with Plotters.
//!
//! Each analysis gets one figure (a 2×2 grid for the protocol analyses, one
//! panel per backend for hardware runs); the `figures` analysis writes the five
//! paper figures. Log axes are drawn by plotting `log10` of the data on a
//! linear axis and labelling ticks as powers of ten.

use std::error::Error;
use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::domain::CircuitFamily;
use crate::error::AppError;
use crate::experiment::astro::{AstroReport, SENSITIVITY, SENSITIVITY_YEARS};
use crate::experiment::bec::BecReport;
use crate::experiment::figures::{FiguresReport, LIMIT_POINTS, PanelGuide};
use crate::experiment::hardware::HardwareReport;
use crate::experiment::otoc::OtocProtocolReport;
use crate::experiment::simulate::SimulateReport;
use crate::experiment::FamilyFit;
use crate::math::linspace;
use crate::physics::{alpha_from_lambda, flow_profile, planck_occupation};

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;
type DrawResult = Result<(), Box<dyn Error>>;

const GRID_SIZE: (u32, u32) = (1200, 1000);
const WIDE_SIZE: (u32, u32) = (1400, 420);
const SINGLE_SIZE: (u32, u32) = (800, 520);

const CHAOTIC_RED: RGBColor = RGBColor(0xe7, 0x4c, 0x3c);
const INTEGRABLE_GREEN: RGBColor = RGBColor(0x2e, 0xcc, 0x71);
const INTERMEDIATE_BLUE: RGBColor = RGBColor(0x34, 0x98, 0xdb);
const ORANGE: RGBColor = RGBColor(0xf3, 0x9c, 0x12);
const PURPLE: RGBColor = RGBColor(0x8e, 0x44, 0xad);
const TEAL: RGBColor = RGBColor(0x1a, 0xbc, 0x9c);
const GRAY: RGBColor = RGBColor(0x7f, 0x8c, 0x8d);
const NOTE_BG: RGBColor = RGBColor(0xff, 0xfd, 0xe7);

pub fn family_color(family: CircuitFamily) -> RGBColor {
    match family {
        CircuitFamily::Chaotic => CHAOTIC_RED,
        CircuitFamily::Integrable => INTEGRABLE_GREEN,
        CircuitFamily::Intermediate => INTERMEDIATE_BLUE,
        CircuitFamily::KickedIsing => ORANGE,
        CircuitFamily::Syk => PURPLE,
        CircuitFamily::Floquet => TEAL,
    }
}

/// One labelled data set: scatter points and/or a polyline.
#[derive(Debug, Clone)]
struct XySeries {
    label: String,
    color: RGBColor,
    points: Vec<(f64, f64)>,
    line: Vec<(f64, f64)>,
}

impl XySeries {
    fn line(label: impl Into<String>, color: RGBColor, line: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.into(),
            color,
            points: Vec::new(),
            line,
        }
    }

    fn points(label: impl Into<String>, color: RGBColor, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.into(),
            color,
            points,
            line: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct XyPanel {
    title: String,
    x_desc: &'static str,
    y_desc: &'static str,
    x_range: Range<f64>,
    y_range: Range<f64>,
    log_x: bool,
    log_y: bool,
    series: Vec<XySeries>,
    /// Horizontal reference lines: (y, color, legend label).
    hlines: Vec<(f64, RGBColor, String)>,
    vlines: Vec<(f64, RGBColor, String)>,
}

impl XyPanel {
    fn new(title: impl Into<String>, x_desc: &'static str, y_desc: &'static str) -> Self {
        Self {
            title: title.into(),
            x_desc,
            y_desc,
            x_range: 0.0..1.0,
            y_range: 0.0..1.0,
            log_x: false,
            log_y: false,
            series: Vec::new(),
            hlines: Vec::new(),
            vlines: Vec::new(),
        }
    }

    fn ranges(mut self, x: Range<f64>, y: Range<f64>) -> Self {
        self.x_range = x;
        self.y_range = y;
        self
    }
}

#[derive(Debug, Clone)]
struct BarSeries {
    label: String,
    values: Vec<f64>,
    /// One color per bar, or a single color for the whole series.
    colors: Vec<RGBColor>,
}

#[derive(Debug, Clone)]
struct BarPanel {
    title: String,
    y_desc: &'static str,
    y_range: Range<f64>,
    categories: Vec<String>,
    series: Vec<BarSeries>,
    hlines: Vec<(f64, RGBColor, String)>,
    value_labels: bool,
}

fn scale(v: f64, log: bool) -> f64 {
    if log { v.log10() } else { v }
}

fn tick_label(v: f64, log: bool) -> String {
    if log {
        format!("{:.0e}", 10f64.powf(v))
    } else if v.abs() >= 1000.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

fn draw_xy(area: &Area, panel: &XyPanel) -> DrawResult {
    let (log_x, log_y) = (panel.log_x, panel.log_y);
    let xr = scale(panel.x_range.start, log_x)..scale(panel.x_range.end, log_x);
    let yr = scale(panel.y_range.start, log_y)..scale(panel.y_range.end, log_y);
    let project = |pts: &[(f64, f64)]| -> Vec<(f64, f64)> {
        pts.iter()
            .map(|&(x, y)| (scale(x, log_x), scale(y, log_y)))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect()
    };

    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 18))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(xr.clone(), yr.clone())?;

    chart
        .configure_mesh()
        .x_desc(panel.x_desc)
        .y_desc(panel.y_desc)
        .x_label_formatter(&|v| tick_label(*v, log_x))
        .y_label_formatter(&|v| tick_label(*v, log_y))
        .draw()?;

    for s in &panel.series {
        let color = s.color;
        let mut labelled = false;
        if !s.line.is_empty() {
            let anno = chart.draw_series(LineSeries::new(project(&s.line), color.stroke_width(2)))?;
            if !s.label.is_empty() {
                anno.label(s.label.clone())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                labelled = true;
            }
        }
        if !s.points.is_empty() {
            let anno = chart.draw_series(
                project(&s.points)
                    .into_iter()
                    .map(|p| Circle::new(p, 4, color.filled())),
            )?;
            if !labelled && !s.label.is_empty() {
                anno.label(s.label.clone())
                    .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
            }
        }
    }

    for (y, color, label) in &panel.hlines {
        let (c, yv) = (*color, scale(*y, log_y));
        let anno = chart.draw_series(std::iter::once(PathElement::new(
            vec![(xr.start, yv), (xr.end, yv)],
            c.mix(0.7),
        )))?;
        if !label.is_empty() {
            anno.label(label.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], c));
        }
    }
    for (x, color, label) in &panel.vlines {
        let (c, xv) = (*color, scale(*x, log_x));
        let anno = chart.draw_series(std::iter::once(PathElement::new(
            vec![(xv, yr.start), (xv, yr.end)],
            c.mix(0.7),
        )))?;
        if !label.is_empty() {
            anno.label(label.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], c));
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_bars(area: &Area, panel: &BarPanel) -> DrawResult {
    let n = panel.categories.len();
    let groups = panel.series.len().max(1);
    let width = 0.8 / groups as f64;

    let categories = panel.categories.clone();
    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 18))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), panel.y_range.clone())?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(2 * n + 1)
        .x_label_formatter(&|v| {
            let i = v.round();
            if (v - i).abs() < 1e-6 && i >= 0.0 {
                categories.get(i as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .y_desc(panel.y_desc)
        .draw()?;

    for (g, s) in panel.series.iter().enumerate() {
        let offset = (g as f64 - (groups as f64 - 1.0) / 2.0) * width;
        let color_at = |i: usize| s.colors.get(i).or(s.colors.first()).copied().unwrap_or(GRAY);
        let anno = chart.draw_series(s.values.iter().enumerate().map(|(i, &v)| {
            let x0 = i as f64 + offset - width / 2.0;
            Rectangle::new([(x0, 0.0), (x0 + width, v)], color_at(i).mix(0.85).filled())
        }))?;
        if !s.label.is_empty() {
            let c = color_at(0);
            anno.label(s.label.clone())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], c.filled()));
        }
        if panel.value_labels {
            let pad = (panel.y_range.end - panel.y_range.start) * 0.03;
            chart.draw_series(s.values.iter().enumerate().map(|(i, &v)| {
                Text::new(
                    format!("λ = {v:.3}"),
                    (i as f64 + offset - width / 3.0, v + 2.0 * pad),
                    ("sans-serif", 14).into_font(),
                )
            }))?;
        }
    }

    for (y, color, label) in &panel.hlines {
        let c = *color;
        let anno = chart.draw_series(std::iter::once(PathElement::new(
            vec![(-0.5, *y), (n as f64 - 0.5, *y)],
            c.mix(0.6),
        )))?;
        if !label.is_empty() {
            anno.label(label.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], c));
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_note(area: &Area, lines: &[String]) -> DrawResult {
    area.fill(&NOTE_BG)?;
    let style = ("monospace", 15).into_font().color(&BLACK);
    for (i, line) in lines.iter().enumerate() {
        area.draw(&Text::new(line.clone(), (30, 30 + 19 * i as i32), style.clone()))?;
    }
    Ok(())
}

fn render<F>(dir: &Path, file: &str, size: (u32, u32), draw: F) -> Result<PathBuf, AppError>
where
    F: FnOnce(&Area) -> DrawResult,
{
    std::fs::create_dir_all(dir).map_err(|e| {
        AppError::config(format!("Cannot create plot directory {}: {e}", dir.display()))
    })?;
    let path = dir.join(file);

    let outcome = (|| -> DrawResult {
        let root = SVGBackend::new(&path, size).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
        Ok(())
    })();
    outcome.map_err(|e| AppError::numeric(format!("Failed to draw {}: {e}", path.display())))?;

    tracing::info!(path = %path.display(), "figure written");
    Ok(path)
}

fn fit_curve_points(ff: &FamilyFit, x_min: f64, x_max: f64) -> Vec<(f64, f64)> {
    ff.decay()
        .map(|f| {
            linspace(x_min, x_max, 100)
                .into_iter()
                .map(|t| (t, f.predict(t)))
                .collect()
        })
        .unwrap_or_default()
}

fn series_points(ff: &FamilyFit) -> Vec<(f64, f64)> {
    ff.series
        .depths
        .iter()
        .copied()
        .zip(ff.series.values.iter().copied())
        .collect()
}

fn depth_span(depths: &[f64]) -> (f64, f64) {
    let lo = depths.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = depths.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo.is_finite() && hi > lo { (lo, hi) } else { (0.0, 1.0) }
}

/// Family OTOC curves with their decay fits, on one panel.
fn otoc_panel(title: String, fits: &[&FamilyFit]) -> XyPanel {
    let all: Vec<f64> = fits.iter().flat_map(|f| f.series.depths.iter().copied()).collect();
    let (lo, hi) = depth_span(&all);
    let mut panel = XyPanel::new(title, "Circuit depth", "OTOC F(d)")
        .ranges((lo - 0.5)..(hi + 0.5), -0.05..1.05);
    for ff in fits {
        let color = family_color(ff.series.family);
        let label = match ff.estimate() {
            Some(e) => format!("{} (λ={:.2})", ff.series.family.display_name(), e.lambda_k),
            None => format!("{} (fit failed)", ff.series.family.display_name()),
        };
        panel.series.push(XySeries {
            label,
            color,
            points: series_points(ff),
            line: fit_curve_points(ff, lo, hi),
        });
    }
    panel
}

const OTOC_NOTE: [&str; 24] = [
    "EXPERIMENTAL PROTOCOL SUMMARY",
    "",
    "PLATFORMS:",
    "• IBM Quantum (Qiskit)",
    "• Google Quantum AI",
    "• IonQ / Rigetti",
    "",
    "REQUIREMENTS:",
    "• 4-10 qubits",
    "• Depth: 1-50 layers",
    "• Shots: 8000+ per point",
    "• ~30 minutes per run",
    "",
    "KEY MEASUREMENTS:",
    "1. Chaotic circuit → λ ~ 0.8",
    "2. Integrable circuit → λ ~ 0.1",
    "3. Intermediate → λ ~ 0.4",
    "",
    "VALIDATION:",
    "• λ ∈ [0, 1] ✓",
    "• α = -0.5 - λ ✓",
    "• Matches theoretical prediction",
    "",
    "STATUS: Ready for implementation",
];

const SCENARIO_COLORS: [RGBColor; 3] = [CHAOTIC_RED, ORANGE, INTERMEDIATE_BLUE];

pub fn write_otoc_figure(report: &OtocProtocolReport, dir: &Path) -> Result<PathBuf, AppError> {
    let t = linspace(0.0, 5.0, 50);

    let mut decay = XyPanel::new("Expected OTOC Decay", "Time (circuit depth)", "OTOC F(t)")
        .ranges(0.0..5.0, 1e-6..1.5);
    decay.log_y = true;
    for (i, s) in report.scenarios.iter().enumerate() {
        let lam = s.scenario.lambda_l;
        decay.series.push(XySeries::line(
            format!("{} (λ_L={lam})", s.scenario.name),
            SCENARIO_COLORS[i % 3],
            t.iter().map(|&ti| (ti, (-lam * ti).exp())).collect(),
        ));
    }

    let fitted: Vec<(String, f64, f64, RGBColor)> = report
        .scenarios
        .iter()
        .enumerate()
        .filter_map(|(i, s)| {
            let (_, e) = s.fit.fitted()?;
            Some((s.scenario.name.to_string(), e.lambda_k, e.alpha, SCENARIO_COLORS[i % 3]))
        })
        .collect();

    let bars = BarPanel {
        title: "Expected λ by Circuit Type".to_string(),
        y_desc: "λ_Kaelion",
        y_range: 0.0..1.2,
        categories: fitted.iter().map(|f| f.0.clone()).collect(),
        series: vec![BarSeries {
            label: String::new(),
            values: fitted.iter().map(|f| f.1).collect(),
            colors: fitted.iter().map(|f| f.3).collect(),
        }],
        hlines: vec![
            (1.0, INTEGRABLE_GREEN, "Holographic limit".to_string()),
            (0.0, PURPLE, "LQG limit".to_string()),
        ],
        value_labels: false,
    };

    let mut relation = XyPanel::new("Kaelion Relation: α(λ) = -0.5 - λ", "λ_Kaelion", "α")
        .ranges(-0.05..1.05, -1.6..-0.4);
    relation.series.push(XySeries::line(
        "α = -0.5 - λ",
        INTERMEDIATE_BLUE,
        linspace(0.0, 1.0, 50).into_iter().map(|l| (l, alpha_from_lambda(l))).collect(),
    ));
    for (name, l, a, color) in &fitted {
        relation
            .series
            .push(XySeries::points(name.clone(), *color, vec![(*l, *a)]));
    }

    let note: Vec<String> = OTOC_NOTE.iter().map(|s| s.to_string()).collect();
    render(dir, "experiment1_quantum_circuits.svg", GRID_SIZE, |root| {
        let panels = root.split_evenly((2, 2));
        draw_xy(&panels[0], &decay)?;
        draw_bars(&panels[1], &bars)?;
        draw_xy(&panels[2], &relation)?;
        draw_note(&panels[3], &note)
    })
}

const BEC_NOTE: [&str; 23] = [
    "BEC EXPERIMENT SUMMARY",
    "",
    "SYSTEM:",
    "• Supersonic BEC flow",
    "• Acoustic horizon at v = c",
    "• Analog Hawking radiation",
    "",
    "MEASUREMENTS:",
    "• Density correlations <n(x)n(x')>",
    "• Entanglement entropy",
    "• Hawking temperature",
    "",
    "KAELION PREDICTION:",
    "S = A/4 + α(λ)·log(A)",
    "α = -0.5 - λ",
    "",
    "EXPECTED λ:",
    "• Strong coupling: λ ~ 0.2",
    "• Weak coupling: λ ~ 0.8",
    "",
    "STATUS: Protocol ready",
    "",
    "",
];

pub fn write_bec_figure(report: &BecReport, dir: &Path) -> Result<PathBuf, AppError> {
    let c = report.system.sound_speed;
    let x = linspace(-5.0, 5.0, 100);
    let mut flow = XyPanel::new("Acoustic Horizon Formation", "Position x", "Velocity")
        .ranges(-5.0..5.0, 0.0..2.2);
    flow.series.push(XySeries::line(
        "Flow velocity v",
        INTERMEDIATE_BLUE,
        x.iter().map(|&xi| (xi, flow_profile(xi))).collect(),
    ));
    flow.hlines.push((c, CHAOTIC_RED, "Sound speed c".to_string()));
    flow.vlines.push((0.0, INTEGRABLE_GREEN, "Horizon (v=c)".to_string()));

    let (a_lo, a_hi) = depth_span(&report.areas);
    let s_lo = report.entropies.iter().copied().fold(f64::INFINITY, f64::min);
    let s_hi = report.entropies.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pad = ((s_hi - s_lo) * 0.1).max(0.1);
    let mut entropy = XyPanel::new("Entropy vs Area (Kaelion Fit)", "Horizon \"Area\" A", "Entropy S")
        .ranges(a_lo..a_hi, (s_lo - pad)..(s_hi + pad));
    entropy.series.push(XySeries::points(
        "Simulated data",
        INTERMEDIATE_BLUE,
        report.areas.iter().copied().zip(report.entropies.iter().copied()).collect(),
    ));
    if let Some(f) = report.fit.fitted() {
        entropy.series.push(XySeries::line(
            format!("Fit: α = {:.2}", f.alpha),
            CHAOTIC_RED,
            linspace(a_lo, a_hi, 100).into_iter().map(|a| (a, f.predict(a))).collect(),
        ));
    }

    let t_h = report.system.hawking_temperature();
    let omega = linspace(0.1, 5.0, 100);
    let occupation: Vec<(f64, f64)> = omega.iter().map(|&w| (w, planck_occupation(w, t_h))).collect();
    let n_max = occupation
        .iter()
        .map(|p| p.1)
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max)
        .max(1e-3);
    let mut spectrum = XyPanel::new(
        format!("Hawking Spectrum (T_H = {t_h:.3})"),
        "Frequency ω",
        "Occupation number",
    )
    .ranges(0.0..5.0, 0.0..(n_max * 1.05));
    spectrum.series.push(XySeries::line("", PURPLE, occupation));

    let note: Vec<String> = BEC_NOTE.iter().map(|s| s.to_string()).collect();
    render(dir, "experiment2_bec.svg", GRID_SIZE, |root| {
        let panels = root.split_evenly((2, 2));
        draw_xy(&panels[0], &flow)?;
        draw_xy(&panels[1], &entropy)?;
        draw_xy(&panels[2], &spectrum)?;
        draw_note(&panels[3], &note)
    })
}

const ASTRO_NOTE: [&str; 19] = [
    "ASTROPHYSICAL SIGNATURES",
    "",
    "EFFECT SIZE:",
    "• Stellar BH: ~0.1% correction",
    "• SMBH: ~0.001% correction",
    "",
    "CURRENT DETECTABILITY:",
    "• LIGO/Virgo: NO (need 100x)",
    "• EHT: NO (need 1000x)",
    "• X-ray: NO",
    "",
    "FUTURE:",
    "• Einstein Telescope (2035): MAYBE",
    "• LISA (2037): POSSIBLE for EMRIs",
    "",
    "RECOMMENDATION:",
    "Focus on lab experiments",
    "(quantum circuits, BEC)",
    "while waiting for better detectors",
];

pub fn write_astro_figure(report: &AstroReport, dir: &Path) -> Result<PathBuf, AppError> {
    let curves = &report.curves;

    let mut size = XyPanel::new("Kaelion Correction vs Black Hole Mass", "Mass (M_sun)", "Relative correction")
        .ranges(1.0..1e7, 1e-13..1.0);
    size.log_x = true;
    size.log_y = true;
    size.series.push(XySeries::line(
        "λ = 0.5",
        INTERMEDIATE_BLUE,
        curves.masses.iter().copied().zip(curves.corrections.iter().copied()).collect(),
    ));
    size.hlines.push((0.01, CHAOTIC_RED, "1% threshold".to_string()));
    size.hlines.push((0.001, ORANGE, "0.1% threshold".to_string()));

    let t_max = curves.ringdown_t.last().copied().unwrap_or(100.0);
    let mut ringdown = XyPanel::new(
        format!("Ringdown Waveform (M = {})", report.black_hole.mass),
        "Time (M)",
        "Strain h(t)",
    )
    .ranges(0.0..t_max, -1.05..1.05);
    ringdown.series.push(XySeries::line(
        "λ=0 (LQG)",
        INTERMEDIATE_BLUE,
        curves.ringdown_t.iter().copied().zip(curves.ringdown_lqg.iter().copied()).collect(),
    ));
    ringdown.series.push(XySeries::line(
        "λ=1 (Holographic)",
        CHAOTIC_RED,
        curves
            .ringdown_t
            .iter()
            .copied()
            .zip(curves.ringdown_holographic.iter().copied())
            .collect(),
    ));

    let mut timeline = XyPanel::new("Detector Sensitivity Timeline", "Year", "Fractional sensitivity")
        .ranges(2023.0..2047.0, 1e-4..1.0);
    timeline.log_y = true;
    let pts: Vec<(f64, f64)> = SENSITIVITY_YEARS.iter().copied().zip(SENSITIVITY).collect();
    timeline.series.push(XySeries {
        label: "GW sensitivity".to_string(),
        color: INTEGRABLE_GREEN,
        points: pts.clone(),
        line: pts,
    });
    timeline.hlines.push((
        curves.effect_line,
        CHAOTIC_RED,
        format!("Kaelion effect (M={})", report.black_hole.mass),
    ));

    let note: Vec<String> = ASTRO_NOTE.iter().map(|s| s.to_string()).collect();
    render(dir, "experiment3_astrophysical.svg", GRID_SIZE, |root| {
        let panels = root.split_evenly((2, 2));
        draw_xy(&panels[0], &size)?;
        draw_xy(&panels[1], &ringdown)?;
        draw_xy(&panels[2], &timeline)?;
        draw_note(&panels[3], &note)
    })
}

pub fn write_simulate_figure(report: &SimulateReport, dir: &Path) -> Result<PathBuf, AppError> {
    let fits: Vec<&FamilyFit> = report.families.iter().map(|f| &f.result).collect();
    let panel = otoc_panel("Ideal simulator: OTOC vs depth".to_string(), &fits);
    render(dir, "simulate_ideal.svg", SINGLE_SIZE, |root| draw_xy(root, &panel))
}

pub fn write_hardware_figure(report: &HardwareReport, dir: &Path) -> Result<PathBuf, AppError> {
    let panels: Vec<XyPanel> = report
        .backends
        .iter()
        .filter_map(|b| {
            let run = b.runs.first()?;
            let fits: Vec<&FamilyFit> = run.families.iter().map(|f| f.best()).collect();
            Some(otoc_panel(format!("{}: OTOC vs depth (run 1)", b.backend), &fits))
        })
        .collect();
    if panels.is_empty() {
        return Err(AppError::insufficient_data("No hardware runs to plot."));
    }
    let height = SINGLE_SIZE.1 * panels.len() as u32;
    render(dir, "hardware_otoc.svg", (SINGLE_SIZE.0, height), |root| {
        let areas = root.split_evenly((panels.len(), 1));
        for (area, panel) in areas.iter().zip(&panels) {
            draw_xy(area, panel)?;
        }
        Ok(())
    })
}

/// Figures 1–5. Returns the written paths in order.
pub fn write_paper_figures(report: &FiguresReport, dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut written = Vec::with_capacity(5);

    // Figure 1: decay panels.
    let decay_panels: Vec<XyPanel> = report
        .panels
        .iter()
        .map(|p| {
            let color = family_color(p.family);
            let mut panel = XyPanel::new(
                format!("{}: λ = {:.2}, α = {:.2}", p.family.display_name(), p.lambda_k, p.alpha),
                "Circuit Depth",
                "OTOC F(d)",
            )
            .ranges(0.0..15.0, -0.05..0.6);
            panel.series.push(XySeries::points(
                "Data",
                color,
                p.series.depths.iter().copied().zip(p.series.values.iter().copied()).collect(),
            ));
            match &p.guide {
                PanelGuide::Fit { curve, .. } if !curve.is_empty() => {
                    panel.series.push(XySeries::line("Fit", color, curve.clone()));
                }
                PanelGuide::Fit { .. } => {}
                PanelGuide::Mean(m) => panel.hlines.push((*m, color, "Mean".to_string())),
            }
            panel
        })
        .collect();
    written.push(render(dir, "figure1_otoc_decay.svg", WIDE_SIZE, |root| {
        let areas = root.split_evenly((1, decay_panels.len().max(1)));
        for (area, panel) in areas.iter().zip(&decay_panels) {
            draw_xy(area, panel)?;
        }
        Ok(())
    })?);

    // Figure 2: λ by family.
    let bars = BarPanel {
        title: "Extracted λ Values by Circuit Type".to_string(),
        y_desc: "Extracted λ",
        y_range: -0.1..1.2,
        categories: report
            .lambda_bars
            .iter()
            .map(|(f, _)| f.display_name().to_string())
            .collect(),
        series: vec![BarSeries {
            label: String::new(),
            values: report.lambda_bars.iter().map(|(_, l)| *l).collect(),
            colors: report.lambda_bars.iter().map(|(f, _)| family_color(*f)).collect(),
        }],
        hlines: vec![
            (1.0, PURPLE, "Holographic limit (λ=1)".to_string()),
            (0.0, INTEGRABLE_GREEN, "LQG limit (λ=0)".to_string()),
            (0.5, GRAY, String::new()),
        ],
        value_labels: true,
    };
    written.push(render(dir, "figure2_lambda_values.svg", SINGLE_SIZE, |root| {
        draw_bars(root, &bars)
    })?);

    // Figure 3: α(λ) verification.
    let mut relation = XyPanel::new("Verification of α(λ) = -0.5 - λ", "λ (Kaelion parameter)", "α (Entropy coefficient)")
        .ranges(-0.1..1.1, -1.7..-0.3);
    relation.series.push(XySeries::line(
        "α(λ) = -0.5 - λ",
        BLACK,
        linspace(0.0, 1.0, 100).into_iter().map(|l| (l, alpha_from_lambda(l))).collect(),
    ));
    for p in &report.panels {
        relation.series.push(XySeries::points(
            format!("{}: λ={:.2}, α={:.2}", p.family.display_name(), p.lambda_k, p.alpha),
            family_color(p.family),
            vec![(p.lambda_k, p.alpha)],
        ));
    }
    for (i, (name, l, a)) in LIMIT_POINTS.iter().enumerate() {
        relation.series.push(XySeries::points(
            format!("{name} prediction ({l}, {a})"),
            if i == 0 { INTEGRABLE_GREEN } else { PURPLE },
            vec![(*l, *a)],
        ));
    }
    written.push(render(dir, "figure3_alpha_lambda.svg", SINGLE_SIZE, |root| {
        draw_xy(root, &relation)
    })?);

    // Figure 4: transpiled gate counts.
    let g_max = report
        .transpiled
        .iter()
        .flat_map(|(_, g)| g.iter().copied())
        .max()
        .unwrap_or(1) as f64;
    let (d_lo, d_hi) = depth_span(&report.depths);
    let mut gates = XyPanel::new("Circuit Complexity After Transpilation", "Logical Depth", "Transpiled Gate Count")
        .ranges((d_lo - 0.5)..(d_hi + 0.5), 0.0..(g_max * 1.1));
    for (family, counts) in &report.transpiled {
        let pts: Vec<(f64, f64)> = report
            .depths
            .iter()
            .copied()
            .zip(counts.iter().map(|&c| f64::from(c)))
            .collect();
        gates.series.push(XySeries {
            label: family.display_name().to_string(),
            color: family_color(*family),
            points: pts.clone(),
            line: pts,
        });
    }
    written.push(render(dir, "figure4_transpiled_depths.svg", SINGLE_SIZE, |root| {
        draw_xy(root, &gates)
    })?);

    // Figure 5: reproducibility.
    let families = CircuitFamily::baseline();
    let run_colors = [INTERMEDIATE_BLUE, ORANGE, INTEGRABLE_GREEN];
    let repro = BarPanel {
        title: "Reproducibility Across Runs (Run 3 used corrected seeds)".to_string(),
        y_desc: "Extracted λ",
        y_range: 0.0..1.1,
        categories: families.iter().map(|f| f.display_name().to_string()).collect(),
        series: report
            .reproducibility
            .iter()
            .enumerate()
            .map(|(i, run)| BarSeries {
                label: run.label.to_string(),
                values: families
                    .iter()
                    .map(|&f| run.lambda_for(f).unwrap_or(0.0))
                    .collect(),
                colors: vec![run_colors[i % run_colors.len()]],
            })
            .collect(),
        hlines: Vec::new(),
        value_labels: false,
    };
    written.push(render(dir, "figure5_reproducibility.svg", SINGLE_SIZE, |root| {
        draw_bars(root, &repro)
    })?);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{astro, bec, figures, otoc};

    #[test]
    fn log_ticks_are_powers_of_ten() {
        assert_eq!(tick_label(-2.0, true), "1e-2");
        assert_eq!(tick_label(0.25, false), "0.25");
        assert_eq!(scale(100.0, true), 2.0);
    }

    #[test]
    fn writes_protocol_figures() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_otoc_figure(&otoc::run(&otoc::OtocProtocolConfig::default()).unwrap(), dir.path()).unwrap();
        assert!(p.exists());
        let p = write_bec_figure(&bec::run(&bec::BecConfig::default()).unwrap(), dir.path()).unwrap();
        let svg = std::fs::read_to_string(p).unwrap();
        assert!(svg.contains("<svg"));
        let p = write_astro_figure(&astro::run(&astro::AstroConfig::default()).unwrap(), dir.path()).unwrap();
        assert!(p.exists());
    }

    #[test]
    fn writes_five_paper_figures() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_paper_figures(&figures::run().unwrap(), dir.path()).unwrap();
        assert_eq!(paths.len(), 5);
        assert!(paths.iter().all(|p| p.exists()));
    }
}
