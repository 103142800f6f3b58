//! Astrophysical signatures: how large the log correction is for real black
//! holes and whether any instrument could see it.

use crate::domain::{RunRecord, SeriesRecord};
use crate::error::AppError;
use crate::experiment::Step;
use crate::math::{linspace, logspace};
use crate::physics::{
    BlackHole, CURRENT_GW_SNR, Detectability, correction_size, detectability,
};

pub const CORRECTION_LAMBDAS: [f64; 3] = [0.0, 0.5, 1.0];
pub const DETECTABILITY_MASSES: [f64; 5] = [10.0, 30.0, 100.0, 1000.0, 1e6];
pub const DETECTABILITY_LAMBDA: f64 = 0.5;

pub const EHT_OBSERVABLES: [Step; 3] = [
    Step {
        title: "1. SHADOW SIZE",
        items: &[
            "Depends on photon sphere radius",
            "Kaelion might modify effective metric near horizon",
            "Precision needed: sub-percent",
        ],
    },
    Step {
        title: "2. PHOTON RING STRUCTURE",
        items: &[
            "Multiple light orbits create ring structure",
            "Kaelion affects innermost rings",
            "Observable in future EHT upgrades",
        ],
    },
    Step {
        title: "3. TEMPERATURE PROFILE",
        items: &[
            "Accretion disk temperature gradient",
            "Log corrections affect inner edge",
            "Very subtle effect",
        ],
    },
];

pub const EHT_STATUS: Step = Step {
    title: "CURRENT STATUS:",
    items: &[
        "EHT precision: ~10%",
        "Kaelion effect: ~0.01%",
        "NOT YET OBSERVABLE (need 1000x improvement)",
    ],
};

pub const XRAY_OBSERVABLES: [Step; 3] = [
    Step {
        title: "1. IRON Kα LINE PROFILE",
        items: &[
            "Gravitationally redshifted emission line",
            "Shape depends on metric near horizon",
            "Kaelion correction to innermost stable orbit",
        ],
    },
    Step {
        title: "2. QUASI-PERIODIC OSCILLATIONS (QPOs)",
        items: &[
            "Orbital frequencies near BH",
            "Sensitive to spacetime geometry",
            "Log corrections might be detectable",
        ],
    },
    Step {
        title: "3. THERMAL CONTINUUM",
        items: &[
            "Disk temperature profile",
            "Modified by Kaelion entropy",
            "Requires very precise spectroscopy",
        ],
    },
];

pub const XRAY_TARGETS: Step = Step {
    title: "BEST TARGETS:",
    items: &[
        "Cygnus X-1 (stellar mass BH)",
        "GRS 1915+105 (microquasar)",
        "M87* (supermassive, EHT target)",
    ],
};

pub const TIMELINE: [Step; 3] = [
    Step {
        title: "2025-2030: CURRENT TECHNOLOGY",
        items: &[
            "LIGO O4/O5 runs",
            "EHT imaging improvements",
            "NOT sensitive enough for Kaelion",
        ],
    },
    Step {
        title: "2030-2040: NEXT GENERATION",
        items: &[
            "Einstein Telescope (ET)",
            "LISA (space GW detector)",
            "ngEHT (next-gen Event Horizon Telescope)",
            "POSSIBLY detectable for extreme mass ratios",
        ],
    },
    Step {
        title: "2040+: FUTURE TECHNOLOGY",
        items: &[
            "Space-based X-ray interferometry",
            "Pulsar timing arrays",
            "LIKELY detectable",
        ],
    },
];

pub const NEAR_TERM_STRATEGY: [&str; 4] = [
    "1. Focus on quantum circuit / BEC experiments",
    "2. Prepare data analysis pipelines for future GW data",
    "3. Collaborate with LIGO/Virgo on ringdown analysis",
    "4. Wait for Einstein Telescope",
];

/// Projected fractional sensitivity of GW detectors by year.
pub const SENSITIVITY_YEARS: [f64; 5] = [2025.0, 2030.0, 2035.0, 2040.0, 2045.0];
pub const SENSITIVITY: [f64; 5] = [0.1, 0.03, 0.01, 0.003, 0.001];

#[derive(Debug, Clone)]
pub struct AstroConfig {
    pub mass: f64,
    pub current_snr: f64,
}

impl Default for AstroConfig {
    fn default() -> Self {
        Self {
            mass: 30.0,
            current_snr: CURRENT_GW_SNR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntropyCorrection {
    pub lambda: f64,
    pub kaelion_entropy: f64,
    pub fraction: f64,
}

/// Curves drawn in the astro figure.
#[derive(Debug, Clone)]
pub struct AstroCurves {
    pub masses: Vec<f64>,
    pub corrections: Vec<f64>,
    pub ringdown_t: Vec<f64>,
    pub ringdown_lqg: Vec<f64>,
    pub ringdown_holographic: Vec<f64>,
    /// Size of the effect for the configured mass, drawn against `SENSITIVITY`.
    pub effect_line: f64,
}

#[derive(Debug, Clone)]
pub struct AstroReport {
    pub black_hole: BlackHole,
    pub corrections: Vec<EntropyCorrection>,
    pub detectability: Vec<Detectability>,
    pub curves: AstroCurves,
}

pub fn run(cfg: &AstroConfig) -> Result<AstroReport, AppError> {
    if !(cfg.mass > 0.0) {
        return Err(AppError::config("Black hole mass must be > 0."));
    }
    if !(cfg.current_snr > 0.0) {
        return Err(AppError::config("Detector SNR must be > 0."));
    }
    let bh = BlackHole::new(cfg.mass);

    let corrections = CORRECTION_LAMBDAS
        .iter()
        .map(|&lambda| EntropyCorrection {
            lambda,
            kaelion_entropy: bh.kaelion_entropy(lambda),
            fraction: bh.correction_fraction(lambda),
        })
        .collect();

    let detectability = DETECTABILITY_MASSES
        .iter()
        .map(|&m| detectability(m, DETECTABILITY_LAMBDA, cfg.current_snr))
        .collect();

    let masses = logspace(0.0, 7.0, 50);
    let corrections_curve = masses
        .iter()
        .map(|&m| correction_size(m, DETECTABILITY_LAMBDA))
        .collect();
    let ringdown_t = linspace(0.0, 100.0, 500);
    let ringdown_lqg = ringdown_t.iter().map(|&t| bh.ringdown(t, 0.0)).collect();
    let ringdown_holographic = ringdown_t.iter().map(|&t| bh.ringdown(t, 1.0)).collect();

    tracing::debug!(mass = cfg.mass, area = bh.area(), "astro analysis evaluated");

    Ok(AstroReport {
        black_hole: bh,
        corrections,
        detectability,
        curves: AstroCurves {
            masses,
            corrections: corrections_curve,
            ringdown_t,
            ringdown_lqg,
            ringdown_holographic,
            effect_line: correction_size(cfg.mass, DETECTABILITY_LAMBDA),
        },
    })
}

impl AstroReport {
    pub fn record(&self) -> RunRecord {
        let mut rec = RunRecord::new("astro");
        rec.scalar("mass", self.black_hole.mass)
            .scalar("area", self.black_hole.area())
            .scalar("standard_entropy", self.black_hole.standard_entropy());
        for c in &self.corrections {
            rec.scalar(format!("correction_fraction_lambda_{:.1}", c.lambda), c.fraction);
        }
        rec.series.push(SeriesRecord {
            label: "correction_vs_mass".to_string(),
            x: self.detectability.iter().map(|d| d.mass).collect(),
            y: self.detectability.iter().map(|d| d.correction).collect(),
            lambda_l: None,
            lambda_k: Some(DETECTABILITY_LAMBDA),
            alpha: None,
            fit_error: None,
        });
        rec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_black_hole_has_thirty_solar_masses() {
        let r = run(&AstroConfig::default()).unwrap();
        let area = 16.0 * std::f64::consts::PI * 900.0;
        assert!((r.black_hole.area() - area).abs() < 1e-9);
        assert_eq!(r.corrections.len(), 3);
        // Every λ gives a negative log correction, larger for larger λ.
        assert!(r.corrections.iter().all(|c| c.fraction < 0.0));
        assert!(r.corrections[2].fraction < r.corrections[0].fraction);
    }

    #[test]
    fn nothing_in_the_mass_table_is_detectable_today() {
        let r = run(&AstroConfig::default()).unwrap();
        assert_eq!(r.detectability.len(), 5);
        assert!(r.detectability.iter().all(|d| !d.detectable));
        // Larger holes have smaller corrections.
        assert!(r.detectability.windows(2).all(|w| w[1].correction < w[0].correction));
    }

    #[test]
    fn curves_have_plot_resolution() {
        let r = run(&AstroConfig::default()).unwrap();
        assert_eq!(r.curves.masses.len(), 50);
        assert_eq!(r.curves.ringdown_t.len(), 500);
        assert!((r.curves.ringdown_lqg[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_positive_mass() {
        let cfg = AstroConfig {
            mass: 0.0,
            ..AstroConfig::default()
        };
        assert_eq!(run(&cfg).unwrap_err().exit_code(), 2);
    }
}
