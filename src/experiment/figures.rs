//! Paper figures from the recorded ibm_torino campaign.
//!
//! This module prepares the numbers; `plot::chart` draws them.

use crate::data::{RECORDED_BACKEND, RECORDED_RUN, REPRODUCIBILITY_RUNS, RecordedFamily, ReproducibilityRun};
use crate::domain::{CircuitFamily, DEFAULT_DEPTHS, OtocSeries, RunRecord, SeriesRecord};
use crate::error::AppError;
use crate::fit::{DecayFit, FitOptions, FitStatus, fit_otoc_decay};
use crate::math::{linspace, mean};
use crate::physics::alpha_from_lambda;

/// Reference points drawn on the α(λ) figure: (label, λ, α).
pub const LIMIT_POINTS: [(&str, f64, f64); 2] = [("LQG", 0.0, -0.5), ("Holographic", 1.0, -1.5)];

/// What is drawn through a family's decay points.
#[derive(Debug, Clone)]
pub enum PanelGuide {
    /// Decay fit of the points after the first, sampled on `[1, 14]`.
    Fit {
        fit: FitStatus<DecayFit>,
        curve: Vec<(f64, f64)>,
    },
    /// Flat line at the mean of the points after the first.
    Mean(f64),
}

#[derive(Debug, Clone)]
pub struct DecayPanel {
    pub family: CircuitFamily,
    pub series: OtocSeries,
    pub lambda_k: f64,
    pub alpha: f64,
    pub guide: PanelGuide,
}

#[derive(Debug, Clone)]
pub struct FiguresReport {
    pub backend: &'static str,
    pub depths: Vec<f64>,
    pub panels: Vec<DecayPanel>,
    /// λ per family in bar order: chaotic, intermediate, integrable.
    pub lambda_bars: Vec<(CircuitFamily, f64)>,
    pub transpiled: Vec<(CircuitFamily, Vec<u32>)>,
    pub reproducibility: &'static [ReproducibilityRun],
}

impl FiguresReport {
    /// Families whose recorded α deviates from `−0.5 − λ`.
    pub fn alpha_outliers(&self) -> Vec<CircuitFamily> {
        self.panels
            .iter()
            .filter(|p| (p.alpha - alpha_from_lambda(p.lambda_k)).abs() > 1e-3)
            .map(|p| p.family)
            .collect()
    }

    pub fn record(&self) -> RunRecord {
        let mut rec = RunRecord::new("figures");
        rec.backend = Some(self.backend.to_string());
        for p in &self.panels {
            rec.series.push(SeriesRecord {
                label: p.family.display_name().to_string(),
                x: p.series.depths.clone(),
                y: p.series.values.clone(),
                lambda_l: None,
                lambda_k: Some(p.lambda_k),
                alpha: Some(p.alpha),
                fit_error: match &p.guide {
                    PanelGuide::Fit { fit, .. } => fit.failure().map(str::to_string),
                    PanelGuide::Mean(_) => None,
                },
            });
        }
        for run in self.reproducibility {
            for family in CircuitFamily::baseline() {
                if let Some(l) = run.lambda_for(family) {
                    rec.scalar(format!("{}.{}", run.label, family.display_name()), l);
                }
            }
        }
        rec
    }
}

fn panel(recorded: &RecordedFamily) -> Result<DecayPanel, AppError> {
    let series = recorded.series();
    let tail = series.skip_first(1);

    let guide = if recorded.family == CircuitFamily::Integrable {
        let m = mean(&tail.values).ok_or_else(|| {
            AppError::insufficient_data("Integrable series has no points after depth 1.")
        })?;
        PanelGuide::Mean(m)
    } else {
        let fit = FitStatus::from_result(fit_otoc_decay(
            &tail.depths,
            &tail.values,
            &FitOptions::figure_decay(),
        ));
        let curve = fit
            .fitted()
            .map(|f| {
                linspace(1.0, 14.0, 100)
                    .into_iter()
                    .map(|t| (t, f.predict(t)))
                    .collect()
            })
            .unwrap_or_default();
        PanelGuide::Fit { fit, curve }
    };

    Ok(DecayPanel {
        family: recorded.family,
        series,
        lambda_k: recorded.lambda_k,
        alpha: recorded.alpha,
        guide,
    })
}

pub fn run() -> Result<FiguresReport, AppError> {
    let panels = RECORDED_RUN
        .iter()
        .map(panel)
        .collect::<Result<Vec<_>, _>>()?;

    let lambda_bars = [
        CircuitFamily::Chaotic,
        CircuitFamily::Intermediate,
        CircuitFamily::Integrable,
    ]
    .into_iter()
    .filter_map(|f| panels.iter().find(|p| p.family == f).map(|p| (f, p.lambda_k)))
    .collect();

    let transpiled = RECORDED_RUN
        .iter()
        .map(|r| (r.family, r.transpiled_gates.to_vec()))
        .collect();

    Ok(FiguresReport {
        backend: RECORDED_BACKEND,
        depths: DEFAULT_DEPTHS.iter().map(|&d| d as f64).collect(),
        panels,
        lambda_bars,
        transpiled,
        reproducibility: &REPRODUCIBILITY_RUNS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_panels_with_integrable_mean_line() {
        let r = run().unwrap();
        assert_eq!(r.panels.len(), 3);
        for p in &r.panels {
            match (&p.guide, p.family) {
                (PanelGuide::Mean(m), CircuitFamily::Integrable) => {
                    let expected = (0.4143 + 0.4258 + 0.4045 + 0.4194 + 0.3850 + 0.3684) / 6.0;
                    assert!((m - expected).abs() < 1e-12);
                }
                (PanelGuide::Fit { curve, fit }, _) => {
                    if fit.fitted().is_some() {
                        assert_eq!(curve.len(), 100);
                        assert_eq!(curve[0].0, 1.0);
                    }
                }
                other => panic!("unexpected guide {other:?}"),
            }
        }
    }

    #[test]
    fn bars_are_in_figure_order() {
        let r = run().unwrap();
        let order: Vec<CircuitFamily> = r.lambda_bars.iter().map(|(f, _)| *f).collect();
        assert_eq!(
            order,
            vec![
                CircuitFamily::Chaotic,
                CircuitFamily::Intermediate,
                CircuitFamily::Integrable
            ]
        );
    }

    #[test]
    fn recorded_alphas_follow_the_relation() {
        assert!(run().unwrap().alpha_outliers().is_empty());
    }

    #[test]
    fn record_includes_reproducibility_scalars() {
        let rec = run().unwrap().record();
        assert_eq!(rec.series.len(), 3);
        assert_eq!(rec.scalars.len(), 9);
        assert_eq!(rec.backend.as_deref(), Some("ibm_torino"));
    }
}
