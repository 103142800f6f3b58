//! The analyses behind each subcommand.
//!
//! Every analysis takes a config struct, returns a typed report, and can turn
//! that report into a `RunRecord` for `--export`. Printing and plotting live in
//! `crate::report` and `crate::plot`.

pub mod astro;
pub mod bec;
pub mod figures;
pub mod hardware;
pub mod otoc;
pub mod simulate;

use crate::domain::{Counts, OtocSeries, SeriesRecord, probability_of};
use crate::fit::{DecayFit, FitOptions, FitStatus, LambdaEstimate, estimate_lambda};

/// A titled block of bullet points in a narrative report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub title: &'static str,
    pub items: &'static [&'static str],
}

/// OTOC estimate from one histogram: the fraction of shots back in `|0…0⟩`.
pub fn otoc_from_counts(counts: &Counts, num_qubits: usize) -> f64 {
    probability_of(counts, &"0".repeat(num_qubits))
}

/// An OTOC series together with its (possibly failed) decay fit.
#[derive(Debug, Clone)]
pub struct FamilyFit {
    pub series: OtocSeries,
    pub fit: FitStatus<(DecayFit, LambdaEstimate)>,
}

impl FamilyFit {
    pub fn new(series: OtocSeries, opts: &FitOptions, t_eff: f64) -> Self {
        let fit = FitStatus::from_result(estimate_lambda(&series, opts, t_eff));
        Self { series, fit }
    }

    pub fn estimate(&self) -> Option<LambdaEstimate> {
        self.fit.fitted().map(|(_, e)| *e)
    }

    pub fn decay(&self) -> Option<&DecayFit> {
        self.fit.fitted().map(|(d, _)| d)
    }

    pub fn record(&self, label: impl Into<String>) -> SeriesRecord {
        let est = self.estimate();
        SeriesRecord {
            label: label.into(),
            x: self.series.depths.clone(),
            y: self.series.values.clone(),
            lambda_l: est.map(|e| e.lambda_l),
            lambda_k: est.map(|e| e.lambda_k),
            alpha: est.map(|e| e.alpha),
            fit_error: self.fit.failure().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CircuitFamily;
    use crate::fit::DEFAULT_T_EFF;

    #[test]
    fn otoc_reads_the_all_zero_bitstring() {
        let mut counts = Counts::new();
        counts.insert("0000".to_string(), 30);
        counts.insert("0001".to_string(), 70);
        assert!((otoc_from_counts(&counts, 4) - 0.3).abs() < 1e-12);
        assert_eq!(otoc_from_counts(&Counts::new(), 4), 0.0);
    }

    #[test]
    fn family_fit_keeps_failures_instead_of_erroring() {
        let series = OtocSeries::new(CircuitFamily::Chaotic, &[1], vec![0.5]);
        let ff = FamilyFit::new(series, &FitOptions::hardware_decay(), DEFAULT_T_EFF);
        assert!(ff.estimate().is_none());
        let rec = ff.record("chaotic");
        assert!(rec.fit_error.is_some());
        assert_eq!(rec.x, vec![1.0]);
    }
}
