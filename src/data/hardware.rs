//! Recorded results of the ibm_torino campaign (run 3, calibrated seeds).

use crate::domain::{CircuitFamily, DEFAULT_DEPTHS, OtocSeries};

pub const RECORDED_BACKEND: &str = "ibm_torino";

/// One family's recorded OTOC curve with the λ/α extracted at the time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedFamily {
    pub family: CircuitFamily,
    pub otoc: [f64; 7],
    pub lambda_k: f64,
    pub alpha: f64,
    /// Gate count after transpilation to the backend, per depth.
    pub transpiled_gates: [u32; 7],
}

impl RecordedFamily {
    pub fn series(&self) -> OtocSeries {
        OtocSeries::new(self.family, &DEFAULT_DEPTHS, self.otoc.to_vec())
    }
}

pub const RECORDED_RUN: [RecordedFamily; 3] = [
    RecordedFamily {
        family: CircuitFamily::Chaotic,
        otoc: [0.0049, 0.0205, 0.0261, 0.0518, 0.0381, 0.0476, 0.0532],
        lambda_k: 0.9549,
        alpha: -1.4549,
        transpiled_gates: [57, 119, 264, 401, 523, 634, 924],
    },
    RecordedFamily {
        family: CircuitFamily::Integrable,
        otoc: [0.0034, 0.4143, 0.4258, 0.4045, 0.4194, 0.3850, 0.3684],
        lambda_k: 0.0,
        alpha: -0.5,
        transpiled_gates: [37, 55, 93, 131, 169, 207, 283],
    },
    RecordedFamily {
        family: CircuitFamily::Intermediate,
        otoc: [0.0015, 0.4104, 0.0615, 0.0564, 0.0669, 0.1155, 0.2034],
        lambda_k: 0.0928,
        alpha: -0.5928,
        transpiled_gates: [33, 53, 91, 129, 167, 205, 281],
    },
];

/// λ per family from one hardware run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReproducibilityRun {
    pub label: &'static str,
    /// Runs before the seed fix reused one seed for every depth.
    pub legacy_seed: bool,
    pub chaotic: f64,
    pub integrable: f64,
    pub intermediate: f64,
}

impl ReproducibilityRun {
    pub fn lambda_for(&self, family: CircuitFamily) -> Option<f64> {
        match family {
            CircuitFamily::Chaotic => Some(self.chaotic),
            CircuitFamily::Integrable => Some(self.integrable),
            CircuitFamily::Intermediate => Some(self.intermediate),
            _ => None,
        }
    }
}

pub const REPRODUCIBILITY_RUNS: [ReproducibilityRun; 3] = [
    ReproducibilityRun {
        label: "Run 1 (v1)",
        legacy_seed: true,
        chaotic: 0.003,
        integrable: 0.461,
        intermediate: 0.266,
    },
    ReproducibilityRun {
        label: "Run 2 (v1)",
        legacy_seed: true,
        chaotic: 0.003,
        integrable: 0.469,
        intermediate: 0.265,
    },
    ReproducibilityRun {
        label: "Run 3 (v2.1)",
        legacy_seed: false,
        chaotic: 0.955,
        integrable: 0.0,
        intermediate: 0.093,
    },
];

pub fn recorded(family: CircuitFamily) -> Option<&'static RecordedFamily> {
    RECORDED_RUN.iter().find(|r| r.family == family)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::alpha_from_lambda;

    #[test]
    fn recorded_alpha_follows_lambda() {
        for r in &RECORDED_RUN {
            assert!((r.alpha - alpha_from_lambda(r.lambda_k)).abs() < 1e-9);
        }
    }

    #[test]
    fn lookup_by_family() {
        assert!(recorded(CircuitFamily::Integrable).is_some());
        assert!(recorded(CircuitFamily::Syk).is_none());
        assert_eq!(recorded(CircuitFamily::Chaotic).unwrap().series().len(), 7);
    }
}
