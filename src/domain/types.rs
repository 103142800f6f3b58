//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - used in-memory during simulation and fitting
//! - exported to JSON
//! - passed between the experiment, report and plot layers

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Depths at which every OTOC experiment is evaluated by default.
pub const DEFAULT_DEPTHS: [usize; 7] = [1, 2, 4, 6, 8, 10, 14];

/// Which OTOC circuit family to build.
///
/// Families differ in how the forward evolution `U` mixes the register:
/// random single-qubit rotations scramble, Clifford-only layers do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitFamily {
    /// Random U(θ, φ, 0) layers with a closed CX chain.
    Chaotic,
    /// Hadamards and a CX chain (Clifford, no scrambling).
    Integrable,
    /// Hadamard then T on every qubit, CX chain.
    Intermediate,
    /// Transverse-field kicks and an RZZ ring.
    KickedIsing,
    /// Random rotations with all-to-all RZZ couplings.
    Syk,
    /// Fixed RX/RY drive, RZZ ring and CZ on even pairs.
    Floquet,
}

impl CircuitFamily {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            CircuitFamily::Chaotic => "Chaotic",
            CircuitFamily::Integrable => "Integrable",
            CircuitFamily::Intermediate => "Intermediate",
            CircuitFamily::KickedIsing => "Kicked Ising",
            CircuitFamily::Syk => "SYK-like",
            CircuitFamily::Floquet => "Floquet",
        }
    }

    /// The three families run on hardware in the reference campaign.
    pub fn baseline() -> [CircuitFamily; 3] {
        [
            CircuitFamily::Chaotic,
            CircuitFamily::Integrable,
            CircuitFamily::Intermediate,
        ]
    }

    /// Families expected to scramble (used by the universality check).
    pub fn is_chaotic(self) -> bool {
        matches!(
            self,
            CircuitFamily::Chaotic | CircuitFamily::KickedIsing | CircuitFamily::Syk | CircuitFamily::Floquet
        )
    }
}

/// How the ideal simulator turns amplitudes into an OTOC value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CountsMode {
    /// Exact probability of the all-zero outcome.
    Exact,
    /// Finite-shot estimate with a seeded RNG.
    Sampled,
}

/// Measurement histogram keyed by bitstring (qubit `n-1` leftmost).
pub type Counts = BTreeMap<String, u64>;

/// Total number of shots in a histogram.
pub fn total_shots(counts: &Counts) -> u64 {
    counts.values().sum()
}

/// Fraction of shots landing on `bitstring` (0 when the histogram is empty).
pub fn probability_of(counts: &Counts, bitstring: &str) -> f64 {
    let total = total_shots(counts);
    if total == 0 {
        return 0.0;
    }
    counts.get(bitstring).copied().unwrap_or(0) as f64 / total as f64
}

/// OTOC values for one circuit family, one entry per depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtocSeries {
    pub family: CircuitFamily,
    pub depths: Vec<f64>,
    pub values: Vec<f64>,
}

impl OtocSeries {
    pub fn new(family: CircuitFamily, depths: &[usize], values: Vec<f64>) -> Self {
        Self {
            family,
            depths: depths.iter().map(|&d| d as f64).collect(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drop the first `n` points (the depth-1 value is often a preparation artefact).
    pub fn skip_first(&self, n: usize) -> Self {
        Self {
            family: self.family,
            depths: self.depths.iter().skip(n).copied().collect(),
            values: self.values.iter().skip(n).copied().collect(),
        }
    }
}

/// One fitted series in an export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lambda_l: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lambda_k: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit_error: Option<String>,
}

/// A run summary written by `--export`.
///
/// Scalars are keyed by name so every analysis can share the format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub analysis: String,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    pub scalars: BTreeMap<String, f64>,
    pub series: Vec<SeriesRecord>,
}

impl RunRecord {
    pub fn new(analysis: impl Into<String>) -> Self {
        Self {
            analysis: analysis.into(),
            generated_at: Utc::now(),
            backend: None,
            scalars: BTreeMap::new(),
            series: Vec::new(),
        }
    }

    pub fn scalar(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.scalars.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probability_of_handles_empty_histogram() {
        let counts = Counts::new();
        assert_eq!(probability_of(&counts, "0000"), 0.0);
    }

    #[test]
    fn probability_of_counts_fraction() {
        let mut counts = Counts::new();
        counts.insert("0000".into(), 30);
        counts.insert("0101".into(), 70);
        assert!((probability_of(&counts, "0000") - 0.3).abs() < 1e-12);
    }

    #[test]
    fn family_names_round_trip_through_clap() {
        let parsed = CircuitFamily::from_str("kicked-ising", true).unwrap();
        assert_eq!(parsed, CircuitFamily::KickedIsing);
    }

    #[test]
    fn skip_first_drops_leading_point() {
        let s = OtocSeries::new(CircuitFamily::Chaotic, &[1, 2, 4], vec![0.9, 0.5, 0.2]);
        let t = s.skip_first(1);
        assert_eq!(t.depths, vec![2.0, 4.0]);
        assert_eq!(t.values, vec![0.5, 0.2]);
    }
}
