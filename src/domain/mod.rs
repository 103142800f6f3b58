//! Domain types shared by the analyses.
//!
//! This module defines:
//!
//! - CLI-facing enums (`CircuitFamily`, `CountsMode`)
//! - in-memory measurement series (`OtocSeries`, `Counts`)
//! - the serializable run summary written by `--export` (`RunRecord`)

pub mod types;

pub use types::*;
