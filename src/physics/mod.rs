//! Closed-form physics used by the analyses.
//!
//! - the λ ↔ α relation and the log-corrected entropy (`entropy`)
//! - Schwarzschild black-hole observables and detectability (`blackhole`)
//! - the BEC acoustic-horizon toy model (`bec`)

pub mod bec;
pub mod blackhole;
pub mod entropy;

pub use bec::*;
pub use blackhole::*;
pub use entropy::*;
