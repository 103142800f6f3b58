//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - validate observations and run Levenberg–Marquardt for a `CurveModel`
//! - package OTOC decay and entropy fits with standard errors
//! - convert a fitted decay rate into λ and α

pub mod fitter;
pub mod lambda;

pub use fitter::*;
pub use lambda::*;
