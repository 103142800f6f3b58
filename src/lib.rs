//! `kaelion-lab` library crate.
//!
//! The binary (`kaelion`) is a thin wrapper around this library so that:
//!
//! - the analyses are testable without spawning processes
//! - the circuit simulator, fitters and physics formulas are reusable on their own
//! - each concern (circuits, fitting, reporting, plotting) lives in one module

pub mod app;
pub mod circuit;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod experiment;
pub mod fit;
pub mod ibm;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod physics;
pub mod plot;
pub mod report;
