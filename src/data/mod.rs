//! Measurement data that does not come from a live sampler.
//!
//! - `sample`: seeded synthetic curves for the protocol analyses
//! - `hardware`: values recorded on ibm_torino, used for figures and comparisons

pub mod hardware;
pub mod sample;

pub use hardware::*;
pub use sample::*;
