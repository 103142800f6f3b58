//! Quantum circuits for the OTOC experiments.
//!
//! - `gates`, `builder`: gate set, circuit container, OTOC families
//! - `statevector`: exact simulation and shot sampling
//! - `noise`: ZNE folding and the local noise model
//! - `transpile`, `qasm`: lowering to a device and OpenQASM 3 output
//! - `sampler`: the `Sampler` trait and the local implementation

pub mod builder;
pub mod gates;
pub mod noise;
pub mod qasm;
pub mod sampler;
pub mod statevector;
pub mod transpile;

pub use builder::*;
pub use gates::*;
pub use noise::*;
pub use qasm::*;
pub use sampler::*;
pub use statevector::*;
pub use transpile::*;
