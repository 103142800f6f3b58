//! Thin client for the IBM Quantum cloud and the `Sampler` built on it.

pub mod client;
pub mod types;

pub use client::*;
pub use types::*;
