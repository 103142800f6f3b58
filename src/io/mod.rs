//! Run exports (`--export`).

pub mod export;

pub use export::*;
