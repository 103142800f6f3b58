//! Parametric curve models fitted by the analyses.
//!
//! Models are small stateless types behind one trait so the Levenberg–Marquardt
//! driver in `fit` can stay generic.

pub mod model;

pub use model::*;
