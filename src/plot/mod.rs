//! Terminal and SVG plotting.

pub mod ascii;
pub mod chart;

pub use ascii::*;
pub use chart::*;
