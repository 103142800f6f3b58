//! Terminal reports: banners, boxed overviews and fixed-width tables.

pub mod format;

pub use format::*;
