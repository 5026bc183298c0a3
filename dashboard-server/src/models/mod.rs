//! Data models

pub mod dataset;
pub mod prediction;

pub use dataset::*;
pub use prediction::*;
