//! Logic Module - Prediction & Explanation Engines
//!
//! ## Architecture
//! - `features/` - Hero record → feature frame, versioned feature layout
//! - `pipeline/` - Date, class rank and categorical transforms
//! - `model/` - LightGBM tree ensemble inference
//! - `explain/` - TreeSHAP, waterfall layout, SVG and text renderings
//! - `dataset/` - Tavern, analytics and hero snapshot loaders
//! - `charts` - Vega-Lite specs for the analytics views
//! - `context` - Immutable per-process prediction context

pub mod artifacts;
pub mod charts;
pub mod context;
pub mod dataset;
pub mod explain;
pub mod features;
pub mod model;
pub mod pipeline;
