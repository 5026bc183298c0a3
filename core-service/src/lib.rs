//! DFK Heroes Price Prediction - Core Library
//!
//! Predicts the tavern price of a DeFi Kingdoms hero with a gradient-boosted
//! tree ensemble and explains it with SHAP values.

pub mod constants;
pub mod error;
pub mod logic;

pub use error::{CoreError, CoreResult};
pub use logic::context::{Prediction, PredictionContext};
