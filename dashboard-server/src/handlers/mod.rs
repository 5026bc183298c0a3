//! HTTP handlers

pub mod health;
pub mod predict;
pub mod charts;
pub mod dataset;
