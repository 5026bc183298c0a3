//! Dataset model

use serde::Serialize;

use hero_price_core::logic::dataset::DatasetSummary;

#[derive(Debug, Serialize)]
pub struct DatasetResponse {
    /// Markdown, absent when no tavern data was shipped
    pub description: Option<String>,
    pub summary: Option<DatasetSummary>,
    pub heroes: usize,
    pub cross_validation_rows: usize,
    pub average_price: f64,
}
