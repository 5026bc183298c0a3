//! Analytics datasets - cross-validation export and global price impact

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{read_csv, DatasetError};

pub const QUINTILE_COLUMN: &str = "Predicted soldPrice (Quintile)";

/// Out-of-fold prediction of one sale with its t-SNE embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationRow {
    #[serde(rename = "TSNE-1")]
    pub tsne_1: f64,
    #[serde(rename = "TSNE-2")]
    pub tsne_2: f64,
    #[serde(rename = "soldPrice")]
    pub sold_price: f64,
    #[serde(rename = "predictedPrice", alias = "Predicted soldPrice")]
    pub predicted_price: f64,
    pub profession: String,
    pub rarity: u8,
    #[serde(rename = "mainClass")]
    pub main_class: String,
    pub generation: u32,
    pub summons: u32,
    #[serde(rename = "buyHour")]
    pub buy_hour: u32,
    /// 1 (cheapest 20%) ..= 5, derived from `predicted_price` on load
    #[serde(rename = "Predicted soldPrice (Quintile)", skip_deserializing, default)]
    pub quintile: u8,
}

/// Mean absolute price impact of one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceImpact {
    #[serde(alias = "Feature")]
    pub feature: String,
    /// JEWEL
    #[serde(alias = "JEWEL", alias = "jewel")]
    pub impact: f64,
}

/// Linear-interpolated quantile of sorted data
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Equal-frequency bin (1..=5) of every value
///
/// Bins are right-closed on the 20/40/60/80% quantiles; the minimum lands
/// in bin 1.
pub fn quintiles(values: &[f64]) -> Vec<u8> {
    if values.is_empty() {
        return Vec::new();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let edges: Vec<f64> = (1..5).map(|k| quantile(&sorted, k as f64 / 5.0)).collect();

    values
        .iter()
        .map(|v| 1 + edges.iter().take_while(|edge| v > *edge).count() as u8)
        .collect()
}

pub fn load_cross_validation(path: &Path) -> Result<Vec<CrossValidationRow>, DatasetError> {
    let mut rows: Vec<CrossValidationRow> = read_csv(path)?;
    let prices: Vec<f64> = rows.iter().map(|r| r.predicted_price).collect();
    for (row, q) in rows.iter_mut().zip(quintiles(&prices)) {
        row.quintile = q;
    }
    log::info!("Loaded {} cross-validation rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Price impact rows, strongest first
pub fn load_price_impact(path: &Path) -> Result<Vec<PriceImpact>, DatasetError> {
    let mut rows: Vec<PriceImpact> = read_csv(path)?;
    rows.sort_by(|a, b| b.impact.abs().total_cmp(&a.impact.abs()));
    log::info!("Loaded {} price impact rows from {}", rows.len(), path.display());
    Ok(rows)
}
