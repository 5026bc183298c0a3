//! Tavern sales - training data of the price model

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{decimal_comma, read_csv, DatasetError};
use crate::logic::features::{FeatureError, FeatureFrame, FeatureValue, RAW_COLUMNS};
use crate::logic::pipeline::date::parse_timestamp;

/// One tavern auction sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TavernSale {
    pub id: u64,
    pub rarity: u8,
    pub generation: u32,
    pub main_class: String,
    pub sub_class: String,
    pub stat_boost1: String,
    pub stat_boost2: String,
    pub profession: String,
    /// Remaining summons at sale time
    pub summons: u32,
    pub max_summons: u32,
    /// JEWEL
    #[serde(deserialize_with = "decimal_comma")]
    pub sold_price: f64,
    pub time_stamp: String,
}

/// Load the tavern export (decimal comma prices)
pub fn load(path: &Path) -> Result<Vec<TavernSale>, DatasetError> {
    let sales: Vec<TavernSale> = read_csv(path)?;
    log::info!("Loaded {} tavern sales from {}", sales.len(), path.display());
    Ok(sales)
}

/// Keep sales whose price z-score is below 1 in absolute value
///
/// Uses the population standard deviation. A constant price column has no
/// outliers and is returned unchanged.
pub fn remove_outlier(sales: Vec<TavernSale>) -> Vec<TavernSale> {
    if sales.is_empty() {
        return sales;
    }
    let n = sales.len() as f64;
    let mean = sales.iter().map(|s| s.sold_price).sum::<f64>() / n;
    let std = (sales.iter().map(|s| (s.sold_price - mean).powi(2)).sum::<f64>() / n).sqrt();
    if std == 0.0 {
        return sales;
    }

    let before = sales.len();
    let kept: Vec<TavernSale> = sales
        .into_iter()
        .filter(|s| ((s.sold_price - mean) / std).abs() < 1.0)
        .collect();
    log::debug!("Outlier filter kept {} of {} sales", kept.len(), before);
    kept
}

/// Split into the raw feature frame (no `id`, no `soldPrice`) and the target
pub fn to_x_y(sales: &[TavernSale]) -> Result<(FeatureFrame, Vec<f64>), FeatureError> {
    let mut frame = FeatureFrame::new(RAW_COLUMNS.iter().copied());
    for sale in sales {
        frame.push_row(vec![
            FeatureValue::Number(sale.rarity as f64),
            FeatureValue::Number(sale.generation as f64),
            FeatureValue::Text(sale.main_class.clone()),
            FeatureValue::Text(sale.sub_class.clone()),
            FeatureValue::Text(sale.stat_boost1.clone()),
            FeatureValue::Text(sale.stat_boost2.clone()),
            FeatureValue::Text(sale.profession.clone()),
            FeatureValue::Number(sale.summons as f64),
            FeatureValue::Number(sale.max_summons as f64),
            FeatureValue::Text(sale.time_stamp.clone()),
        ])?;
    }
    Ok((frame, sales.iter().map(|s| s.sold_price).collect()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub instances: usize,
    /// Every column but the `soldPrice` target
    pub attributes: usize,
    pub first_sale: Option<DateTime<Utc>>,
    pub last_sale: Option<DateTime<Utc>>,
    pub mean_price: f64,
}

impl DatasetSummary {
    pub fn of(sales: &[TavernSale]) -> Result<Self, DatasetError> {
        if sales.is_empty() {
            return Err(DatasetError::Empty("tavern sales".to_string()));
        }

        let stamps: Vec<DateTime<Utc>> = sales
            .iter()
            .filter_map(|s| parse_timestamp(&s.time_stamp).ok())
            .collect();
        if stamps.len() < sales.len() {
            log::warn!(
                "{} tavern sales have an unreadable timestamp",
                sales.len() - stamps.len()
            );
        }

        Ok(Self {
            instances: sales.len(),
            attributes: RAW_COLUMNS.len() + 1,
            first_sale: stamps.iter().min().copied(),
            last_sale: stamps.iter().max().copied(),
            mean_price: sales.iter().map(|s| s.sold_price).sum::<f64>() / sales.len() as f64,
        })
    }

    /// Markdown description of the tavern dataset
    pub fn describe(&self) -> String {
        let fmt = |ts: Option<DateTime<Utc>>| {
            ts.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "unknown".to_string())
        };

        format!(
            "Tavern Data dataset\n\
             ---------------------------\n\
             \n\
             **Dataset Characteristics:**\n\
             \n\
             :Number of Instances: {instances}\n\
             \n\
             :Number of Attributes: {attributes} numeric/categorical predictive. soldPrice is usually the target.\n\
             \n\
             :Attribute Information (in order):\n\
             - id            Hero id\n\
             - rarity        Rarity of the hero\n\
             - generation    Generation of Hero\n\
             - mainClass     MainClass of the Hero\n\
             - subClass      SubClass of the Hero\n\
             - statBoost1    First StatBoost\n\
             - statBoost2    Second StatBoost\n\
             - profession    Profession of the Hero\n\
             - summons       Remaining Summons\n\
             - maxSummons    Total Summons\n\
             - soldPrice     Price sold in JEWEL\n\
             - timeStamp     timestamp of the sale\n\
             \n\
             :Missing Attribute Values: None\n\
             \n\
             :Mean Sold Price: {mean:.2} JEWEL\n\
             \n\
             :Description: This dataset contains all heroes transaction from {first} to {last}.\n",
            instances = self.instances,
            attributes = self.attributes,
            mean = self.mean_price,
            first = fmt(self.first_sale),
            last = fmt(self.last_sale),
        )
    }
}
