//! Prediction models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use hero_price_core::logic::explain::FeatureContribution;
use hero_price_core::Prediction;

/// Query of the prediction routes
#[derive(Debug, Deserialize, Default, Validate)]
pub struct PredictQuery {
    /// Waterfall rows, the last one aggregating the rest
    #[validate(range(min = 1, max = 50))]
    pub max_display: Option<usize>,

    /// SVG width in pixels
    #[validate(range(min = 100, max = 2000))]
    pub width: Option<u32>,
}

/// Query of the chart routes
#[derive(Debug, Deserialize, Default, Validate)]
pub struct ChartQuery {
    #[validate(range(min = 100, max = 2000))]
    pub width: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub hero_id: u64,
    /// JEWEL
    pub price: f64,
    pub average_price: f64,
    pub features: Value,
    pub contributions: Vec<FeatureContribution>,
    /// HTML list of the strongest contributions
    pub explanation: String,
    pub waterfall_svg: String,
    pub predicted_at: i64,
}

impl PredictionResponse {
    pub fn new(prediction: Prediction, explanation: String, waterfall_svg: String) -> Self {
        Self {
            hero_id: prediction.hero_id,
            price: prediction.price,
            average_price: prediction.base_value,
            features: prediction.features,
            contributions: prediction.contributions,
            explanation,
            waterfall_svg,
            predicted_at: chrono::Utc::now().timestamp(),
        }
    }
}
