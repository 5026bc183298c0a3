//! Chart handlers
//!
//! Each route answers with a Vega-Lite specification.

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value;
use validator::Validate;

use hero_price_core::constants::DEFAULT_CHART_HEIGHT;
use hero_price_core::logic::charts;

use crate::models::ChartQuery;
use crate::{AppResult, AppState};

/// Histogram of sale prices with the average price marked
pub async fn price_distribution(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> AppResult<Json<Value>> {
    query.validate()?;
    let width = query.width.unwrap_or(state.config.chart_width);
    let context = &state.context;
    Ok(Json(charts::price_distribution(
        context.cross_validation(),
        context.average_price(),
        width,
    )))
}

/// Mean absolute JEWEL impact per feature
pub async fn price_explanation(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> AppResult<Json<Value>> {
    query.validate()?;
    let width = query.width.unwrap_or(state.config.chart_width);
    Ok(Json(charts::price_explanation(state.context.price_impact(), width)))
}

pub async fn advanced_analytics(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> AppResult<Json<Value>> {
    query.validate()?;
    let width = query.width.unwrap_or(state.config.chart_width);
    Ok(Json(charts::advanced_analytics(
        state.context.cross_validation(),
        width,
        DEFAULT_CHART_HEIGHT,
    )))
}
