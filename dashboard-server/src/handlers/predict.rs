//! Prediction handlers

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::models::{PredictQuery, PredictionResponse};
use crate::{AppResult, AppState};

/// Price, attributions, explanation text and waterfall of one hero
pub async fn predict(
    State(state): State<AppState>,
    Path(hero_id): Path<u64>,
    Query(query): Query<PredictQuery>,
) -> AppResult<Json<PredictionResponse>> {
    query.validate()?;
    let max_display = query.max_display.unwrap_or(state.config.max_display);
    let width = query.width.unwrap_or(state.config.chart_width);

    let prediction = state.context.predict(hero_id)?;
    let svg = state.context.waterfall_svg(&prediction, max_display, width)?;
    let explanation = state.context.explanation_text(&prediction, max_display);

    tracing::info!(hero_id, price = prediction.price, "Hero price predicted");
    Ok(Json(PredictionResponse::new(prediction, explanation, svg)))
}

/// Waterfall chart alone, as `image/svg+xml`
pub async fn waterfall_svg(
    State(state): State<AppState>,
    Path(hero_id): Path<u64>,
    Query(query): Query<PredictQuery>,
) -> AppResult<impl IntoResponse> {
    query.validate()?;
    let max_display = query.max_display.unwrap_or(state.config.max_display);
    let width = query.width.unwrap_or(state.config.chart_width);

    let prediction = state.context.predict(hero_id)?;
    let svg = state.context.waterfall_svg(&prediction, max_display, width)?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}
