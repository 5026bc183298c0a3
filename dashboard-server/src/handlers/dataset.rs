//! Dataset handler

use axum::{extract::State, Json};

use crate::models::DatasetResponse;
use crate::AppState;

pub async fn describe(State(state): State<AppState>) -> Json<DatasetResponse> {
    let context = &state.context;
    let summary = context.tavern_summary().cloned();

    Json(DatasetResponse {
        description: summary.as_ref().map(|s| s.describe()),
        summary,
        heroes: context.heroes().len(),
        cross_validation_rows: context.cross_validation().len(),
        average_price: context.average_price(),
    })
}
