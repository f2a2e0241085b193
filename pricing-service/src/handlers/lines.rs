use axum::{extract::State, Json};
use serde::Serialize;

use crate::models::{InvoiceLine, StoreRow};
use crate::startup::AppState;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct LoadLinesResponse {
    pub line_count: usize,
}

/// Replace the base lines with rows fetched from the invoice store.
#[tracing::instrument(skip_all, fields(row_count = rows.len()))]
pub async fn load_lines(
    State(state): State<AppState>,
    Json(rows): Json<Vec<StoreRow>>,
) -> Result<Json<LoadLinesResponse>, AppError> {
    let lines = InvoiceLine::from_store_rows(rows);
    let line_count = lines.len();

    state.controller.lock().await.load_base_lines(lines);

    Ok(Json(LoadLinesResponse { line_count }))
}

/// Lines the dashboard table should show.
pub async fn get_active_lines(State(state): State<AppState>) -> Json<Vec<InvoiceLine>> {
    Json(state.controller.lock().await.active_lines().to_vec())
}
