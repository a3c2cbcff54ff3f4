//! Axum route handlers for stored candidate records.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::CandidateRecord;
use crate::state::AppState;

/// GET /api/v1/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
) -> Result<Json<Vec<CandidateRecord>>, AppError> {
    let store = state.store.clone();
    let records = tokio::task::spawn_blocking(move || store.list())
        .await
        .map_err(|e| AppError::Internal(e.into()))??;
    Ok(Json(records))
}

/// GET /api/v1/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
) -> Result<Json<CandidateRecord>, AppError> {
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || store.load(record_id))
        .await
        .map_err(|e| AppError::Internal(e.into()))??
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Candidate record {record_id} not found")))
}
