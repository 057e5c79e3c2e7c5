//! Batch upload and lookup endpoints.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};

use super::super::{AppState, StoredBatch};
use super::helpers::{read_uploads, ApiError};

/// Process every uploaded `files` part and store the result table.
pub async fn api_batch(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StoredBatch>, ApiError> {
    let inputs = read_uploads(&mut multipart, "files").await?;
    tracing::info!("Batch request with {} file(s)", inputs.len());

    let outcome = state.processor.process_batch(inputs).await;
    let stored = state.batches.insert(outcome.summary, outcome.rows).await;

    Ok(Json(stored))
}

/// Fetch a stored batch.
pub async fn api_batch_get(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
) -> Result<Json<StoredBatch>, ApiError> {
    state
        .batches
        .get(&batch_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Batch not found: {}", batch_id)))
}
