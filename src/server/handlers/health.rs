//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use super::super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: String,
    pub model: String,
    pub available: bool,
    /// Batches currently held for export.
    pub stored_batches: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

pub async fn api_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend = state.processor.backend();
    let available = backend.is_available();
    Json(HealthResponse {
        status: "ok",
        backend: backend.name().to_string(),
        model: backend.model().to_string(),
        available,
        stored_batches: state.batches.len().await,
        hint: (!available).then(|| backend.availability_hint()),
    })
}
