//! Export API endpoint for batch results.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::super::AppState;
use super::helpers::ApiError;
use crate::services::ExportFormat;

/// Query params for export.
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// Export format (csv, json, jsonl)
    #[serde(default)]
    pub format: ExportFormat,
}

/// Download a stored batch as an attachment.
pub async fn export_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
    Query(params): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let batch = state
        .batches
        .get(&batch_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Batch not found: {}", batch_id)))?;

    let format = params.format;
    let body = format
        .render(&batch.rows)
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let filename = format!("docuflow-{}.{}", batch.batch_id, format.file_extension());
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(body),
    )
        .into_response())
}
