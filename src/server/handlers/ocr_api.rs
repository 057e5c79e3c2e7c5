//! Single-image OCR endpoint.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use super::super::AppState;
use super::helpers::{read_uploads, ApiError};
use crate::models::{ExtractedFields, OcrResponse, ProcessedDocument};
use crate::services::display_fields;

/// One labelled field for display.
#[derive(Debug, Serialize)]
pub struct LabelledField {
    pub label: &'static str,
    pub value: String,
}

/// Processing details shown in the UI's details tab.
#[derive(Debug, Serialize)]
pub struct ProcessingDetails {
    pub model: String,
    pub pages: usize,
    pub processing_time_secs: f64,
    pub file_size: u64,
    pub file_type: String,
    pub content_hash: Option<String>,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct OcrApiResponse {
    pub filename: String,
    pub raw_text: String,
    pub processed_text: String,
    /// Fields in display order with Thai labels.
    pub structured: Vec<LabelledField>,
    pub fields: ExtractedFields,
    pub details: ProcessingDetails,
    pub response: Option<OcrResponse>,
}

impl From<ProcessedDocument> for OcrApiResponse {
    fn from(doc: ProcessedDocument) -> Self {
        let structured = display_fields(&doc.fields)
            .into_iter()
            .map(|(label, value)| LabelledField { label, value })
            .collect();
        let details = ProcessingDetails {
            model: doc
                .metadata
                .ocr_results
                .as_ref()
                .map(|r| r.model_used.clone())
                .unwrap_or_default(),
            pages: doc.page_count(),
            processing_time_secs: doc.processing_secs(),
            file_size: doc.metadata.file_size,
            file_type: doc.metadata.file_type.clone(),
            content_hash: doc
                .metadata
                .ocr_results
                .as_ref()
                .and_then(|r| r.file_info.as_ref())
                .map(|i| i.content_hash.clone()),
            status: doc.status().as_str().to_string(),
        };

        Self {
            filename: doc.metadata.filename,
            raw_text: doc.raw_text,
            processed_text: doc.processed_text,
            structured,
            fields: doc.fields,
            details,
            response: doc.metadata.ocr_results,
        }
    }
}

/// Run OCR on the uploaded `file` field.
pub async fn api_ocr(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OcrApiResponse>, ApiError> {
    let input = read_uploads(&mut multipart, "file")
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::bad_request("กรุณาอัปโหลดรูปภาพ (missing 'file' upload)"))?;

    tracing::info!("OCR request for {}", input.filename);
    let doc = state.processor.process_document(&input, true).await?;

    Ok(Json(OcrApiResponse::from(doc)))
}
