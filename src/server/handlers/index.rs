//! Upload page handler.

use askama::Template;
use axum::{extract::State, response::Html};

use super::super::template_structs::IndexTemplate;
use super::super::AppState;
use crate::utils::SUPPORTED_EXTENSIONS;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let backend = state.processor.backend();
    let accept = SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",");

    let template = IndexTemplate {
        title: "DocuFlow - Thai OCR",
        model: backend.model(),
        max_upload_mb: state.settings.server.max_upload_mb,
        accept,
        backend_available: backend.is_available(),
        availability_hint: backend.availability_hint(),
    };

    Html(
        template
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
}
