//! Helper types and utility functions for handlers.

use axum::{
    extract::{multipart::MultipartError, Multipart},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::ocr::{ImageInput, OcrError};

/// JSON error response: `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

impl From<OcrError> for ApiError {
    fn from(err: OcrError) -> Self {
        let status = match &err {
            OcrError::EmptyInput(_) => StatusCode::BAD_REQUEST,
            OcrError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            OcrError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            OcrError::BackendNotAvailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), format!("Invalid upload: {}", err.body_text()))
    }
}

/// Collect uploaded files from multipart fields named `field_name`.
///
/// Parts without a filename (plain form values) are skipped.
pub async fn read_uploads(
    multipart: &mut Multipart,
    field_name: &str,
) -> Result<Vec<ImageInput>, ApiError> {
    let mut inputs = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await?;
        inputs.push(ImageInput::new(filename, bytes.to_vec()));
    }

    Ok(inputs)
}
