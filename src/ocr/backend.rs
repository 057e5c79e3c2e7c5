//! OCR backend abstraction.

use std::path::Path;

use async_trait::async_trait;
use base64::Engine;
use thiserror::Error;

use crate::models::{FileInfo, OcrResponse};
use crate::utils::ImageFormat;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("File is empty: {0}")]
    EmptyInput(String),

    #[error("Unsupported image format for {0} (supported: JPG, PNG, WebP, TIFF)")]
    UnsupportedFormat(String),

    #[error("OCR API rejected the API key: {0}")]
    Unauthorized(String),

    #[error("Rate limited by OCR API, retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("OCR API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid OCR API response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An image to run OCR on.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Original filename, used for format fallback and reporting.
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ImageInput {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Read an image from disk.
    pub async fn from_path(path: &Path) -> Result<Self, OcrError> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { filename, bytes })
    }

    /// Validate the input and detect its image format.
    pub fn format(&self) -> Result<ImageFormat, OcrError> {
        if self.bytes.is_empty() {
            return Err(OcrError::EmptyInput(self.filename.clone()));
        }
        ImageFormat::detect(&self.filename, &self.bytes)
            .ok_or_else(|| OcrError::UnsupportedFormat(self.filename.clone()))
    }

    /// Encode as a `data:` URI with the detected MIME type.
    pub fn data_uri(&self) -> Result<String, OcrError> {
        let format = self.format()?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        Ok(format!("data:{};base64,{}", format.mime_type(), encoded))
    }

    pub fn file_info(&self) -> FileInfo {
        FileInfo::new(&self.filename, &self.bytes)
    }
}

/// Trait for OCR backends.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Short backend name for logs and the health endpoint.
    fn name(&self) -> &str;

    /// Model used for OCR.
    fn model(&self) -> &str;

    /// Check if this backend can run (credentials present).
    fn is_available(&self) -> bool;

    /// Describe what is needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Run OCR on an image.
    async fn process_image(&self, input: &ImageInput) -> Result<OcrResponse, OcrError>;
}
