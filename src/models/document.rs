//! OCR result models.
//!
//! An uploaded image yields one `OcrResponse` holding a result per page the
//! API reported, plus metadata about the source file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Processing status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Pending,
    Completed,
    NoText,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::NoText => "no_text",
            Self::Failed => "failed",
        }
    }

    /// Label shown in the batch table and CSV export.
    pub fn thai_label(&self) -> &'static str {
        match self {
            Self::Pending => "รอดำเนินการ",
            Self::Completed => "สำเร็จ",
            Self::NoText => "ไม่พบข้อความ",
            Self::Failed => "ข้อผิดพลาด",
        }
    }
}

/// Information about the uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Base filename (no directories).
    pub filename: String,
    /// Size in bytes.
    pub file_size: u64,
    /// Lowercase extension with leading dot, e.g. ".png". Empty if none.
    pub file_type: String,
    /// SHA-256 hash of the content.
    pub content_hash: String,
}

impl FileInfo {
    /// Compute SHA-256 hash of content.
    pub fn compute_hash(content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        hex::encode(hasher.finalize())
    }

    pub fn new(filename: &str, content: &[u8]) -> Self {
        let base = Path::new(filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.to_string());
        let file_type = Path::new(&base)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        Self {
            filename: base,
            file_size: content.len() as u64,
            file_type,
            content_hash: Self::compute_hash(content),
        }
    }
}

/// Page dimensions as reported by the OCR API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDimensions {
    pub dpi: Option<u32>,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

/// OCR result for a single page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrPage {
    /// Zero-based page index.
    pub page_index: u32,
    /// Page text as Markdown.
    pub markdown_content: String,
    /// Confidence score (0.0 - 1.0), if the backend reports one.
    pub confidence: Option<f32>,
    /// Time spent on the request that produced this page.
    pub processing_time_ms: Option<u64>,
    pub dimensions: Option<PageDimensions>,
}

/// Complete OCR response for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResponse {
    pub results: Vec<OcrPage>,
    pub total_pages: usize,
    pub model_used: String,
    pub processing_timestamp: DateTime<Utc>,
    pub total_processing_time_ms: u64,
    pub file_info: Option<FileInfo>,
}

impl OcrResponse {
    /// Build a response; `total_pages` always matches `results.len()`.
    pub fn new(
        results: Vec<OcrPage>,
        model_used: impl Into<String>,
        total_processing_time_ms: u64,
        file_info: Option<FileInfo>,
    ) -> Self {
        Self {
            total_pages: results.len(),
            results,
            model_used: model_used.into(),
            processing_timestamp: Utc::now(),
            total_processing_time_ms,
            file_info,
        }
    }

    /// Text of the first page, or empty if no pages were returned.
    pub fn first_text(&self) -> &str {
        self.results
            .first()
            .map(|p| p.markdown_content.as_str())
            .unwrap_or("")
    }

    /// Processing time in seconds.
    pub fn total_processing_secs(&self) -> f64 {
        self.total_processing_time_ms as f64 / 1000.0
    }
}

/// Metadata for a processed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub filename: String,
    pub file_size: u64,
    pub file_type: String,
    pub upload_timestamp: DateTime<Utc>,
    pub processing_status: ProcessingStatus,
    pub ocr_results: Option<OcrResponse>,
}

impl DocumentMetadata {
    /// Metadata for a freshly uploaded file, not yet processed.
    pub fn pending(info: &FileInfo) -> Self {
        Self {
            filename: info.filename.clone(),
            file_size: info.file_size,
            file_type: info.file_type.clone(),
            upload_timestamp: Utc::now(),
            processing_status: ProcessingStatus::Pending,
            ocr_results: None,
        }
    }
}
