//! Structured records extracted from OCR text.

use serde::{Deserialize, Serialize};

use super::document::{DocumentMetadata, ProcessingStatus};

/// A Thai taxpayer identification number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxId {
    /// Thirteen ASCII digits, separators removed.
    pub number: String,
    /// Whether the mod-11 check digit matches.
    pub checksum_valid: bool,
}

/// Fields pulled out of a document's text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub company_name: Option<String>,
    pub tax_ids: Vec<TaxId>,
    pub phone_numbers: Vec<String>,
    pub amounts: Vec<String>,
    pub dates: Vec<String>,
    pub addresses: Vec<String>,
}

impl ExtractedFields {
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.tax_ids.is_empty()
            && self.phone_numbers.is_empty()
            && self.amounts.is_empty()
            && self.dates.is_empty()
            && self.addresses.is_empty()
    }

    /// First tax ID, if any.
    pub fn primary_tax_id(&self) -> Option<&str> {
        self.tax_ids.first().map(|t| t.number.as_str())
    }
}

/// A fully processed document: OCR output, cleaned text and extracted fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub metadata: DocumentMetadata,
    /// First-page text exactly as returned by the OCR API.
    pub raw_text: String,
    /// First-page text after post-processing.
    pub processed_text: String,
    pub fields: ExtractedFields,
}

impl ProcessedDocument {
    pub fn status(&self) -> ProcessingStatus {
        self.metadata.processing_status
    }

    pub fn page_count(&self) -> usize {
        self.metadata
            .ocr_results
            .as_ref()
            .map(|r| r.total_pages)
            .unwrap_or(0)
    }

    pub fn processing_secs(&self) -> f64 {
        self.metadata
            .ocr_results
            .as_ref()
            .map(|r| r.total_processing_secs())
            .unwrap_or(0.0)
    }
}

/// One row of a batch result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRow {
    pub filename: String,
    pub status: ProcessingStatus,
    /// Truncated text preview.
    pub preview: String,
    pub processing_time_secs: f64,
    pub page_count: usize,
    pub company_name: Option<String>,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub error: Option<String>,
}

impl BatchRow {
    /// Row for a document that went through OCR.
    pub fn from_document(doc: &ProcessedDocument, preview_chars: usize) -> Self {
        Self {
            filename: doc.metadata.filename.clone(),
            status: doc.status(),
            preview: preview(&doc.processed_text, preview_chars),
            processing_time_secs: doc.processing_secs(),
            page_count: doc.page_count(),
            company_name: doc.fields.company_name.clone(),
            tax_id: doc.fields.primary_tax_id().map(str::to_string),
            phone: doc.fields.phone_numbers.first().cloned(),
            address: doc.fields.addresses.first().cloned(),
            error: None,
        }
    }

    /// Row for a file that could not be processed.
    pub fn failed(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: ProcessingStatus::Failed,
            preview: String::new(),
            processing_time_secs: 0.0,
            page_count: 0,
            company_name: None,
            tax_id: None,
            phone: None,
            address: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ProcessingStatus::Completed
    }

    /// Status label for display, including the error message for failures.
    pub fn status_label(&self) -> String {
        match (&self.status, &self.error) {
            (ProcessingStatus::Failed, Some(err)) => {
                format!("{}: {}", self.status.thai_label(), err)
            }
            (status, _) => status.thai_label().to_string(),
        }
    }
}

/// Truncate to `max_chars` characters, appending "..." when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
