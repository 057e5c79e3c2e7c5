//! Data models for DocuFlow.

mod document;
mod record;

pub use document::{
    DocumentMetadata, FileInfo, OcrPage, OcrResponse, PageDimensions, ProcessingStatus,
};
pub use record::{BatchRow, ExtractedFields, ProcessedDocument, TaxId};
