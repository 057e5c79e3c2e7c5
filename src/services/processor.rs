//! Document processing: OCR, post-processing and field extraction.
//!
//! One `DocumentProcessor` is shared by every caller (CLI commands and all
//! web requests). Its semaphore caps concurrent OCR API calls globally, so a
//! large batch and a single upload never exceed `processing.concurrency`
//! requests between them.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::extraction::extract_fields;
use super::postprocess::PostProcessorChain;
use crate::config::Settings;
use crate::models::{
    BatchRow, DocumentMetadata, ExtractedFields, ProcessedDocument, ProcessingStatus,
};
use crate::ocr::{ImageInput, MistralBackend, OcrBackend, OcrError};

/// Result of processing a batch of files.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// One row per input file, in input order.
    pub rows: Vec<BatchRow>,
    /// Documents that made it through OCR, in input order.
    pub documents: Vec<ProcessedDocument>,
    pub summary: String,
}

impl BatchOutcome {
    pub fn success_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_success()).count()
    }

    /// Insert rows for files that never reached the processor (e.g. unreadable
    /// files) at their original positions, then recount the summary.
    ///
    /// `failed` must be sorted by index.
    pub fn with_failed_rows(mut self, failed: Vec<(usize, BatchRow)>) -> Self {
        if failed.is_empty() {
            return self;
        }
        for (index, row) in failed {
            let at = index.min(self.rows.len());
            self.rows.insert(at, row);
        }
        self.summary = batch_summary(self.rows.len(), self.success_count());
        self
    }
}

/// Summary line for a batch.
pub fn batch_summary(total: usize, succeeded: usize) -> String {
    if total == 0 {
        return "ไม่มีไฟล์ที่อัปโหลด".to_string();
    }
    format!("ประมวลผลทั้งหมด {} ไฟล์ - สำเร็จ {} ไฟล์", total, succeeded)
}

pub struct DocumentProcessor {
    backend: Arc<dyn OcrBackend>,
    chain: PostProcessorChain,
    concurrency: usize,
    preview_chars: usize,
    limiter: Semaphore,
}

impl DocumentProcessor {
    pub fn new(
        backend: Arc<dyn OcrBackend>,
        chain: PostProcessorChain,
        concurrency: usize,
        preview_chars: usize,
    ) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            backend,
            chain,
            concurrency,
            preview_chars,
            limiter: Semaphore::new(concurrency),
        }
    }

    /// Build a processor backed by the Mistral OCR API.
    pub fn from_settings(settings: &Settings) -> Result<Self, OcrError> {
        let backend = MistralBackend::from_config(&settings.mistral)?;
        Ok(Self::new(
            Arc::new(backend),
            PostProcessorChain::new(settings.post_processors.clone()),
            settings.processing.concurrency,
            settings.processing.preview_chars,
        ))
    }

    pub fn backend(&self) -> &dyn OcrBackend {
        self.backend.as_ref()
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn preview_chars(&self) -> usize {
        self.preview_chars
    }

    /// Run OCR on one image and extract fields from its first page.
    ///
    /// With `apply_post_processing` off, the processed text equals the raw
    /// text and extraction runs on it unchanged.
    pub async fn process_document(
        &self,
        input: &ImageInput,
        apply_post_processing: bool,
    ) -> Result<ProcessedDocument, OcrError> {
        // Reject bad input before waiting for a permit.
        input.format()?;
        let info = input.file_info();

        let mut response = {
            let _permit = self
                .limiter
                .acquire()
                .await
                .map_err(|_| OcrError::BackendNotAvailable("processor shut down".into()))?;
            debug!("OCR {} ({} bytes)", info.filename, info.file_size);
            self.backend.process_image(input).await?
        };

        let raw_text = response.first_text().to_string();
        if apply_post_processing && !self.chain.is_empty() {
            for page in &mut response.results {
                page.markdown_content = self.chain.apply(&page.markdown_content);
            }
        }
        let processed_text = response.first_text().to_string();

        let (status, fields) = if processed_text.trim().is_empty() {
            (ProcessingStatus::NoText, ExtractedFields::default())
        } else {
            (ProcessingStatus::Completed, extract_fields(&processed_text))
        };

        info!(
            "Processed {}: {} page(s) in {:.2}s",
            info.filename,
            response.total_pages,
            response.total_processing_secs()
        );

        let mut metadata = DocumentMetadata::pending(&info);
        metadata.processing_status = status;
        metadata.ocr_results = Some(response);

        Ok(ProcessedDocument {
            metadata,
            raw_text,
            processed_text,
            fields,
        })
    }

    /// Process every input; failures become error rows.
    pub async fn process_batch(&self, inputs: Vec<ImageInput>) -> BatchOutcome {
        self.process_batch_with(inputs, |_| {}).await
    }

    /// Like `process_batch`, calling `on_row` as each file finishes.
    pub async fn process_batch_with<F>(&self, inputs: Vec<ImageInput>, on_row: F) -> BatchOutcome
    where
        F: Fn(&BatchRow),
    {
        let total = inputs.len();
        let results: Vec<(String, Result<ProcessedDocument, OcrError>)> =
            stream::iter(inputs)
                .map(|input| async move {
                    let result = self.process_document(&input, true).await;
                    (input.filename, result)
                })
                .buffered(self.concurrency)
                .inspect(|(filename, result)| match result {
                    Ok(doc) => on_row(&BatchRow::from_document(doc, self.preview_chars)),
                    Err(e) => on_row(&BatchRow::failed(filename.clone(), e.to_string())),
                })
                .collect()
                .await;

        let mut rows = Vec::with_capacity(total);
        let mut documents = Vec::new();
        for (filename, result) in results {
            match result {
                Ok(doc) => {
                    rows.push(BatchRow::from_document(&doc, self.preview_chars));
                    documents.push(doc);
                }
                Err(e) => {
                    warn!("Failed to process {}: {}", filename, e);
                    rows.push(BatchRow::failed(filename, e.to_string()));
                }
            }
        }

        let succeeded = rows.iter().filter(|r| r.is_success()).count();
        let summary = batch_summary(total, succeeded);
        info!("{}", summary);

        BatchOutcome {
            rows,
            documents,
            summary,
        }
    }
}
