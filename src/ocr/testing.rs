//! In-process OCR backend for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{ImageInput, OcrBackend, OcrError};
use crate::models::{OcrPage, OcrResponse};

/// Returns canned page text per filename; unknown files get `default_text`.
pub struct StubBackend {
    pages: HashMap<String, Vec<String>>,
    failures: HashMap<String, String>,
    default_text: String,
    delay: Duration,
    pub calls: AtomicUsize,
}

impl StubBackend {
    pub fn new(default_text: &str) -> Self {
        Self {
            pages: HashMap::new(),
            failures: HashMap::new(),
            default_text: default_text.to_string(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_pages(mut self, filename: &str, pages: &[&str]) -> Self {
        self.pages.insert(
            filename.to_string(),
            pages.iter().map(|p| p.to_string()).collect(),
        );
        self
    }

    pub fn with_failure(mut self, filename: &str, message: &str) -> Self {
        self.failures
            .insert(filename.to_string(), message.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl OcrBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-ocr"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        "stub backend".to_string()
    }

    async fn process_image(&self, input: &ImageInput) -> Result<OcrResponse, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        input.format()?;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(message) = self.failures.get(&input.filename) {
            return Err(OcrError::Api {
                status: 500,
                message: message.clone(),
            });
        }
        let texts = self
            .pages
            .get(&input.filename)
            .cloned()
            .unwrap_or_else(|| vec![self.default_text.clone()]);
        let pages = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| OcrPage {
                page_index: i as u32,
                markdown_content: text,
                confidence: None,
                processing_time_ms: Some(5),
                dimensions: None,
            })
            .collect();
        Ok(OcrResponse::new(pages, "stub-ocr", 5, Some(input.file_info())))
    }
}

/// Minimal PNG signature accepted by format detection.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
