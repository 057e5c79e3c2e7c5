//! Mistral AI OCR backend implementation.
//!
//! Sends the image as a base64 `data:` URI to the `/v1/ocr` endpoint and maps
//! the per-page Markdown reply into an `OcrResponse`.
//!
//! Rate limiting:
//! - Optional delay before each request (`mistral.request_delay_ms`)
//! - Automatically retries on 429 with exponential backoff
//! - Respects Retry-After header from API

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::backend::{ImageInput, OcrBackend, OcrError};
use crate::config::MistralConfig;
use crate::models::{OcrPage, OcrResponse, PageDimensions};
use crate::rate_limit::{backoff_delay, parse_retry_after};

/// Maximum retry attempts on rate limit errors.
const MAX_RETRIES: u32 = 5;

/// Base delay for exponential backoff.
const BACKOFF_BASE_MS: u64 = 1000;

const USER_AGENT: &str = concat!("docuflow/", env!("CARGO_PKG_VERSION"));

/// OCR backend using Mistral's hosted OCR model.
pub struct MistralBackend {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    include_image_base64: bool,
    request_delay: Duration,
    backoff_base_ms: u64,
}

#[derive(Debug, Serialize)]
struct OcrRequest<'a> {
    model: &'a str,
    document: DocumentChunk,
    include_image_base64: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DocumentChunk {
    ImageUrl { image_url: String },
}

#[derive(Debug, Deserialize)]
struct MistralOcrResponse {
    pages: Vec<MistralPage>,
    model: Option<String>,
    usage_info: Option<MistralUsage>,
}

#[derive(Debug, Deserialize)]
struct MistralPage {
    index: u32,
    #[serde(default)]
    markdown: String,
    dimensions: Option<MistralDimensions>,
}

#[derive(Debug, Deserialize)]
struct MistralDimensions {
    dpi: Option<u32>,
    height: Option<u32>,
    width: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct MistralUsage {
    pages_processed: Option<u32>,
    doc_size_bytes: Option<u64>,
}

/// Error bodies come in a few shapes: `{"message": ...}`, `{"detail": ...}`
/// or `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
struct MistralErrorBody {
    message: Option<serde_json::Value>,
    detail: Option<serde_json::Value>,
    error: Option<serde_json::Value>,
}

impl MistralErrorBody {
    fn into_message(self) -> Option<String> {
        [self.message, self.detail, self.error]
            .into_iter()
            .flatten()
            .find_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Object(ref map) => map
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
                    .or_else(|| Some(v.to_string())),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })
    }
}

/// Pull a readable message out of an error response body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<MistralErrorBody>(body)
        .ok()
        .and_then(MistralErrorBody::into_message)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no response body".to_string()
            } else {
                trimmed.chars().take(500).collect()
            }
        })
}

impl MistralBackend {
    /// Create a backend from the `mistral:` config section.
    pub fn from_config(config: &MistralConfig) -> Result<Self, OcrError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_key: config
                .token
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty() && *t != crate::config::SAMPLE_TOKEN)
                .map(str::to_string),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            include_image_base64: config.include_image_base64,
            request_delay: Duration::from_millis(config.request_delay_ms),
            backoff_base_ms: BACKOFF_BASE_MS,
        })
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the model (e.g., "mistral-ocr-latest").
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the backoff base used when no Retry-After header is sent.
    pub fn with_backoff_base_ms(mut self, base_ms: u64) -> Self {
        self.backoff_base_ms = base_ms;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/ocr", self.base_url)
    }

    fn map_response(
        &self,
        input: &ImageInput,
        reply: MistralOcrResponse,
        elapsed: Duration,
    ) -> OcrResponse {
        let elapsed_ms = elapsed.as_millis() as u64;
        if let Some(usage) = &reply.usage_info {
            debug!(
                "Mistral usage: pages_processed={:?}, doc_size_bytes={:?}",
                usage.pages_processed, usage.doc_size_bytes
            );
        }

        let mut pages: Vec<OcrPage> = reply
            .pages
            .into_iter()
            .map(|page| OcrPage {
                page_index: page.index,
                markdown_content: page.markdown,
                confidence: None,
                processing_time_ms: Some(elapsed_ms),
                dimensions: page.dimensions.map(|d| PageDimensions {
                    dpi: d.dpi,
                    height: d.height,
                    width: d.width,
                }),
            })
            .collect();
        pages.sort_by_key(|p| p.page_index);

        let model = reply.model.unwrap_or_else(|| self.model.clone());
        OcrResponse::new(pages, model, elapsed_ms, Some(input.file_info()))
    }
}

#[async_trait]
impl OcrBackend for MistralBackend {
    fn name(&self) -> &str {
        "mistral"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn availability_hint(&self) -> String {
        if self.api_key.is_none() {
            "Mistral API key not set. Add `mistral.token` to config.yaml or set MISTRAL_API_KEY \
             (get a key from https://console.mistral.ai/)"
                .to_string()
        } else {
            format!("Mistral OCR is available (model: {})", self.model)
        }
    }

    async fn process_image(&self, input: &ImageInput) -> Result<OcrResponse, OcrError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| OcrError::BackendNotAvailable(self.availability_hint()))?;

        // Validate before touching the network.
        let data_uri = input.data_uri()?;
        let request = OcrRequest {
            model: &self.model,
            document: DocumentChunk::ImageUrl {
                image_url: data_uri,
            },
            include_image_base64: self.include_image_base64,
        };
        let url = self.endpoint();
        let start = Instant::now();

        if self.request_delay > Duration::ZERO {
            debug!("Mistral: waiting {:?} before request", self.request_delay);
            tokio::time::sleep(self.request_delay).await;
        }

        // Retry loop with exponential backoff on 429
        let mut attempt = 0;
        loop {
            let response = self
                .client
                .post(&url)
                .bearer_auth(api_key)
                .json(&request)
                .send()
                .await?;

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let retry_after_secs = retry_after.as_deref().and_then(|s| s.trim().parse().ok());

                if attempt >= MAX_RETRIES {
                    return Err(OcrError::RateLimited { retry_after_secs });
                }

                let wait = parse_retry_after(retry_after.as_deref())
                    .unwrap_or_else(|| backoff_delay(attempt, self.backoff_base_ms));

                warn!(
                    "Mistral rate limited (attempt {}), waiting {:?}",
                    attempt + 1,
                    wait
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
                continue;
            }

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                let body = response.text().await.unwrap_or_default();
                return Err(OcrError::Unauthorized(error_message(&body)));
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(OcrError::Api {
                    status: status.as_u16(),
                    message: error_message(&body),
                });
            }

            let body = response.text().await?;
            let reply: MistralOcrResponse = serde_json::from_str(&body)
                .map_err(|e| OcrError::InvalidResponse(format!("failed to parse response: {}", e)))?;

            let result = self.map_response(input, reply, start.elapsed());
            info!(
                "Mistral OCR processed {} ({} page(s), {} ms)",
                input.filename, result.total_pages, result.total_processing_time_ms
            );
            return Ok(result);
        }
    }
}
