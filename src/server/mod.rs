//! Web server for single and batch document OCR.
//!
//! Provides a browser UI plus a JSON API:
//! - Single image upload with raw text, structured fields and details
//! - Batch upload with a result table
//! - Batch export as CSV, JSON or JSON Lines

mod assets;
mod batch_store;
mod handlers;
mod routes;
mod template_structs;

pub use batch_store::{BatchStore, StoredBatch};
pub use routes::create_router;

use std::sync::Arc;

use crate::config::Settings;
use crate::services::DocumentProcessor;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<DocumentProcessor>,
    pub batches: Arc<BatchStore>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let processor = DocumentProcessor::from_settings(settings)?;
        Ok(Self::with_processor(settings.clone(), processor))
    }

    /// Build state around an existing processor.
    pub fn with_processor(settings: Settings, processor: DocumentProcessor) -> Self {
        Self {
            processor: Arc::new(processor),
            batches: Arc::new(BatchStore::new(settings.server.max_batches)),
            settings: Arc::new(settings),
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    if !state.processor.backend().is_available() {
        tracing::warn!("{}", state.processor.backend().availability_hint());
    }
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!("Starting server at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
