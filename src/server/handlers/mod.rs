//! HTTP request handlers for the web server.

mod batch_api;
mod export_api;
mod health;
mod helpers;
mod index;
mod ocr_api;
mod static_files;

// Re-export handlers for use by the router
pub use batch_api::{api_batch, api_batch_get};
pub use export_api::export_batch;
pub use health::api_health;
pub use index::index;
pub use ocr_api::api_ocr;
pub use static_files::{serve_css, serve_js};
