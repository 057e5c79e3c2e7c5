//! Router configuration for the web server.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.settings.server.max_upload_mb.max(1) * 1024 * 1024;

    Router::new()
        .route("/", get(handlers::index))
        // OCR API
        .route("/api/ocr", post(handlers::api_ocr))
        .route("/api/batch", post(handlers::api_batch))
        .route("/api/batch/:batch_id", get(handlers::api_batch_get))
        .route("/api/batch/:batch_id/export", get(handlers::export_batch))
        .route("/api/health", get(handlers::api_health))
        // Static assets (CSS/JS)
        .route("/static/style.css", get(handlers::serve_css))
        .route("/static/app.js", get(handlers::serve_js))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
