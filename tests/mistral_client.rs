//! Mistral OCR client tests against an in-process fake of the API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use docuflow::config::MistralConfig;
use docuflow::ocr::{ImageInput, MistralBackend, OcrBackend, OcrError};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

#[derive(Clone, Copy)]
enum Scenario {
    Success,
    RateLimitedOnce,
    AlwaysRateLimited,
    Unauthorized,
    ServerError,
    Garbage,
}

#[derive(Clone)]
struct FakeState {
    scenario: Scenario,
    calls: Arc<AtomicUsize>,
    last_request: Arc<std::sync::Mutex<Option<(Option<String>, Value)>>>,
}

fn ok_reply() -> Value {
    json!({
        "pages": [
            { "index": 0, "markdown": "บริษัท ทดสอบ จำกัด\nโทร 02-123-4567",
              "dimensions": { "dpi": 200, "height": 2200, "width": 1700 } }
        ],
        "model": "mistral-ocr-2505-completion",
        "usage_info": { "pages_processed": 1, "doc_size_bytes": 12 }
    })
}

async fn fake_ocr(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let call = state.calls.fetch_add(1, Ordering::SeqCst);
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if let Ok(mut last) = state.last_request.lock() {
        *last = Some((auth, body));
    }

    match state.scenario {
        Scenario::Success => Json(ok_reply()).into_response(),
        Scenario::RateLimitedOnce if call == 0 => (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, "0")],
            "slow down",
        )
            .into_response(),
        Scenario::RateLimitedOnce => Json(ok_reply()).into_response(),
        Scenario::AlwaysRateLimited => {
            (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response()
        }
        Scenario::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Unauthorized" })),
        )
            .into_response(),
        Scenario::ServerError => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "model overloaded" })),
        )
            .into_response(),
        Scenario::Garbage => (StatusCode::OK, "not json").into_response(),
    }
}

/// Start a fake API and return a backend pointed at it.
async fn start(scenario: Scenario) -> (MistralBackend, FakeState) {
    let state = FakeState {
        scenario,
        calls: Arc::new(AtomicUsize::new(0)),
        last_request: Arc::new(std::sync::Mutex::new(None)),
    };
    let app = Router::new()
        .route("/v1/ocr", post(fake_ocr))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = MistralConfig {
        token: Some("test-key".to_string()),
        base_url: format!("http://{}/v1", addr),
        timeout_secs: 10,
        ..MistralConfig::default()
    };
    let backend = MistralBackend::from_config(&config)
        .unwrap()
        .with_backoff_base_ms(1);
    (backend, state)
}

fn png() -> ImageInput {
    ImageInput::new("invoice.png", PNG_BYTES.to_vec())
}

#[tokio::test]
async fn test_success_maps_pages_and_sends_data_uri() {
    let (backend, state) = start(Scenario::Success).await;
    let response = backend.process_image(&png()).await.unwrap();

    assert_eq!(response.total_pages, 1);
    assert_eq!(response.results.len(), 1);
    assert!(response.first_text().starts_with("บริษัท ทดสอบ จำกัด"));
    assert_eq!(response.model_used, "mistral-ocr-2505-completion");
    assert_eq!(response.results[0].dimensions.as_ref().unwrap().dpi, Some(200));
    assert_eq!(response.file_info.as_ref().unwrap().filename, "invoice.png");

    let (auth, body) = state.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(auth.as_deref(), Some("Bearer test-key"));
    assert_eq!(body["model"], "mistral-ocr-latest");
    assert_eq!(body["document"]["type"], "image_url");
    assert!(body["document"]["image_url"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
    assert_eq!(body["include_image_base64"], false);
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let (backend, state) = start(Scenario::RateLimitedOnce).await;
    let response = backend.process_image(&png()).await.unwrap();

    assert_eq!(response.total_pages, 1);
    assert_eq!(state.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_rate_limit_gives_up_after_max_retries() {
    let (backend, state) = start(Scenario::AlwaysRateLimited).await;
    let err = backend.process_image(&png()).await.unwrap_err();

    assert!(matches!(err, OcrError::RateLimited { .. }));
    // One initial attempt plus five retries.
    assert_eq!(state.calls.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn test_unauthorized() {
    let (backend, _state) = start(Scenario::Unauthorized).await;
    let err = backend.process_image(&png()).await.unwrap_err();

    assert!(matches!(err, OcrError::Unauthorized(ref msg) if msg == "Unauthorized"));
}

#[tokio::test]
async fn test_server_error_message_from_body() {
    let (backend, _state) = start(Scenario::ServerError).await;
    let err = backend.process_image(&png()).await.unwrap_err();

    match err {
        OcrError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "model overloaded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_undecodable_body() {
    let (backend, _state) = start(Scenario::Garbage).await;
    let err = backend.process_image(&png()).await.unwrap_err();

    assert!(matches!(err, OcrError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_unsupported_format_never_hits_network() {
    let (backend, state) = start(Scenario::Success).await;
    let input = ImageInput::new("report.pdf", b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n".to_vec());
    let err = backend.process_image(&input).await.unwrap_err();

    assert!(matches!(err, OcrError::UnsupportedFormat(_)));
    assert_eq!(state.calls.load(Ordering::SeqCst), 0);
}
