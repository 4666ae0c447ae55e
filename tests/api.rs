//! Integration tests for the marker-api HTTP surface.
//!
//! The conversion engine is substituted with [`MockEngine`] behind the
//! `ConversionEngine` seam, so these tests exercise the full
//! validate → fetch → invoke → encode → respond path without needing a
//! pdfium library. Remote-source tests run against a local fixture
//! server bound to an ephemeral port.

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use axum_test::TestServer;
use image::{DynamicImage, Rgba, RgbaImage};
use marker_api::{
    AppState, ConversionEngine, EngineError, EngineOutput, EngineRequest, ModelRegistry,
    ServerConfig,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ── Test doubles ─────────────────────────────────────────────────────────────

/// Record of one engine invocation.
#[derive(Debug, Clone)]
struct RecordedCall {
    path: PathBuf,
    max_pages: Option<usize>,
    langs: Vec<String>,
    force_ocr: bool,
}

/// Scriptable engine double that records every call it receives.
struct MockEngine {
    calls: Mutex<Vec<RecordedCall>>,
    with_image: bool,
    fail_with: Option<String>,
}

impl MockEngine {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            with_image: false,
            fail_with: None,
        })
    }

    fn ok_with_image() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            with_image: true,
            fail_with: None,
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            with_image: false,
            fail_with: Some(message.to_string()),
        })
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversionEngine for MockEngine {
    async fn convert(&self, request: EngineRequest<'_>) -> Result<EngineOutput, EngineError> {
        self.calls.lock().unwrap().push(RecordedCall {
            path: request.path.to_path_buf(),
            max_pages: request.max_pages,
            langs: request.langs.clone(),
            force_ocr: request.force_ocr,
        });

        if let Some(message) = &self.fail_with {
            return Err(EngineError::Internal(message.clone()));
        }

        let mut images = BTreeMap::new();
        if self.with_image {
            images.insert(
                "page_0_img_0".to_string(),
                DynamicImage::ImageRgba8(RgbaImage::from_pixel(6, 6, Rgba([0, 128, 255, 255]))),
            );
        }

        Ok(EngineOutput {
            text: "# Mock Document\n\nHello.".into(),
            images,
            metadata: serde_json::Map::from_iter([
                ("page_count".to_string(), json!(2)),
                ("pages_converted".to_string(), json!(2)),
            ]),
        })
    }
}

fn test_server(engine: Arc<MockEngine>) -> TestServer {
    let state = AppState::new(
        ModelRegistry::with_engine(engine),
        ServerConfig::default(),
    )
    .expect("state should build");
    TestServer::new(marker_api::router(state)).expect("test server should start")
}

/// Serve fixture routes on an ephemeral local port.
async fn spawn_fixture() -> SocketAddr {
    let app = Router::new()
        .route(
            "/doc.pdf",
            get(|| async { b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\ntrailer\n<<>>\n%%EOF\n".to_vec() }),
        )
        .route(
            "/page.html",
            get(|| async { "<html><body>not a pdf</body></html>" }),
        )
        .route(
            "/missing.pdf",
            get(|| async { (StatusCode::NOT_FOUND, "gone") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("fixture bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn temp_pdf() -> tempfile::NamedTempFile {
    tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .expect("temp pdf")
}

// ── Informational endpoints ──────────────────────────────────────────────────

#[tokio::test]
async fn root_serves_informational_html() {
    let server = test_server(MockEngine::ok());

    let response = server.get("/").await;
    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("Marker API"));
    assert!(body.contains("/marker"));
}

#[tokio::test]
async fn health_reports_models_loaded() {
    let server = test_server(MockEngine::ok());

    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["models_loaded"], json!(true));
}

// ── Validation boundary ──────────────────────────────────────────────────────

#[tokio::test]
async fn no_source_is_rejected_before_any_work() {
    let engine = MockEngine::ok();
    let server = test_server(engine.clone());

    let response = server.post("/marker").json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.text().contains("No filepath or url"));
    assert!(engine.calls().is_empty(), "engine must not be called");
}

#[tokio::test]
async fn disabling_image_extraction_is_rejected() {
    let engine = MockEngine::ok();
    let server = test_server(engine.clone());
    let file = temp_pdf();

    let response = server
        .post("/marker")
        .json(&json!({
            "filepath": file.path().to_str().unwrap(),
            "extract_images": false
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.text().contains("does not support"));
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn pagination_is_rejected() {
    let engine = MockEngine::ok();
    let server = test_server(engine.clone());
    let file = temp_pdf();

    let response = server
        .post("/marker")
        .json(&json!({
            "filepath": file.path().to_str().unwrap(),
            "paginate": true
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(engine.calls().is_empty());
}

// ── Local conversion ─────────────────────────────────────────────────────────

#[tokio::test]
async fn local_conversion_returns_success_payload() {
    let engine = MockEngine::ok();
    let server = test_server(engine.clone());
    let file = temp_pdf();

    let response = server
        .post("/marker")
        .json(&json!({
            "filepath": file.path().to_str().unwrap(),
            "langs": "en,fr"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["markdown"], json!("# Mock Document\n\nHello."));
    assert_eq!(body["images"], json!({}));
    assert_eq!(body["metadata"]["page_count"], json!(2));
    assert!(body.get("error").is_none());

    let calls = engine.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].langs, vec!["en", "fr"]);
    assert!(!calls[0].force_ocr);
}

#[tokio::test]
async fn engine_parameters_are_forwarded() {
    let engine = MockEngine::ok();
    let server = test_server(engine.clone());
    let file = temp_pdf();

    server
        .post("/marker")
        .json(&json!({
            "filepath": file.path().to_str().unwrap(),
            "max_pages": 3,
            "force_ocr": true
        }))
        .await
        .assert_status_ok();

    let calls = engine.calls();
    assert_eq!(calls[0].max_pages, Some(3));
    assert!(calls[0].force_ocr);
}

#[tokio::test]
async fn images_are_base64_png_encoded() {
    let engine = MockEngine::ok_with_image();
    let server = test_server(engine);
    let file = temp_pdf();

    let response = server
        .post("/marker")
        .json(&json!({"filepath": file.path().to_str().unwrap()}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let encoded = body["images"]["page_0_img_0"].as_str().unwrap();

    use base64::Engine as _;
    let png_bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .expect("valid base64");
    let decoded = image::load_from_memory(&png_bytes).expect("valid PNG bytes");
    assert_eq!((decoded.width(), decoded.height()), (6, 6));
}

#[tokio::test]
async fn nonexistent_filepath_is_contained_failure() {
    let engine = MockEngine::ok();
    let server = test_server(engine.clone());

    let response = server
        .post("/marker")
        .json(&json!({"filepath": "/definitely/not/a/real/file.pdf"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("not found"));
    assert!(engine.calls().is_empty(), "engine must not see missing paths");
}

#[tokio::test]
async fn engine_failure_is_contained() {
    let engine = MockEngine::failing("corrupt xref table");
    let server = test_server(engine);
    let file = temp_pdf();

    let response = server
        .post("/marker")
        .json(&json!({"filepath": file.path().to_str().unwrap()}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("corrupt xref table"));
}

// ── Remote conversion ────────────────────────────────────────────────────────

#[tokio::test]
async fn remote_conversion_downloads_then_converts() {
    let engine = MockEngine::ok();
    let server = test_server(engine.clone());
    let fixture = spawn_fixture().await;
    let url = format!("http://{fixture}/doc.pdf");

    let response = server.post("/marker").json(&json!({"url": url})).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], json!(true));

    // The engine only ever sees the path the fetcher created, and that
    // file is gone once the request completes.
    let calls = engine.calls();
    assert_eq!(calls.len(), 1);
    let seen = &calls[0].path;
    assert_ne!(seen.to_str().unwrap(), url);
    assert_eq!(seen.extension().and_then(|e| e.to_str()), Some("pdf"));
    assert!(!seen.exists(), "temp file must be cleaned up");
}

#[tokio::test]
async fn remote_404_is_contained_failure() {
    let engine = MockEngine::ok();
    let server = test_server(engine.clone());
    let fixture = spawn_fixture().await;

    let response = server
        .post("/marker")
        .json(&json!({"url": format!("http://{fixture}/missing.pdf")}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("404"));
    assert!(engine.calls().is_empty(), "engine must not run after a failed fetch");
}

#[tokio::test]
async fn remote_non_pdf_is_contained_failure() {
    let engine = MockEngine::ok();
    let server = test_server(engine.clone());
    let fixture = spawn_fixture().await;

    let response = server
        .post("/marker")
        .json(&json!({"url": format!("http://{fixture}/page.html")}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("not a valid PDF"));
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn unreachable_host_is_contained_failure() {
    let engine = MockEngine::ok();
    let server = test_server(engine.clone());

    // Discard port on loopback; nothing listens there.
    let response = server
        .post("/marker")
        .json(&json!({"url": "http://127.0.0.1:9/doc.pdf"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn temp_file_cleaned_up_when_conversion_fails() {
    let engine = MockEngine::failing("engine exploded");
    let server = test_server(engine.clone());
    let fixture = spawn_fixture().await;

    let response = server
        .post("/marker")
        .json(&json!({"url": format!("http://{fixture}/doc.pdf")}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));

    let calls = engine.calls();
    assert_eq!(calls.len(), 1);
    assert!(
        !calls[0].path.exists(),
        "temp file must be cleaned up even when conversion fails"
    );
}
