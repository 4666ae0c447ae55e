//! HTTP surface: routes, handlers, application state, server lifecycle.
//!
//! Two endpoints do the work: `GET /` serves a static informational page
//! and `POST /marker` runs a conversion. `GET /health` reports liveness
//! for load balancers. Validation failures are HTTP 400; everything that
//! fails after validation is an HTTP 200 carrying
//! `{"success": false, "error": "..."}` (see [`crate::error`]).

use crate::config::ServerConfig;
use crate::convert;
use crate::engine::ModelRegistry;
use crate::error::{ServerError, ValidationError};
use crate::request::{ConvertRequest, Source};
use crate::response::ConvertResponse;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const ROOT_HTML: &str = r#"<h1>Marker API</h1>
<ul>
    <li><a href="/health">Service health</a></li>
    <li><a href="/marker">Run marker (POST request only)</a></li>
</ul>
"#;

/// Shared per-process state, injected into every handler.
///
/// Constructed once at startup; the registry and the HTTP client are
/// read-only afterwards, so cloning the state is cheap and lock-free.
#[derive(Clone)]
pub struct AppState {
    pub registry: ModelRegistry,
    pub client: reqwest::Client,
    pub config: ServerConfig,
}

impl AppState {
    /// Build the state, including the shared download client carrying
    /// the configured fetch timeout.
    pub fn new(registry: ModelRegistry, config: ServerConfig) -> Result<Self, ServerError> {
        let client = reqwest::Client::builder()
            .timeout(config.download_timeout())
            .build()
            .map_err(|e| ServerError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            registry,
            client,
            config,
        })
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/marker", post(convert_pdf))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /` — static informational page.
async fn root() -> Html<&'static str> {
    Html(ROOT_HTML)
}

/// `GET /health` — liveness and model state.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "models_loaded": state.registry.is_loaded(),
    }))
}

/// `POST /marker` — the conversion endpoint.
///
/// Dispatches on the validated [`Source`]; contained pipeline failures
/// come back as the failure payload with HTTP 200.
async fn convert_pdf(
    State(state): State<AppState>,
    Json(request): Json<ConvertRequest>,
) -> Result<Json<ConvertResponse>, ValidationError> {
    let (source, params) = request.validate()?;

    let result = match source {
        Source::Local(path) => convert::convert_local(&state, &path, &params).await,
        Source::Remote(url) => convert::convert_remote(&state, &url, &params).await,
    };

    let response = result.unwrap_or_else(|e| {
        warn!(error = %e, "conversion request failed");
        ConvertResponse::failure(e)
    });

    Ok(Json(response))
}

/// Bind the listener and serve until a shutdown signal arrives.
///
/// The registry (and with it the loaded engine) drops when this returns.
pub async fn serve(config: ServerConfig, registry: ModelRegistry) -> Result<(), ServerError> {
    let addr = config.bind_addr();
    let binds_wide = config.binds_to_all_interfaces();
    let state = AppState::new(registry, config)?;
    let app = router(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;

    info!(addr = %addr, "server is ready and listening for connections");
    if binds_wide {
        warn!("server is bound to all interfaces; check firewall rules");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down gracefully");
    Ok(())
}

/// Resolve on SIGINT (Ctrl+C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
        } else {
            info!("received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("received SIGTERM, shutting down");
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
