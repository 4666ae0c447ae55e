//! # marker-api
//!
//! An HTTP API that converts PDF documents to Markdown, extracted images,
//! and metadata.
//!
//! ## What this crate does — and does not — do
//!
//! The PDF heavy lifting (text ordering, layout, image decoding) belongs
//! to the conversion engine behind the [`engine::ConversionEngine`] seam;
//! the in-tree engine binds the pdfium library. This crate is the thin
//! orchestration around it: load the engine once at startup, validate
//! request parameters, fetch remote files to temporary storage, invoke
//! the engine, and encode the result for JSON transport.
//!
//! ## Pipeline Overview
//!
//! ```text
//! POST /marker
//!  │
//!  ├─ 1. Validate  request → Source::{Local, Remote} + engine params
//!  ├─ 2. Fetch     URL sources stream to a temp file (30 s timeout)
//!  ├─ 3. Convert   engine call via the startup-loaded registry
//!  ├─ 4. Encode    images → PNG → base64
//!  └─ 5. Respond   {markdown, images, metadata, success: true}
//!                  or {success: false, error}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use marker_api::{serve, ModelRegistry, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let registry = ModelRegistry::load(&config).await?;
//!     serve(config, registry).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error contract
//!
//! Requests with an invalid shape (no source, disallowed options) are
//! rejected with HTTP 400 before any work happens. Everything after
//! validation — download failures, missing files, engine failures — is
//! reported as HTTP 200 with `{"success": false, "error": "..."}` so
//! clients branch on the body, not the status line.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ServerConfig, ServerConfigBuilder};
pub use engine::{ConversionEngine, EngineError, EngineOutput, EngineRequest, ModelRegistry};
pub use error::{ConvertError, ServerError, ValidationError};
pub use request::{ConvertRequest, EngineParams, Source};
pub use response::ConvertResponse;
pub use server::{router, serve, AppState};
