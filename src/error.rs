//! Error types for the marker-api service.
//!
//! Three distinct error types reflect three distinct failure modes:
//!
//! * [`ValidationError`] — the request never entered the pipeline
//!   (no source, disallowed parameter combination). Surfaced as an
//!   HTTP 400 before any conversion work begins.
//!
//! * [`ConvertError`] — the request was valid but the fetch or the
//!   conversion failed. Contained at the handler and reported as
//!   `{"success": false, "error": "..."}` with HTTP 200, so callers can
//!   branch on the body rather than the status line.
//!
//! * [`ServerError`] — **Fatal**: the process cannot start or keep
//!   serving (engine failed to load, address already in use). Returned
//!   from startup and aborts the binary with a non-zero exit.

use std::path::PathBuf;
use thiserror::Error;

/// Fixed message for the deployment restriction on `extract_images` /
/// `paginate`. The conversion engine supports both; this deployment does
/// not expose them.
pub const UNSUPPORTED_OPTIONS_MSG: &str =
    "This conversion API does not support disabling image extraction or enabling pagination.";

/// Request-shape errors detected before any conversion work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Neither `filepath` nor `url` was provided.
    #[error("No filepath or url provided.")]
    NoSource,

    /// `extract_images` was false or `paginate` was true.
    /// Keep the message in sync with [`UNSUPPORTED_OPTIONS_MSG`].
    #[error(
        "This conversion API does not support disabling image extraction or enabling pagination."
    )]
    UnsupportedOptions,

    /// `max_pages` was zero.
    #[error("max_pages must be at least 1")]
    ZeroMaxPages,
}

/// Per-request failures from the fetch or conversion pipeline.
///
/// Every variant ends up as `{"success": false, "error": <Display>}`.
/// There is no retry logic anywhere: the first failure is terminal for
/// the request.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Source errors ─────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}' (first bytes: {magic:?})")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Fetch errors ──────────────────────────────────────────────────────
    /// HTTP URL was syntactically valid but the download failed
    /// (connection error, non-2xx status, body read error).
    #[error("Failed to download '{url}': {reason}")]
    Fetch { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    FetchTimeout { url: String, secs: u64 },

    /// Could not create or write the temporary download file.
    #[error("Failed to write temporary file: {source}")]
    TempFile {
        #[source]
        source: std::io::Error,
    },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The conversion engine rejected or failed on the document.
    #[error("Conversion failed: {0}")]
    Engine(#[from] crate::engine::EngineError),

    /// An extracted image could not be PNG-encoded for transport.
    #[error("Failed to encode image '{id}': {detail}")]
    ImageEncode { id: String, detail: String },
}

/// Fatal process-level errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The conversion engine could not be loaded at startup.
    #[error(
        "Failed to load the conversion engine: {0}\n\
         Check that the pdfium library is installed and on the loader path."
    )]
    EngineLoad(String),

    /// Could not bind the listen address.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The server loop terminated with an I/O error.
    #[error("Server error: {0}")]
    Runtime(#[from] std::io::Error),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
