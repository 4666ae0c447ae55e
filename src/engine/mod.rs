//! The conversion-engine boundary.
//!
//! Everything this service knows about PDF conversion is expressed by the
//! [`ConversionEngine`] trait: hand the engine a local file path plus a
//! handful of hints, get back text, an image map, and metadata — or an
//! error. The engine's internals (layout analysis, OCR, text ordering)
//! are deliberately opaque to the rest of the crate, so an alternative
//! engine can be swapped in behind the same seam without touching the
//! HTTP layer.
//!
//! The in-tree implementation is [`PdfiumEngine`], which binds the pdfium
//! library. [`registry::ModelRegistry`] owns the loaded engine for the
//! lifetime of the process.

pub mod pdfium;
pub mod registry;

pub use pdfium::PdfiumEngine;
pub use registry::ModelRegistry;

use async_trait::async_trait;
use image::DynamicImage;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One conversion job handed to the engine.
///
/// `path` always names a local file by the time the engine sees it; the
/// fetch stage has already materialised URL sources on disk.
#[derive(Debug, Clone)]
pub struct EngineRequest<'a> {
    /// Local path to the PDF to convert.
    pub path: &'a Path,
    /// Cap on the number of pages processed, from the document start.
    pub max_pages: Option<usize>,
    /// Ordered OCR language hints; empty means engine auto-detect.
    pub langs: Vec<String>,
    /// Force OCR even on pages with embedded text.
    pub force_ocr: bool,
}

/// What the engine produced for one document.
///
/// Passed to the response encoder unmodified: the service does not
/// inspect or rewrite engine output.
#[derive(Debug, Default)]
pub struct EngineOutput {
    /// Extracted content as a single Markdown blob.
    pub text: String,
    /// Extracted images keyed by a stable identifier
    /// (`page_{n}_img_{i}`).
    pub images: BTreeMap<String, DynamicImage>,
    /// Open-ended document/conversion metadata.
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Failures raised by an engine implementation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The document could not be opened or parsed.
    #[error("cannot open PDF '{path}': {detail}")]
    InvalidDocument { path: PathBuf, detail: String },

    /// A page-level extraction failed in a way the engine could not
    /// recover from.
    #[error("extraction failed on page {page}: {detail}")]
    PageFailed { page: usize, detail: String },

    /// The engine itself is unusable (library binding lost, task panic).
    #[error("engine failure: {0}")]
    Internal(String),
}

/// The external collaborator contract: local path in, conversion out.
///
/// Implementations must be safe to share across requests (`Send + Sync`);
/// the registry hands every handler the same instance for the lifetime of
/// the process.
#[async_trait]
pub trait ConversionEngine: Send + Sync {
    /// Convert one document. No retries are attempted on failure.
    async fn convert(&self, request: EngineRequest<'_>) -> Result<EngineOutput, EngineError>;
}
