//! Pdfium-backed [`ConversionEngine`].
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves each conversion onto the
//! blocking thread pool so the Tokio workers keep serving other requests
//! while a document is being chewed through.
//!
//! ## Why a semaphore?
//!
//! Conversion is CPU-bound and has no internal yield points. The
//! `cpu_workers` permit count (the `MARKER_CPU_WORKERS` hint) bounds how
//! many documents convert at once; excess requests queue on the permit
//! instead of piling onto the blocking pool.

use super::{ConversionEngine, EngineError, EngineOutput, EngineRequest};
use crate::config::ServerConfig;
use crate::error::ServerError;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Conversion engine backed by the pdfium library.
///
/// Extracts embedded text, embedded image objects, and document metadata.
/// Scanned (image-only) pages yield little or no text; no OCR is
/// performed. The `langs` and `force_ocr` hints are accepted and recorded
/// in the conversion metadata so callers can see what was requested.
pub struct PdfiumEngine {
    workers: Semaphore,
}

impl PdfiumEngine {
    /// Bind the pdfium library and construct the engine.
    ///
    /// The binding is probed on the blocking pool before the engine is
    /// handed out; a missing or broken libpdfium is a fatal startup
    /// error, not something to discover on the first request.
    pub async fn load(config: &ServerConfig) -> Result<Self, ServerError> {
        let probe = tokio::task::spawn_blocking(|| {
            Pdfium::bind_to_system_library()
                .map(|_| ())
                .map_err(|e| format!("{e:?}"))
        })
        .await
        .map_err(|e| ServerError::EngineLoad(format!("binding probe panicked: {e}")))?;

        probe.map_err(ServerError::EngineLoad)?;

        info!(
            cpu_workers = config.cpu_workers,
            "pdfium engine loaded"
        );

        Ok(Self {
            workers: Semaphore::new(config.cpu_workers),
        })
    }
}

#[async_trait]
impl ConversionEngine for PdfiumEngine {
    async fn convert(&self, request: EngineRequest<'_>) -> Result<EngineOutput, EngineError> {
        let _permit = self
            .workers
            .acquire()
            .await
            .map_err(|e| EngineError::Internal(format!("worker semaphore closed: {e}")))?;

        let path = request.path.to_path_buf();
        let max_pages = request.max_pages;
        let langs = request.langs;
        let force_ocr = request.force_ocr;

        tokio::task::spawn_blocking(move || {
            convert_blocking(&path, max_pages, &langs, force_ocr)
        })
        .await
        .map_err(|e| EngineError::Internal(format!("conversion task panicked: {e}")))?
    }
}

/// Blocking implementation of one conversion.
fn convert_blocking(
    path: &Path,
    max_pages: Option<usize>,
    langs: &[String],
    force_ocr: bool,
) -> Result<EngineOutput, EngineError> {
    let pdfium = Pdfium::new(
        Pdfium::bind_to_system_library()
            .map_err(|e| EngineError::Internal(format!("pdfium binding lost: {e:?}")))?,
    );

    let document =
        pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| EngineError::InvalidDocument {
                path: path.to_path_buf(),
                detail: format!("{e:?}"),
            })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    let page_limit = max_pages.unwrap_or(total_pages).min(total_pages);
    debug!(total_pages, page_limit, "document opened");

    let mut text_parts: Vec<String> = Vec::with_capacity(page_limit);
    let mut images: BTreeMap<String, image::DynamicImage> = BTreeMap::new();

    for idx in 0..page_limit {
        let page = pages
            .get(idx as u16)
            .map_err(|e| EngineError::PageFailed {
                page: idx + 1,
                detail: format!("{e:?}"),
            })?;

        match page.text() {
            Ok(text) => text_parts.push(text.all()),
            Err(e) => {
                // Image-only pages commonly have no text stream at all.
                debug!(page = idx + 1, error = ?e, "no extractable text");
                text_parts.push(String::new());
            }
        }

        for (obj_idx, object) in page.objects().iter().enumerate() {
            if let Some(image_object) = object.as_image_object() {
                match image_object.get_raw_image() {
                    Ok(img) => {
                        images.insert(format!("page_{}_img_{}", idx, obj_idx), img);
                    }
                    Err(e) => {
                        warn!(page = idx + 1, object = obj_idx, error = ?e,
                            "skipping undecodable image object");
                    }
                }
            }
        }
    }

    let metadata = collect_metadata(&document, total_pages, page_limit, langs, force_ocr);

    Ok(EngineOutput {
        text: text_parts.join("\n\n"),
        images,
        metadata,
    })
}

/// Document tags plus conversion facts, as one open-ended map.
fn collect_metadata(
    document: &PdfDocument<'_>,
    total_pages: usize,
    pages_converted: usize,
    langs: &[String],
    force_ocr: bool,
) -> Map<String, Value> {
    let tags = document.metadata();

    let get_tag = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        tags.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    let mut metadata = Map::new();
    for (key, tag) in [
        ("title", PdfDocumentMetadataTagType::Title),
        ("author", PdfDocumentMetadataTagType::Author),
        ("subject", PdfDocumentMetadataTagType::Subject),
        ("creator", PdfDocumentMetadataTagType::Creator),
        ("producer", PdfDocumentMetadataTagType::Producer),
        ("creation_date", PdfDocumentMetadataTagType::CreationDate),
        (
            "modification_date",
            PdfDocumentMetadataTagType::ModificationDate,
        ),
    ] {
        if let Some(value) = get_tag(tag) {
            metadata.insert(key.to_string(), Value::String(value));
        }
    }

    metadata.insert("page_count".into(), json!(total_pages));
    metadata.insert("pages_converted".into(), json!(pages_converted));
    metadata.insert(
        "pdf_version".into(),
        Value::String(format!("{:?}", document.version())),
    );
    if !langs.is_empty() {
        metadata.insert("langs".into(), json!(langs));
    }
    metadata.insert("force_ocr".into(), json!(force_ocr));
    metadata.insert("ocr_performed".into(), json!(false));

    metadata
}
