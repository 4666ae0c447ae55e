//! The conversion request: deserialisation, validation, normalisation.
//!
//! A [`ConvertRequest`] is the raw wire shape of `POST /marker`.
//! [`ConvertRequest::validate`] turns it into the pair the pipeline
//! actually works with: a tagged [`Source`] (decided once, here — the
//! rest of the crate never re-inspects which optional field was set) and
//! normalised [`EngineParams`]. Validation is pure; nothing is fetched,
//! opened, or created.

use crate::error::ValidationError;
use serde::Deserialize;
use std::path::PathBuf;

/// Wire shape of a conversion request.
///
/// All fields are optional except that one of `filepath` / `url` must be
/// present. `extract_images` defaults to true; the boolean flags default
/// to false.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertRequest {
    /// URL of the PDF to convert.
    #[serde(default)]
    pub url: Option<String>,

    /// Local path of the PDF to convert.
    #[serde(default)]
    pub filepath: Option<String>,

    /// Maximum number of pages to convert, from the document start.
    #[serde(default)]
    pub max_pages: Option<usize>,

    /// OCR language hints, comma separated (e.g. `"en,fr"`). Absent
    /// means engine auto-detect.
    #[serde(default)]
    pub langs: Option<String>,

    /// Force OCR on all pages, even those with embedded text.
    #[serde(default)]
    pub force_ocr: bool,

    /// Separate output pages with a page marker. Not supported by this
    /// deployment; requests setting it are rejected.
    #[serde(default)]
    pub paginate: bool,

    /// Extract embedded images. This deployment requires it to stay
    /// enabled; requests disabling it are rejected.
    #[serde(default = "default_true")]
    pub extract_images: bool,
}

fn default_true() -> bool {
    true
}

/// Where the PDF comes from, decided exactly once at validation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A file already on this machine.
    Local(PathBuf),
    /// A file to download first.
    Remote(String),
}

/// Normalised parameters forwarded to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineParams {
    pub max_pages: Option<usize>,
    pub langs: Vec<String>,
    pub force_ocr: bool,
}

impl ConvertRequest {
    /// Validate the request and split it into source and engine
    /// parameters.
    ///
    /// When both `filepath` and `url` are set, `filepath` wins — a local
    /// file needs no download, and exactly one source must drive the
    /// pipeline.
    pub fn validate(&self) -> Result<(Source, EngineParams), ValidationError> {
        if !self.extract_images || self.paginate {
            return Err(ValidationError::UnsupportedOptions);
        }

        if self.max_pages == Some(0) {
            return Err(ValidationError::ZeroMaxPages);
        }

        let source = if let Some(path) = self.filepath.as_deref().filter(|p| !p.is_empty()) {
            Source::Local(PathBuf::from(path))
        } else if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            Source::Remote(url.to_string())
        } else {
            return Err(ValidationError::NoSource);
        };

        Ok((
            source,
            EngineParams {
                max_pages: self.max_pages,
                langs: split_langs(self.langs.as_deref()),
                force_ocr: self.force_ocr,
            },
        ))
    }
}

/// Split a comma-separated language string into an ordered list.
///
/// Items are trimmed; empty items are dropped. `None` and `""` both mean
/// "no hints".
fn split_langs(langs: Option<&str>) -> Vec<String> {
    langs
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
