//! Conversion orchestration: resolve the source, invoke the engine,
//! encode the result.
//!
//! This is the sole containment point for pipeline failures: both entry
//! points return `Err(ConvertError)` for anything that goes wrong after
//! validation, and the HTTP handler turns that into the
//! `{success: false}` payload. Errors never propagate past the handler
//! as a transport-level failure, and nothing here retries.

use crate::engine::{EngineOutput, EngineRequest};
use crate::error::ConvertError;
use crate::pipeline::{encode, fetch};
use crate::request::EngineParams;
use crate::response::ConvertResponse;
use crate::server::AppState;
use std::path::Path;
use tracing::info;

/// Convert a PDF already on local disk.
pub async fn convert_local(
    state: &AppState,
    path: &Path,
    params: &EngineParams,
) -> Result<ConvertResponse, ConvertError> {
    info!(
        path = %path.display(),
        max_pages = ?params.max_pages,
        langs = ?params.langs,
        force_ocr = params.force_ocr,
        "converting local PDF"
    );

    if !path.exists() {
        return Err(ConvertError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let output: EngineOutput = state
        .registry
        .engine()
        .convert(EngineRequest {
            path,
            max_pages: params.max_pages,
            langs: params.langs.clone(),
            force_ocr: params.force_ocr,
        })
        .await?;

    let images = encode::encode_images(&output.images)?;

    Ok(ConvertResponse::success(
        output.text,
        images,
        output.metadata,
    ))
}

/// Download a remote PDF, then convert it via the local path.
///
/// The engine only ever sees the temp path the fetch created, never the
/// URL. The temp file is removed when `fetched` drops — whether the
/// conversion succeeded or not.
pub async fn convert_remote(
    state: &AppState,
    url: &str,
    params: &EngineParams,
) -> Result<ConvertResponse, ConvertError> {
    info!(url, "converting remote PDF");

    let fetched = fetch::fetch_remote(
        &state.client,
        url,
        state.config.download_timeout_secs,
    )
    .await?;

    convert_local(state, fetched.path(), params).await
}
