//! Remote fetch: materialise a URL-hosted PDF as a local file.
//!
//! ## Why download to a temp file?
//!
//! The engine requires a file-system path — it cannot stream from a byte
//! buffer. The body is streamed to disk chunk by chunk so a large
//! document never has to fit in memory, and the [`FetchedFile`] guard
//! deletes the file when it drops — on the success path, on a failed
//! conversion, and on panic alike. We validate the PDF magic bytes
//! (`%PDF`) from the first chunk so callers get a meaningful error
//! rather than an engine failure on an HTML error page.

use crate::error::ConvertError;
use futures::StreamExt;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// A downloaded PDF on local disk.
///
/// Owns the temporary file; dropping the guard removes it. Keep it alive
/// until conversion has finished with the path.
pub struct FetchedFile {
    file: NamedTempFile,
}

impl FetchedFile {
    /// Path the engine should open.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Download `url` to a uniquely named temporary file.
///
/// The shared client carries the configured timeout, which spans
/// connection establishment and the full body read. Non-2xx responses
/// and mid-body failures both abort the fetch.
pub async fn fetch_remote(
    client: &reqwest::Client,
    url: &str,
    timeout_secs: u64,
) -> Result<FetchedFile, ConvertError> {
    info!(url, "downloading PDF");

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            ConvertError::FetchTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            ConvertError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(ConvertError::Fetch {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let file = tempfile::Builder::new()
        .prefix("marker-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| ConvertError::TempFile { source: e })?;

    let mut out = tokio::fs::File::create(file.path())
        .await
        .map_err(|e| ConvertError::TempFile { source: e })?;

    let mut stream = response.bytes_stream();
    let mut magic: Vec<u8> = Vec::with_capacity(4);
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            if e.is_timeout() {
                ConvertError::FetchTimeout {
                    url: url.to_string(),
                    secs: timeout_secs,
                }
            } else {
                ConvertError::Fetch {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        if magic.len() < 4 {
            magic.extend_from_slice(&chunk[..chunk.len().min(4 - magic.len())]);
        }

        out.write_all(&chunk)
            .await
            .map_err(|e| ConvertError::TempFile { source: e })?;
        written += chunk.len() as u64;
    }

    out.flush()
        .await
        .map_err(|e| ConvertError::TempFile { source: e })?;

    if magic.len() >= 4 && &magic[..4] != b"%PDF" {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&magic[..4]);
        return Err(ConvertError::NotAPdf {
            path: file.path().to_path_buf(),
            magic: bytes,
        });
    }

    debug!(url, bytes = written, path = %file.path().display(), "download complete");

    Ok(FetchedFile { file })
}
