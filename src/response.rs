//! The conversion response payload.
//!
//! Two shapes, one envelope: a successful conversion carries
//! `{markdown, images, metadata, success: true}`; a contained failure
//! carries `{success: false, error}` and nothing else. Both are returned
//! with HTTP 200 — callers branch on the `success` flag, not the status
//! line.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Wire shape of a conversion result.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ConvertResponse {
    Success {
        markdown: String,
        /// Image identifier → base64-encoded PNG.
        images: BTreeMap<String, String>,
        metadata: Map<String, Value>,
        success: bool,
    },
    Failure {
        success: bool,
        error: String,
    },
}

impl ConvertResponse {
    /// The success shape; `success` is always true.
    pub fn success(
        markdown: String,
        images: BTreeMap<String, String>,
        metadata: Map<String, Value>,
    ) -> Self {
        Self::Success {
            markdown,
            images,
            metadata,
            success: true,
        }
    }

    /// The failure shape; `success` is always false.
    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self::Failure {
            success: false,
            error: error.to_string(),
        }
    }

    /// Whether this is the success shape.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
