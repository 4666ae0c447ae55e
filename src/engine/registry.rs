//! Process-wide holder of the loaded conversion engine.
//!
//! The registry is constructed exactly once, before the listener binds,
//! and injected into handlers through the application state — there is no
//! global. After construction it is read-only, so requests share it
//! without locking; dropping it at shutdown releases the engine.

use super::{ConversionEngine, PdfiumEngine};
use crate::config::ServerConfig;
use crate::error::ServerError;
use std::sync::Arc;
use tracing::info;

/// Owns the loaded engine for the lifetime of the process.
#[derive(Clone)]
pub struct ModelRegistry {
    engine: Arc<dyn ConversionEngine>,
}

impl ModelRegistry {
    /// Load the default pdfium-backed engine.
    ///
    /// Must complete before the service accepts traffic; a load failure
    /// is fatal to startup.
    pub async fn load(config: &ServerConfig) -> Result<Self, ServerError> {
        let engine = PdfiumEngine::load(config).await?;
        info!("model registry initialised");
        Ok(Self {
            engine: Arc::new(engine),
        })
    }

    /// Wrap an already-constructed engine. Used by tests to substitute a
    /// mock behind the same seam.
    pub fn with_engine(engine: Arc<dyn ConversionEngine>) -> Self {
        Self { engine }
    }

    /// The shared engine handle.
    pub fn engine(&self) -> &Arc<dyn ConversionEngine> {
        &self.engine
    }

    /// Whether models are available. A constructed registry always holds
    /// a loaded engine; this exists for the health endpoint's report.
    pub fn is_loaded(&self) -> bool {
        true
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("engine", &"<dyn ConversionEngine>")
            .finish()
    }
}
