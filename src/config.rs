//! Server configuration.
//!
//! All runtime behaviour is controlled through [`ServerConfig`], built via
//! its [`ServerConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share across handlers, serialise for logging, and diff two
//! deployments to understand why they behave differently.

use crate::error::ServerError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Configuration for the marker-api server.
///
/// Built via [`ServerConfig::builder()`] or [`ServerConfig::default()`].
///
/// # Example
/// ```rust
/// use marker_api::ServerConfig;
///
/// let config = ServerConfig::builder()
///     .port(8000)
///     .download_timeout_secs(30)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to. Default: 127.0.0.1.
    pub host: IpAddr,

    /// Port the HTTP listener binds to. Default: 8000.
    pub port: u16,

    /// Timeout for fetching a remote PDF, in seconds. Default: 30.
    ///
    /// Covers connection establishment and the full body read. The
    /// conversion call itself has no timeout; a slow document blocks its
    /// own request only.
    pub download_timeout_secs: u64,

    /// Number of conversions the engine runs at once. Default: 1.
    ///
    /// The engine is CPU-bound and runs on the blocking thread pool;
    /// this bounds how many documents are converted concurrently rather
    /// than letting a burst of requests saturate every core. Matches the
    /// `MARKER_CPU_WORKERS` environment hint.
    pub cpu_workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8000,
            download_timeout_secs: 30,
            cpu_workers: 1,
        }
    }
}

impl ServerConfig {
    /// Create a new builder for `ServerConfig`.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder {
            config: Self::default(),
        }
    }

    /// The socket address the listener binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Download timeout as a [`Duration`].
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    /// True when the listener accepts connections from any interface.
    pub fn binds_to_all_interfaces(&self) -> bool {
        self.host.is_unspecified()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn host(mut self, host: IpAddr) -> Self {
        self.config.host = host;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn cpu_workers(mut self, n: usize) -> Self {
        self.config.cpu_workers = n.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServerConfig, ServerError> {
        let c = &self.config;
        if c.download_timeout_secs == 0 {
            return Err(ServerError::InvalidConfig(
                "download timeout must be at least 1 second".into(),
            ));
        }
        if c.cpu_workers == 0 {
            return Err(ServerError::InvalidConfig(
                "cpu_workers must be at least 1".into(),
            ));
        }
        Ok(self.config)
    }
}
