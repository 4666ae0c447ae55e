//! Server binary for marker-api.
//!
//! A thin shim over the library crate that maps CLI flags (with
//! `MARKER_*` environment fallbacks) to `ServerConfig`, loads the
//! conversion engine, and serves until interrupted.

use anyhow::{Context, Result};
use clap::Parser;
use marker_api::{serve, ModelRegistry, ServerConfig};
use std::net::IpAddr;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "marker-api",
    version,
    about = "HTTP API for converting PDF documents to Markdown, images, and metadata"
)]
struct Cli {
    /// Address to bind the HTTP listener to.
    #[arg(long, env = "MARKER_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to bind the HTTP listener to.
    #[arg(long, short, env = "MARKER_PORT", default_value_t = 8000)]
    port: u16,

    /// Timeout for fetching remote PDFs, in seconds.
    #[arg(long, env = "MARKER_DOWNLOAD_TIMEOUT", default_value_t = 30)]
    download_timeout: u64,

    /// Number of concurrent engine conversions.
    #[arg(long, env = "MARKER_CPU_WORKERS", default_value_t = 1)]
    cpu_workers: usize,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_filter(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .init();

    let config = ServerConfig::builder()
        .host(cli.host)
        .port(cli.port)
        .download_timeout_secs(cli.download_timeout)
        .cpu_workers(cli.cpu_workers)
        .build()
        .context("invalid server configuration")?;

    let registry = ModelRegistry::load(&config)
        .await
        .context("failed to load the conversion engine")?;

    serve(config, registry).await.context("server error")?;

    Ok(())
}
