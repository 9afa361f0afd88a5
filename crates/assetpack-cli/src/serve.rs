//! # Serve Subcommand
//!
//! Loads a directory into a bundle and serves it with the same router an
//! application would mount over its generated bundle. Useful for checking
//! headers and negotiation before embedding.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use assetpack_http::{router, router_with_metrics, ServeMetrics};

use crate::load_dir_bundle;

/// Arguments for the `assetpack serve` subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Directory to serve.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Address to bind.
    #[arg(long, env = "ASSETPACK_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, short, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// URL prefix the bundle is mounted under.
    #[arg(long, env = "ASSETPACK_PREFIX", default_value = "")]
    pub prefix: String,

    /// Regex over file base names to skip.
    #[arg(long)]
    pub ignore: Option<String>,

    /// Count requests and log the totals on shutdown.
    #[arg(long)]
    pub metrics: bool,
}

impl ServeArgs {
    fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

/// Execute the serve subcommand. Blocks until Ctrl-C.
pub fn run_serve(args: &ServeArgs) -> Result<u8> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(serve(args))?;
    Ok(0)
}

async fn serve(args: &ServeArgs) -> Result<()> {
    let bundle = load_dir_bundle(&args.dir, args.ignore.as_deref())?;
    let metrics = args.metrics.then(ServeMetrics::new);
    let app = match &metrics {
        Some(m) => router_with_metrics(bundle, &args.prefix, m.clone()),
        None => router(bundle, &args.prefix),
    };

    let addr = args.addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, prefix = %args.prefix, dir = %args.dir.display(), "serving bundle");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(m) = metrics {
        let s = m.snapshot();
        tracing::info!(
            requests = s.requests,
            not_modified = s.not_modified,
            not_found = s.not_found,
            errors = s.errors,
            "server stopped"
        );
    } else {
        tracing::info!("server stopped");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
