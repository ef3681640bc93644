//! Segment analytics reverse proxy.
//!
//! ```text
//!   SDK ──▶ proxy ──┬─▶ cdn.segment.com   (/v1/projects, /a.js/v1, /analytics.js/v1)
//!                   └─▶ api.segment.io    (everything else)
//! ```
//!
//! Startup errors (bad flags, bad upstream URL, bind failure) are fatal.

use clap::Parser;

use segment_proxy::config::Cli;
use segment_proxy::lifecycle::{shutdown_signal, Shutdown};
use segment_proxy::net::listener;
use segment_proxy::observability::logging;
use segment_proxy::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = Cli::parse()
        .into_config()
        .inspect_err(|e| tracing::error!(error = %e, "Invalid configuration"))?;

    tracing::info!(
        port = %config.listener.port,
        cdn = %config.upstreams.cdn,
        tracking_api = %config.upstreams.tracking_api,
        rewrite_host = %config.rewrite.host,
        debug = config.debug,
        "Configuration loaded"
    );

    let server = HttpServer::new(config)
        .inspect_err(|e| tracing::error!(error = %e, "Failed to initialize proxy"))?;
    let listener = listener::bind(&server.config().listener)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to bind listener"))?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
