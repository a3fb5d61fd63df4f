//! Aura Server
//!
//! `aura-server serve` runs the chat API; `aura-server train` fits and
//! saves a distress model.

use anyhow::Result;
use aura_server::cli::{self, Cli, Command, ServeArgs};
use aura_server::{create_router, telemetry, AppContext, ServerConfig};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    telemetry::init_tracing(cli.verbose, cli.log_json);

    match &cli.command {
        Command::Serve(args) => serve_blocking(args),
        Command::Train(args) => cli::run_train(args).map(|_| ()),
    }
}

/// Build the runtime with the configured worker count and serve
fn serve_blocking(args: &ServeArgs) -> Result<()> {
    let config = args.resolve_config()?;
    info!("Configuration loaded successfully");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers.max(1))
        .enable_all()
        .build()?;
    runtime.block_on(serve(config))
}

async fn serve(config: ServerConfig) -> Result<()> {
    info!("Starting Aura server");

    let metrics_handle = telemetry::init_metrics()?;

    info!("Initializing application context...");
    let addr: SocketAddr = config.socket_addr().parse()?;
    let context = AppContext::build(config).await?.with_metrics(metrics_handle);
    let app = create_router(Arc::new(context));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Aura listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    warn!("Shutdown signal received, stopping server...");
}
