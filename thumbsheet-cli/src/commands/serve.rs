//! Serve command - run the sheet HTTP server.

use clap::Args;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use thumbsheet::config::ConfigKey;
use thumbsheet::server;
use thumbsheet::service::SheetService;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::override_setting;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the serve command.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to bind (overrides server.bind)
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Port to listen on (overrides server.port and PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Upstream tile endpoint (overrides upstream.url and UPSTREAM_URL)
    #[arg(long)]
    pub upstream: Option<String>,
}

/// Run the serve command.
pub async fn run(config_path: Option<&Path>, args: ServeArgs) -> Result<(), CliError> {
    let mut runner = CliRunner::new(config_path)?;
    runner.log_startup("serve");

    let config = runner.config_mut();
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(port) = args.port {
        override_setting(config, ConfigKey::ServerPort, &port.to_string())?;
    }
    if let Some(upstream) = args.upstream.as_deref() {
        override_setting(config, ConfigKey::UpstreamUrl, upstream)?;
    }

    let config = runner.config();
    let service = Arc::new(SheetService::from_config(config)?);
    let addr = config.server.socket_addr();

    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    println!("thumbsheet v{} listening on http://{}", thumbsheet::VERSION, addr);
    println!("  Latest sheet:  http://{}/sheet.png", addr);
    println!("  Regenerate:    http://{}/update_sheet?q=<query>", addr);
    println!("Press Ctrl+C to stop.");

    server::serve(Arc::clone(&service), addr, shutdown.cancelled_owned()).await?;

    service.log_stats().await;
    info!("Shutdown complete");
    Ok(())
}

/// Cancels `token` on Ctrl+C.
fn spawn_signal_handler(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
        }
        token.cancel();
    });
}
