//! Build command - fetch and compose one sheet, then write it to disk.

use clap::Args;
use std::path::{Path, PathBuf};
use thumbsheet::config::ConfigKey;
use thumbsheet::service::{RequestError, SheetService};
use tracing::info;

use super::override_setting;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the build command.
#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Search term sent to the upstream
    #[arg(long, short)]
    pub query: String,

    /// Grid columns (default from grid.columns)
    #[arg(long)]
    pub cols: Option<u32>,

    /// Grid rows (default from grid.rows)
    #[arg(long)]
    pub rows: Option<u32>,

    /// Result page
    #[arg(long, default_value_t = 0)]
    pub page: u32,

    /// Upstream tile endpoint (overrides upstream.url and UPSTREAM_URL)
    #[arg(long)]
    pub upstream: Option<String>,

    /// Where to write the PNG
    #[arg(long, short)]
    pub output: PathBuf,
}

/// Run the build command.
pub async fn run(config_path: Option<&Path>, args: BuildArgs) -> Result<(), CliError> {
    let mut runner = CliRunner::new(config_path)?;
    runner.log_startup("build");

    if let Some(upstream) = args.upstream.as_deref() {
        override_setting(runner.config_mut(), ConfigKey::UpstreamUrl, upstream)?;
    }

    let service = SheetService::from_config(runner.config())?;
    let cols = args.cols.map(|c| c.to_string());
    let rows = args.rows.map(|r| r.to_string());
    let page = args.page.to_string();

    let request = service
        .sheet_request(&args.query, cols.as_deref(), rows.as_deref(), Some(&page))
        .map_err(|e| match e {
            RequestError::MissingQuery => CliError::Config("--query must not be empty".to_string()),
            RequestError::GridTooLarge { .. } => CliError::Config(format!(
                "{} (raise it with 'thumbsheet config set grid.max_cells <N>')",
                e
            )),
        })?;

    println!(
        "Building {} sheet for '{}' (page {})...",
        request.shape(),
        request.query(),
        request.page()
    );

    let artifact = service.regenerate(request).await?;

    std::fs::write(&args.output, artifact.png()).map_err(|error| CliError::FileWrite {
        path: args.output.clone(),
        error,
    })?;

    let size_kb = artifact.len() as f64 / 1024.0;
    info!(path = %args.output.display(), bytes = artifact.len(), "Sheet written");
    println!("✓ Saved {} ({:.1} KB)", args.output.display(), size_kb);

    Ok(())
}
