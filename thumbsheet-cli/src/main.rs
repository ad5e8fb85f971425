//! thumbsheet CLI
//!
//! Runs the sheet HTTP server, builds one-off sheets and manages the
//! configuration file.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::build::BuildArgs;
use commands::config::ConfigCommands;
use commands::serve::ServeArgs;

#[derive(Debug, Parser)]
#[command(name = "thumbsheet", version)]
#[command(about = "Composite thumbnail sheets from an upstream tile provider", long_about = None)]
struct Cli {
    /// Config file (default: ~/.thumbsheet/config.ini)
    #[arg(long = "config", global = true, value_name = "FILE")]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Build one sheet and write it to a file
    Build(BuildArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config_path = cli.config_file.as_deref();

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::run(config_path, args).await,
        Commands::Build(args) => commands::build::run(config_path, args).await,
        Commands::Config(command) => commands::config::run(config_path, command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
