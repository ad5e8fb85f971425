//! CLI runner for common setup.
//!
//! Loads configuration (file, then environment, then flags) and starts
//! logging so command handlers don't repeat it.

use crate::error::CliError;
use std::path::{Path, PathBuf};
use thumbsheet::config::{config_file_path, ConfigFile};
use thumbsheet::logging::{init_logging, LoggingGuard};
use tracing::info;

/// Owns the loaded configuration and keeps logging alive.
pub struct CliRunner {
    logging_guard: LoggingGuard,
    config: ConfigFile,
    config_path: PathBuf,
}

impl CliRunner {
    /// Loads `config_path` (or the default path), applies environment
    /// overrides and initializes logging.
    pub fn new(config_path: Option<&Path>) -> Result<Self, CliError> {
        let config_path = resolve_config_path(config_path);
        let mut config = ConfigFile::load_from(&config_path)?;
        config.apply_env_overrides()?;

        let logging_guard = init_logging(&config.logging.directory, &config.logging.file)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            config_path,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Mutable access for command-line overrides.
    pub fn config_mut(&mut self) -> &mut ConfigFile {
        &mut self.config
    }

    /// Logs version and the command being run.
    pub fn log_startup(&self, command: &str) {
        info!(version = thumbsheet::VERSION, command, "thumbsheet starting");
        info!(
            config = %self.config_path.display(),
            log = %self.logging_guard.path().display(),
            "Configuration loaded"
        );
    }
}

/// The explicit path if given, otherwise ~/.thumbsheet/config.ini.
pub fn resolve_config_path(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path)
}
