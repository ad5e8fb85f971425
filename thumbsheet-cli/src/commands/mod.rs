//! CLI command implementations.
//!
//! - [`serve`] - run the HTTP server
//! - [`build`] - build one sheet and write it to disk
//! - [`config`] - configuration management (init, get, set, list, path, show)

pub mod build;
pub mod config;
pub mod serve;

use crate::error::CliError;
use thumbsheet::config::{ConfigFile, ConfigKey};

/// Applies a command-line override through the same validation as the file.
fn override_setting(config: &mut ConfigFile, key: ConfigKey, value: &str) -> Result<(), CliError> {
    key.set(config, value)
        .map_err(|e| CliError::Config(format!("--{}: {}", key.key_name(), e)))
}
