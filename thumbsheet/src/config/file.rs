//! Configuration file handling for ~/.thumbsheet/config.ini.

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use super::keys::ConfigKey;
pub use super::settings::ConfigFile;

/// Environment variable that overrides `server.port`.
pub const PORT_ENV: &str = "PORT";
/// Environment variable that overrides `upstream.url`.
pub const UPSTREAM_URL_ENV: &str = "UPSTREAM_URL";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Loads from the default path (~/.thumbsheet/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Loads from `path`, returning defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Saves to the default path.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Saves to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Writes a default config file at `path` unless one exists.
    ///
    /// Returns true if a file was created.
    pub fn ensure_exists_at(path: &Path) -> Result<bool, ConfigFileError> {
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to(path)?;
        Ok(true)
    }

    /// Applies `PORT` and `UPSTREAM_URL` from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigFileError> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// Unset and empty variables are skipped.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigFileError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides = [
            (PORT_ENV, ConfigKey::ServerPort),
            (UPSTREAM_URL_ENV, ConfigKey::UpstreamUrl),
        ];

        for (variable, key) in overrides {
            let Some(value) = lookup(variable).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            key.set(self, &value)
                .map_err(|e| super::parser::invalid_value(key, &value, e))?;
            info!(variable, key = key.name(), "Configuration overridden from environment");
        }
        Ok(())
    }
}

/// The config directory (~/.thumbsheet).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".thumbsheet")
}

/// The config file (~/.thumbsheet/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
