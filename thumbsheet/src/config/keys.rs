//! Configuration key access and validation.
//!
//! Every setting is addressable as `section.key`. Each key knows how to
//! render its value and how to parse and validate a new one, so the INI
//! loader and `thumbsheet config set` share one set of rules.

use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

use super::settings::ConfigFile;

/// Errors from getting or setting a value by key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigKeyError {
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ServerBind,
    ServerPort,

    UpstreamUrl,
    UpstreamTimeout,
    UpstreamMaxConcurrentFetches,
    UpstreamUserAgent,

    GridColumns,
    GridRows,
    GridMaxCells,

    LoggingDirectory,
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|key| key.name() == lower)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Canonical key name (e.g. "upstream.url").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::ServerBind => "server.bind",
            ConfigKey::ServerPort => "server.port",
            ConfigKey::UpstreamUrl => "upstream.url",
            ConfigKey::UpstreamTimeout => "upstream.timeout",
            ConfigKey::UpstreamMaxConcurrentFetches => "upstream.max_concurrent_fetches",
            ConfigKey::UpstreamUserAgent => "upstream.user_agent",
            ConfigKey::GridColumns => "grid.columns",
            ConfigKey::GridRows => "grid.rows",
            ConfigKey::GridMaxCells => "grid.max_cells",
            ConfigKey::LoggingDirectory => "logging.directory",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Section name (e.g. "upstream").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Key name within the section (e.g. "url").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Current value rendered as it would appear in the INI file.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ServerBind => config.server.bind.to_string(),
            ConfigKey::ServerPort => config.server.port.to_string(),
            ConfigKey::UpstreamUrl => config.upstream.url.clone(),
            ConfigKey::UpstreamTimeout => config.upstream.timeout.to_string(),
            ConfigKey::UpstreamMaxConcurrentFetches => {
                config.upstream.max_concurrent_fetches.to_string()
            }
            ConfigKey::UpstreamUserAgent => config.upstream.user_agent.clone(),
            ConfigKey::GridColumns => config.grid.columns.to_string(),
            ConfigKey::GridRows => config.grid.rows.to_string(),
            ConfigKey::GridMaxCells => config.grid.max_cells.to_string(),
            ConfigKey::LoggingDirectory => config.logging.directory.display().to_string(),
            ConfigKey::LoggingFile => config.logging.file.clone(),
        }
    }

    /// Validates `value` and stores it in `config`.
    ///
    /// Leading and trailing whitespace is ignored. On error `config` is
    /// left unchanged.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        let value = value.trim();
        match self {
            ConfigKey::ServerBind => {
                config.server.bind = self.parse::<IpAddr>(value, "must be an IP address")?;
            }
            ConfigKey::ServerPort => config.server.port = self.positive(value)?,
            ConfigKey::UpstreamUrl => config.upstream.url = self.http_url(value)?,
            ConfigKey::UpstreamTimeout => config.upstream.timeout = self.positive(value)?,
            ConfigKey::UpstreamMaxConcurrentFetches => {
                config.upstream.max_concurrent_fetches = self.positive(value)?;
            }
            ConfigKey::UpstreamUserAgent => config.upstream.user_agent = self.non_empty(value)?,
            ConfigKey::GridColumns => config.grid.columns = self.positive(value)?,
            ConfigKey::GridRows => config.grid.rows = self.positive(value)?,
            ConfigKey::GridMaxCells => config.grid.max_cells = self.positive(value)?,
            ConfigKey::LoggingDirectory => {
                config.logging.directory = expand_tilde(&self.non_empty(value)?);
            }
            ConfigKey::LoggingFile => config.logging.file = self.non_empty(value)?,
        }
        Ok(())
    }

    /// Checks `value` without storing it.
    pub fn validate(&self, value: &str) -> Result<(), ConfigKeyError> {
        self.set(&mut ConfigFile::default(), value)
    }

    /// All keys, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ServerBind,
            ConfigKey::ServerPort,
            ConfigKey::UpstreamUrl,
            ConfigKey::UpstreamTimeout,
            ConfigKey::UpstreamMaxConcurrentFetches,
            ConfigKey::UpstreamUserAgent,
            ConfigKey::GridColumns,
            ConfigKey::GridRows,
            ConfigKey::GridMaxCells,
            ConfigKey::LoggingDirectory,
            ConfigKey::LoggingFile,
        ]
    }

    fn invalid(&self, reason: &str) -> ConfigKeyError {
        ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse<T: FromStr>(&self, value: &str, reason: &str) -> Result<T, ConfigKeyError> {
        value.parse().map_err(|_| self.invalid(reason))
    }

    fn positive<T>(&self, value: &str) -> Result<T, ConfigKeyError>
    where
        T: FromStr + Default + PartialOrd,
    {
        let reason = "must be a positive integer";
        let parsed: T = self.parse(value, reason)?;
        if parsed > T::default() {
            Ok(parsed)
        } else {
            Err(self.invalid(reason))
        }
    }

    fn non_empty(&self, value: &str) -> Result<String, ConfigKeyError> {
        if value.is_empty() {
            Err(self.invalid("must not be empty"))
        } else {
            Ok(value.to_string())
        }
    }

    fn http_url(&self, value: &str) -> Result<String, ConfigKeyError> {
        let reason = "must be a URL starting with 'http://' or 'https://'";
        let url: Url = self.parse(value, reason)?;
        match url.scheme() {
            "http" | "https" => Ok(value.to_string()),
            _ => Err(self.invalid(reason)),
        }
    }
}

/// Expands a leading `~/` to the home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_config_key_parsing() {
        assert_eq!(
            "upstream.url".parse::<ConfigKey>().unwrap(),
            ConfigKey::UpstreamUrl
        );
        assert_eq!(
            "GRID.COLUMNS".parse::<ConfigKey>().unwrap(),
            ConfigKey::GridColumns
        );
        assert_eq!(
            "grid.depth".parse::<ConfigKey>(),
            Err(ConfigKeyError::UnknownKey("grid.depth".to_string()))
        );
    }

    #[test]
    fn test_key_name_parts() {
        let key = ConfigKey::UpstreamMaxConcurrentFetches;
        assert_eq!(key.section(), "upstream");
        assert_eq!(key.key_name(), "max_concurrent_fetches");
    }

    #[test]
    fn test_names_round_trip() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
    }

    #[test]
    fn test_get_defaults() {
        let config = ConfigFile::default();
        assert_eq!(ConfigKey::ServerPort.get(&config), "8000");
        assert_eq!(ConfigKey::ServerBind.get(&config), "0.0.0.0");
        assert_eq!(ConfigKey::GridRows.get(&config), "4");
        assert_eq!(ConfigKey::GridMaxCells.get(&config), "400");
        assert_eq!(ConfigKey::LoggingFile.get(&config), "thumbsheet.log");
    }

    #[test]
    fn test_set_values() {
        let mut config = ConfigFile::default();

        ConfigKey::ServerBind.set(&mut config, "127.0.0.1").unwrap();
        ConfigKey::ServerPort.set(&mut config, " 9000 ").unwrap();
        ConfigKey::UpstreamUrl
            .set(&mut config, "https://thumbs.example.com/grid")
            .unwrap();
        ConfigKey::GridColumns.set(&mut config, "5").unwrap();

        assert_eq!(config.server.bind, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.upstream.url, "https://thumbs.example.com/grid");
        assert_eq!(config.grid.columns, 5);
    }

    #[test]
    fn test_rejects_non_positive_numbers() {
        for key in [
            ConfigKey::ServerPort,
            ConfigKey::UpstreamTimeout,
            ConfigKey::UpstreamMaxConcurrentFetches,
            ConfigKey::GridColumns,
            ConfigKey::GridRows,
            ConfigKey::GridMaxCells,
        ] {
            assert!(key.validate("0").is_err(), "{} accepted 0", key.name());
            assert!(key.validate("-3").is_err(), "{} accepted -3", key.name());
            assert!(key.validate("many").is_err(), "{} accepted text", key.name());
        }
    }

    #[test]
    fn test_rejects_out_of_range_port() {
        assert!(ConfigKey::ServerPort.validate("70000").is_err());
    }

    #[test]
    fn test_validate_upstream_url() {
        assert!(ConfigKey::UpstreamUrl.validate("http://localhost:8080/x").is_ok());
        assert!(ConfigKey::UpstreamUrl.validate("ftp://example.com").is_err());
        assert!(ConfigKey::UpstreamUrl.validate("example.com").is_err());
    }

    #[test]
    fn test_failed_set_leaves_config_unchanged() {
        let mut config = ConfigFile::default();
        let err = ConfigKey::GridRows.set(&mut config, "zero").unwrap_err();

        assert_eq!(
            err,
            ConfigKeyError::ValidationFailed {
                key: "grid.rows".to_string(),
                reason: "must be a positive integer".to_string(),
            }
        );
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_empty_strings_rejected() {
        assert!(ConfigKey::UpstreamUserAgent.validate("  ").is_err());
        assert!(ConfigKey::LoggingFile.validate("").is_err());
    }
}
