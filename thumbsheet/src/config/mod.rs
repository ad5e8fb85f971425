//! Configuration for thumbsheet.
//!
//! Settings live in an INI file at `~/.thumbsheet/config.ini`. Missing keys
//! fall back to the defaults in [`defaults`], a small set of environment
//! variables can override the file, and individual keys can be read or
//! written by name through [`ConfigKey`].
//!
//! # Example
//!
//! ```
//! use thumbsheet::config::{ConfigFile, ConfigKey};
//!
//! let mut config = ConfigFile::default();
//! let key: ConfigKey = "grid.columns".parse().unwrap();
//! key.set(&mut config, "5").unwrap();
//! assert_eq!(config.grid.columns, 5);
//! ```

pub mod defaults;
mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFile, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{GridSettings, LoggingSettings, ServerSettings, UpstreamSettings};
