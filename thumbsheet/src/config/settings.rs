//! Settings structs, one per `[section]` of the INI file.

use crate::grid::GridShape;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub server: ServerSettings,
    pub upstream: UpstreamSettings,
    pub grid: GridSettings,
    pub logging: LoggingSettings,
}

/// HTTP listener.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    /// Address to bind.
    pub bind: IpAddr,
    /// Port to listen on.
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

/// Upstream tile provider.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamSettings {
    /// Base URL; tile parameters are appended to its query string.
    pub url: String,
    /// Per-request timeout in seconds.
    pub timeout: u64,
    /// Upper bound on upstream requests in flight across all builds.
    pub max_concurrent_fetches: usize,
    /// User-Agent sent with every tile request.
    pub user_agent: String,
}

impl UpstreamSettings {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Grid used when a request leaves columns or rows out, and the largest
/// grid a request may ask for.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSettings {
    pub columns: u32,
    pub rows: u32,
    /// Upper bound on `columns × rows` for a single sheet.
    pub max_cells: usize,
}

impl GridSettings {
    /// The default shape, or 3x4 if the settings hold a zero.
    pub fn shape(&self) -> GridShape {
        GridShape::new(self.columns, self.rows).unwrap_or_default()
    }
}

/// Log file location.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Directory holding the log file.
    pub directory: PathBuf,
    /// Log file name.
    pub file: String,
}
