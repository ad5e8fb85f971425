//! Default values for every setting.

use super::settings::*;
use crate::fetch::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use crate::grid::{DEFAULT_COLUMNS, DEFAULT_MAX_CELLS, DEFAULT_ROWS};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

pub const DEFAULT_BIND: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_UPSTREAM_URL: &str = "http://127.0.0.1:8080/search_grid_thumb";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = DEFAULT_TIMEOUT.as_secs();
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = crate::builder::DEFAULT_MAX_CONCURRENT_FETCHES;
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";
pub const DEFAULT_LOG_FILE: &str = "thumbsheet.log";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                bind: DEFAULT_BIND,
                port: DEFAULT_PORT,
            },
            upstream: UpstreamSettings {
                url: DEFAULT_UPSTREAM_URL.to_string(),
                timeout: DEFAULT_UPSTREAM_TIMEOUT_SECS,
                max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
            grid: GridSettings {
                columns: DEFAULT_COLUMNS,
                rows: DEFAULT_ROWS,
                max_cells: DEFAULT_MAX_CELLS,
            },
            logging: LoggingSettings {
                directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
                file: DEFAULT_LOG_FILE.to_string(),
            },
        }
    }
}
