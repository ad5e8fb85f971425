//! thumbsheet - composite thumbnail sheets from an upstream tile provider
//!
//! A sheet is a grid of tile images fetched concurrently from an upstream
//! HTTP endpoint and composited into one transparent PNG. The most recent
//! successful sheet is kept in memory and served from a fixed URL.
//!
//! # High-Level API
//!
//! ```ignore
//! use std::sync::Arc;
//! use thumbsheet::config::ConfigFile;
//! use thumbsheet::service::SheetService;
//!
//! let config = ConfigFile::load()?;
//! let service = Arc::new(SheetService::from_config(&config)?);
//! thumbsheet::server::serve(service, config.server.socket_addr(), shutdown).await?;
//! ```

pub mod builder;
pub mod cache;
pub mod coalesce;
pub mod compose;
pub mod config;
pub mod fetch;
pub mod grid;
pub mod logging;
pub mod placeholder;
pub mod server;
pub mod service;
pub mod time;

/// Version of the thumbsheet library and CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
