//! Service configuration.

use crate::builder::DEFAULT_MAX_CONCURRENT_FETCHES;
use crate::config::ConfigFile;
use crate::fetch::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use crate::grid::{GridShape, DEFAULT_MAX_CELLS};
use std::time::Duration;

/// Settings the service needs, independent of where they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    upstream_url: String,
    timeout: Duration,
    user_agent: String,
    max_concurrent_fetches: usize,
    default_shape: GridShape,
    max_cells: usize,
}

impl ServiceConfig {
    /// Configuration with defaults for everything but the upstream.
    pub fn new(upstream_url: impl Into<String>) -> Self {
        Self {
            upstream_url: upstream_url.into(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            default_shape: GridShape::default(),
            max_cells: DEFAULT_MAX_CELLS,
        }
    }

    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self {
            upstream_url: config.upstream.url.clone(),
            timeout: config.upstream.timeout_duration(),
            user_agent: config.upstream.user_agent.clone(),
            max_concurrent_fetches: config.upstream.max_concurrent_fetches,
            default_shape: config.grid.shape(),
            max_cells: config.grid.max_cells,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit;
        self
    }

    pub fn with_default_shape(mut self, shape: GridShape) -> Self {
        self.default_shape = shape;
        self
    }

    pub fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = max_cells;
        self
    }

    pub fn upstream_url(&self) -> &str {
        &self.upstream_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_concurrent_fetches
    }

    /// Shape used when a request leaves columns or rows out.
    pub fn default_shape(&self) -> GridShape {
        self.default_shape
    }

    /// Largest `columns × rows` a request may ask for.
    pub fn max_cells(&self) -> usize {
        self.max_cells
    }
}
