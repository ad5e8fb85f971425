//! Service error types.

use crate::compose::ComposeError;
use crate::fetch::{TransportError, UpstreamUrlError};
use std::fmt;
use thiserror::Error;

/// Why `/update_sheet` parameters were refused before any fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The query is empty after trimming.
    #[error("query must not be empty")]
    MissingQuery,

    /// The grid has more cells than the service allows.
    #[error("grid {columns}x{rows} exceeds the limit of {max_cells} cells")]
    GridTooLarge {
        columns: u32,
        rows: u32,
        max_cells: usize,
    },
}

impl RequestError {
    /// Machine-readable code used in error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingQuery => "missing_query",
            Self::GridTooLarge { .. } => "grid_too_large",
        }
    }
}

/// Errors constructing a [`SheetService`](super::SheetService).
#[derive(Debug)]
pub enum ServiceError {
    /// Failed to create the HTTP client
    HttpClient(TransportError),
    /// The upstream URL is unusable
    Upstream(UpstreamUrlError),
    /// Failed to render the placeholder image
    Placeholder(ComposeError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpClient(e) => write!(f, "HTTP client error: {}", e),
            Self::Upstream(e) => write!(f, "Upstream error: {}", e),
            Self::Placeholder(e) => write!(f, "Placeholder error: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::HttpClient(e) => Some(e),
            Self::Upstream(e) => Some(e),
            Self::Placeholder(e) => Some(e),
        }
    }
}

impl From<TransportError> for ServiceError {
    fn from(e: TransportError) -> Self {
        Self::HttpClient(e)
    }
}

impl From<UpstreamUrlError> for ServiceError {
    fn from(e: UpstreamUrlError) -> Self {
        Self::Upstream(e)
    }
}

impl From<ComposeError> for ServiceError {
    fn from(e: ComposeError) -> Self {
        Self::Placeholder(e)
    }
}
