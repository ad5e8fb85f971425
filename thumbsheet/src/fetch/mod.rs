//! Tile fetching from the upstream image provider.
//!
//! The fetcher turns a [`TileRequest`](crate::grid::TileRequest) into one
//! HTTP GET against the configured upstream and validates the answer.
//! Only a direct `2xx` response with an `image/*` content type counts as a
//! tile; redirects are never followed.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │        SheetBuilder          │  (fans out one fetch per cell)
//! └──────────────────────────────┘
//!                │  TileSource
//!                ▼
//! ┌──────────────────────────────┐
//! │     UpstreamTileSource       │  URL building + response validation
//! └──────────────────────────────┘
//!                │  AsyncHttpClient
//!                ▼
//! ┌──────────────────────────────┐
//! │       ReqwestClient          │  redirects disabled, bounded timeout
//! └──────────────────────────────┘
//! ```

mod error;
mod http;
mod source;
mod upstream;

pub use error::FetchError;
pub use http::{
    AsyncHttpClient, HttpResponse, ReqwestClient, TransportError, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
pub use source::TileSource;
pub use upstream::{UpstreamTileSource, UpstreamUrlError};

#[cfg(test)]
pub use http::tests::MockHttpClient;
