//! The sheet service.

use super::{RequestError, ServiceConfig, ServiceError};
use crate::builder::{BuildError, SheetBuilder};
use crate::cache::{SheetArtifact, SheetCache};
use crate::coalesce::{BuildCoalescer, BuildOutcome, CoalescerStats, Registration};
use crate::config::ConfigFile;
use crate::fetch::{ReqwestClient, TileSource, UpstreamTileSource};
use crate::grid::{GridShape, SheetRequest};
use crate::placeholder;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{info, warn};

/// Service backed by the real upstream over HTTP.
pub type UpstreamSheetService = SheetService<UpstreamTileSource<ReqwestClient>>;

/// Regenerates sheets on request and hands out the latest one.
///
/// Owns the cache; there is no global state. Share it behind an `Arc`.
pub struct SheetService<S> {
    builder: Arc<SheetBuilder<S>>,
    coalescer: Arc<BuildCoalescer>,
    cache: Arc<SheetCache>,
    placeholder: Bytes,
    default_shape: GridShape,
    max_cells: usize,
}

impl UpstreamSheetService {
    /// Builds a service that fetches tiles from `config`'s upstream URL.
    pub fn from_service_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let client = ReqwestClient::with_options(config.timeout(), config.user_agent())?;
        let source = UpstreamTileSource::new(client, config.upstream_url())?;

        info!(
            upstream = %source.base_url(),
            timeout_secs = config.timeout().as_secs(),
            max_concurrent_fetches = config.max_concurrent_fetches(),
            default_shape = %config.default_shape(),
            max_cells = config.max_cells(),
            "Sheet service configured"
        );
        Self::new(source, config)
    }

    /// Builds a service from the loaded configuration file.
    pub fn from_config(config: &ConfigFile) -> Result<Self, ServiceError> {
        Self::from_service_config(&ServiceConfig::from_config_file(config))
    }
}

impl<S> SheetService<S>
where
    S: TileSource + 'static,
{
    /// Creates a service around any tile source.
    pub fn new(source: S, config: &ServiceConfig) -> Result<Self, ServiceError> {
        let cache = Arc::new(SheetCache::new());
        let builder = SheetBuilder::new(
            source,
            Arc::clone(&cache),
            config.max_concurrent_fetches(),
        );

        Ok(Self {
            builder: Arc::new(builder),
            coalescer: Arc::new(BuildCoalescer::new()),
            cache,
            placeholder: placeholder::transparent_pixel()?,
            default_shape: config.default_shape(),
            max_cells: config.max_cells(),
        })
    }

    /// Turns raw request parameters into a [`SheetRequest`].
    ///
    /// Columns and rows that are missing, unparseable or not positive fall
    /// back to the configured default shape; a page that is not a
    /// non-negative integer becomes 0. Nothing is fetched for a rejected
    /// request.
    ///
    /// # Errors
    ///
    /// [`RequestError::MissingQuery`] when the query is empty after
    /// trimming, [`RequestError::GridTooLarge`] when the resolved shape has
    /// more cells than the configured maximum.
    pub fn sheet_request(
        &self,
        query: &str,
        columns: Option<&str>,
        rows: Option<&str>,
        page: Option<&str>,
    ) -> Result<SheetRequest, RequestError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RequestError::MissingQuery);
        }

        let shape = GridShape::from_params(columns, rows, self.default_shape);
        // Widened so the product cannot wrap on 32-bit targets
        let cells = u64::from(shape.columns()) * u64::from(shape.rows());
        if cells > self.max_cells as u64 {
            return Err(RequestError::GridTooLarge {
                columns: shape.columns(),
                rows: shape.rows(),
                max_cells: self.max_cells,
            });
        }

        let page = page
            .and_then(|p| p.trim().parse::<u32>().ok())
            .unwrap_or(0);
        Ok(SheetRequest::new(query, shape, page))
    }

    /// Builds and publishes a sheet for `request`.
    ///
    /// Identical requests already in flight are joined rather than
    /// repeated. The build runs on its own task, so it completes (and
    /// publishes on success) even if the caller stops waiting.
    pub async fn regenerate(&self, request: SheetRequest) -> BuildOutcome {
        let registration = self.coalescer.register(&request).await;
        let started = registration.is_leader();
        let mut outcome = registration.into_receiver();

        if started {
            self.spawn_build(request);
        }

        outcome.recv().await.map_err(|e| {
            warn!(error = %e, "Build finished without delivering an outcome");
            BuildError::Interrupted(e.to_string())
        })?
    }

    fn spawn_build(&self, request: SheetRequest) {
        let builder = Arc::clone(&self.builder);
        let coalescer = Arc::clone(&self.coalescer);

        tokio::spawn(async move {
            let build = {
                let request = request.clone();
                tokio::spawn(async move { builder.build(&request).await })
            };
            let outcome = match build.await {
                Ok(outcome) => outcome,
                Err(join_error) => Err(BuildError::Interrupted(join_error.to_string())),
            };
            coalescer.complete(&request, outcome).await;
        });
    }

    /// The latest published sheet, if any.
    pub fn latest(&self) -> Option<Arc<SheetArtifact>> {
        self.cache.latest()
    }

    /// 1×1 transparent PNG served before the first build.
    pub fn placeholder(&self) -> Bytes {
        self.placeholder.clone()
    }

    pub fn default_shape(&self) -> GridShape {
        self.default_shape
    }

    pub fn max_cells(&self) -> usize {
        self.max_cells
    }

    pub fn cache(&self) -> &Arc<SheetCache> {
        &self.cache
    }

    pub async fn coalescer_stats(&self) -> CoalescerStats {
        self.coalescer.stats().await
    }

    pub async fn log_stats(&self) {
        self.coalescer.log_stats().await;
    }
}
