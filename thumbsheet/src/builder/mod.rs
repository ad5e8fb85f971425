//! Sheet builder: fan out tile fetches, compose, publish.
//!
//! # Flow
//!
//! ```text
//! SheetRequest ──► JoinSet ─┬─ fetch tile 0 ─┐
//!                           ├─ fetch tile 1 ─┤   all ok    spawn_blocking
//!                           ├─    ...        ├──────────► compose_sheet ──► cache.replace
//!                           └─ fetch tile N ─┘
//!                                  │ first error
//!                                  ▼
//!                           abort_all, return Err (cache untouched)
//! ```
//!
//! Fetches from every build share one semaphore, which caps the number of
//! upstream requests in flight across the whole process.

mod error;

pub use error::BuildError;

use crate::cache::{SheetArtifact, SheetCache};
use crate::compose::compose_sheet;
use crate::fetch::{FetchError, TileSource};
use crate::grid::SheetRequest;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

/// Default cap on simultaneous upstream requests.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 16;

/// Builds sheets from a [`TileSource`] and publishes them to a [`SheetCache`].
pub struct SheetBuilder<S> {
    source: Arc<S>,
    cache: Arc<SheetCache>,
    fetch_limit: Arc<Semaphore>,
}

impl<S> SheetBuilder<S>
where
    S: TileSource + 'static,
{
    /// Creates a builder.
    ///
    /// `max_concurrent_fetches` is clamped to at least 1.
    pub fn new(source: S, cache: Arc<SheetCache>, max_concurrent_fetches: usize) -> Self {
        Self {
            source: Arc::new(source),
            cache,
            fetch_limit: Arc::new(Semaphore::new(max_concurrent_fetches.max(1))),
        }
    }

    /// The cache this builder publishes to.
    pub fn cache(&self) -> &Arc<SheetCache> {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches every tile of `request`, composes them and publishes the sheet.
    ///
    /// On success the returned artifact is already the cache's latest. On
    /// error nothing is published and the cache keeps its previous content.
    #[instrument(
        name = "build_sheet",
        skip(self, request),
        fields(query = %request.query(), shape = %request.shape(), page = request.page())
    )]
    pub async fn build(&self, request: &SheetRequest) -> Result<Arc<SheetArtifact>, BuildError> {
        let started = Instant::now();
        let shape = request.shape();

        let tiles = self.fetch_tiles(request).await?;
        let fetched_bytes: usize = tiles.iter().map(Vec::len).sum();
        debug!(
            tiles = tiles.len(),
            bytes = fetched_bytes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "All tiles fetched"
        );

        let composed = tokio::task::spawn_blocking(move || compose_sheet(&tiles, shape))
            .await
            .map_err(|e| BuildError::Interrupted(e.to_string()))?
            .inspect_err(|e| warn!(error = %e, "Sheet composition failed"))?;

        let artifact = self.cache.replace(SheetArtifact::new(
            composed.png,
            request.query(),
            shape,
            Utc::now(),
        ));

        info!(
            width = composed.width,
            height = composed.height,
            bytes = artifact.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Sheet built"
        );
        Ok(artifact)
    }

    /// Fetches all tiles concurrently and returns them in cell order.
    ///
    /// The first failure cancels every fetch still running.
    async fn fetch_tiles(&self, request: &SheetRequest) -> Result<Vec<Vec<u8>>, BuildError> {
        let mut slots: Vec<Option<Vec<u8>>> = vec![None; request.shape().cell_count()];
        let mut fetches = JoinSet::new();

        for tile in request.tiles() {
            let source = Arc::clone(&self.source);
            let limit = Arc::clone(&self.fetch_limit);

            fetches.spawn(async move {
                let index = tile.index();
                let _permit = limit.acquire_owned().await.map_err(|_| FetchError::Network {
                    index,
                    reason: "fetch limiter closed".to_string(),
                })?;
                let data = source.fetch(&tile).await?;
                Ok::<_, FetchError>((index, data))
            });
        }

        while let Some(joined) = fetches.join_next().await {
            match joined {
                Ok(Ok((index, data))) => slots[index] = Some(data),
                Ok(Err(error)) => {
                    fetches.abort_all();
                    warn!(
                        source = self.source.name(),
                        tile = error.index(),
                        error = %error,
                        "Tile fetch failed, abandoning build"
                    );
                    return Err(error.into());
                }
                Err(join_error) => {
                    fetches.abort_all();
                    warn!(error = %join_error, "Tile fetch task failed");
                    return Err(BuildError::Interrupted(join_error.to_string()));
                }
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| BuildError::Interrupted(format!("tile {} never completed", index)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::encode_png;
    use crate::grid::{GridShape, TileRequest};
    use image::{Rgba, RgbaImage};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory source: a solid tile per index, optional per-index
    /// failures and delays.
    #[derive(Default)]
    struct ScriptedSource {
        failures: HashMap<usize, FetchError>,
        delays: HashMap<usize, Duration>,
        calls: AtomicUsize,
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ScriptedSource {
        fn failing(index: usize, error: FetchError) -> Self {
            let mut source = Self::default();
            source.failures.insert(index, error);
            source
        }

        fn with_delay(mut self, index: usize, delay: Duration) -> Self {
            self.delays.insert(index, delay);
            self
        }
    }

    fn tile_color(index: usize) -> Rgba<u8> {
        Rgba([index as u8 * 10, 0, 255 - index as u8 * 10, 255])
    }

    fn tile_png(index: usize) -> Vec<u8> {
        encode_png(&RgbaImage::from_pixel(8, 6, tile_color(index))).unwrap()
    }

    impl TileSource for ScriptedSource {
        async fn fetch(&self, request: &TileRequest) -> Result<Vec<u8>, FetchError> {
            let index = request.index();
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            if let Some(delay) = self.delays.get(&index) {
                tokio::time::sleep(*delay).await;
            }
            self.active.fetch_sub(1, Ordering::SeqCst);

            match self.failures.get(&index) {
                Some(error) => Err(error.clone()),
                None => Ok(tile_png(index)),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn request(query: &str) -> SheetRequest {
        SheetRequest::new(query, GridShape::default(), 0)
    }

    #[tokio::test]
    async fn test_build_publishes_sheet() {
        let cache = Arc::new(SheetCache::new());
        let builder = SheetBuilder::new(ScriptedSource::default(), Arc::clone(&cache), 16);

        let artifact = builder.build(&request("cat")).await.unwrap();

        assert_eq!(artifact.query(), "cat");
        assert_eq!(artifact.shape(), GridShape::default());
        assert!(Arc::ptr_eq(&artifact, &cache.latest().unwrap()));
        assert_eq!(builder.source().calls.load(Ordering::SeqCst), 12);

        let sheet = image::load_from_memory(artifact.png()).unwrap().to_rgba8();
        assert_eq!(sheet.dimensions(), (24, 24));
    }

    #[tokio::test]
    async fn test_failed_tile_leaves_cache_untouched() {
        let cache = Arc::new(SheetCache::new());
        let previous = SheetBuilder::new(ScriptedSource::default(), Arc::clone(&cache), 16)
            .build(&request("before"))
            .await
            .unwrap();

        let failing = SheetBuilder::new(
            ScriptedSource::failing(7, FetchError::Status { index: 7, status: 404 }),
            Arc::clone(&cache),
            16,
        );
        let error = failing.build(&request("cat")).await.unwrap_err();

        assert_eq!(error, BuildError::Fetch(FetchError::Status { index: 7, status: 404 }));
        assert!(Arc::ptr_eq(&previous, &cache.latest().unwrap()));
    }

    #[tokio::test]
    async fn test_failed_first_build_leaves_cache_empty() {
        let cache = Arc::new(SheetCache::new());
        let builder = SheetBuilder::new(
            ScriptedSource::failing(0, FetchError::Timeout { index: 0 }),
            Arc::clone(&cache),
            16,
        );

        assert!(builder.build(&request("cat")).await.is_err());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_first_failure_cancels_slow_fetches() {
        let mut source = ScriptedSource::failing(
            3,
            FetchError::Network {
                index: 3,
                reason: "connection reset".to_string(),
            },
        );
        for index in (0..12).filter(|i| *i != 3) {
            source = source.with_delay(index, Duration::from_secs(60));
        }
        let builder = SheetBuilder::new(source, Arc::new(SheetCache::new()), 16);

        let result = tokio::time::timeout(Duration::from_secs(5), builder.build(&request("cat")))
            .await
            .expect("build should fail fast");

        assert!(matches!(
            result,
            Err(BuildError::Fetch(FetchError::Network { index: 3, .. }))
        ));
    }

    #[tokio::test]
    async fn test_placement_ignores_completion_order() {
        // Earlier indices finish last
        let mut source = ScriptedSource::default();
        for index in 0..12 {
            source = source.with_delay(index, Duration::from_millis((12 - index as u64) * 5));
        }
        let builder = SheetBuilder::new(source, Arc::new(SheetCache::new()), 16);

        let artifact = builder.build(&request("order")).await.unwrap();
        let sheet = image::load_from_memory(artifact.png()).unwrap().to_rgba8();

        let shape = GridShape::default();
        for index in 0..12 {
            let (cx, cy) = shape.cell_position(index);
            assert_eq!(*sheet.get_pixel(cx * 8 + 1, cy * 6 + 1), tile_color(index));
        }
    }

    #[tokio::test]
    async fn test_fetch_limit_caps_concurrency() {
        let mut source = ScriptedSource::default();
        for index in 0..12 {
            source = source.with_delay(index, Duration::from_millis(10));
        }
        let builder = SheetBuilder::new(source, Arc::new(SheetCache::new()), 2);

        builder.build(&request("slow")).await.unwrap();

        let peak = builder.source().peak.load(Ordering::SeqCst);
        assert!(peak <= 2, "peak concurrency was {}", peak);
    }

    #[tokio::test]
    async fn test_sequential_builds_keep_latest() {
        let cache = Arc::new(SheetCache::new());
        let builder = SheetBuilder::new(ScriptedSource::default(), Arc::clone(&cache), 16);

        builder.build(&request("first")).await.unwrap();
        let second = builder.build(&request("second")).await.unwrap();

        let latest = cache.latest().unwrap();
        assert!(Arc::ptr_eq(&second, &latest));
        assert_eq!(latest.query(), "second");
    }

    #[tokio::test]
    async fn test_undecodable_reference_tile_is_compose_error() {
        struct Garbage;
        impl TileSource for Garbage {
            async fn fetch(&self, _request: &TileRequest) -> Result<Vec<u8>, FetchError> {
                Ok(b"not an image".to_vec())
            }
            fn name(&self) -> &str {
                "garbage"
            }
        }

        let cache = Arc::new(SheetCache::new());
        let builder = SheetBuilder::new(Garbage, Arc::clone(&cache), 4);

        let error = builder.build(&request("cat")).await.unwrap_err();
        assert!(matches!(error, BuildError::Compose(_)));
        assert!(cache.is_empty());
    }
}
