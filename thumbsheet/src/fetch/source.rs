//! Tile source trait.

use super::FetchError;
use crate::grid::TileRequest;
use std::future::Future;

/// Async source of encoded tile images.
///
/// The sheet builder depends on this trait rather than on HTTP directly,
/// so builds can be exercised against in-memory sources.
pub trait TileSource: Send + Sync {
    /// Fetches the encoded image for one cell.
    ///
    /// Returns the raw bytes exactly as served; decoding happens later.
    /// Implementations do not retry.
    fn fetch(
        &self,
        request: &TileRequest,
    ) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;

    /// Name used in logs.
    fn name(&self) -> &str;
}
