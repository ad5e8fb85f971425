//! Composition errors.

use thiserror::Error;

/// Errors that abort a sheet composition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    /// Number of tiles does not match the grid.
    #[error("expected {expected} tiles, got {actual}")]
    TileCount { expected: usize, actual: usize },

    /// The first tile, which defines the cell size, could not be decoded.
    #[error("reference tile could not be decoded: {0}")]
    ReferenceDecode(String),

    /// The canvas derived from the reference tile is too large.
    #[error("sheet canvas {width}x{height} exceeds the size limit")]
    CanvasTooLarge { width: u64, height: u64 },

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}
