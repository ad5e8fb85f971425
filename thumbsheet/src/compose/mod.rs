//! Sheet composition: tiles in, one PNG out.
//!
//! The first tile sets the cell size for the whole sheet. Every tile is
//! copied unscaled onto a transparent canvas at the offset of its cell;
//! pixels that fall outside a cell are clipped and cells a tile does not
//! cover stay transparent.

mod encode;
mod error;

pub use encode::encode_png;
pub use error::ComposeError;

use crate::grid::GridShape;
use image::{ImageReader, RgbaImage};
use std::io::Cursor;
use tracing::{debug, warn};

/// Largest canvas (in pixels) a sheet may have; 64 Mpx is 256 MiB of RGBA.
pub const MAX_CANVAS_PIXELS: u64 = 64 * 1024 * 1024;

/// Size of one grid cell in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSize {
    /// Cell width.
    pub width: u32,
    /// Cell height.
    pub height: u32,
}

impl CellSize {
    /// Used only when the first tile's dimensions cannot be read.
    pub const FALLBACK: CellSize = CellSize {
        width: 320,
        height: 180,
    };

    /// Top-left pixel of the cell at `index`.
    pub fn offset(&self, shape: GridShape, index: usize) -> (u32, u32) {
        let (cx, cy) = shape.cell_position(index);
        (cx * self.width, cy * self.height)
    }
}

/// Output of a successful composition.
#[derive(Debug, Clone)]
pub struct ComposedSheet {
    /// Encoded PNG.
    pub png: Vec<u8>,
    /// Cell size taken from the first tile.
    pub cell: CellSize,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
}

/// Composes `tiles` (row-major, one per cell) into an encoded PNG sheet.
///
/// This is CPU-bound; async callers should run it on a blocking thread.
///
/// # Errors
///
/// - [`ComposeError::TileCount`] if `tiles.len()` differs from the cell count
/// - [`ComposeError::ReferenceDecode`] if the first tile cannot be decoded
/// - [`ComposeError::CanvasTooLarge`] if the canvas would exceed [`MAX_CANVAS_PIXELS`]
/// - [`ComposeError::Encode`] if PNG encoding fails
pub fn compose_sheet<T: AsRef<[u8]>>(
    tiles: &[T],
    shape: GridShape,
) -> Result<ComposedSheet, ComposeError> {
    let canvas = render_canvas(tiles, shape)?;
    let (width, height) = canvas.dimensions();
    let png = encode_png(&canvas)?;

    debug!(
        shape = %shape,
        width,
        height,
        bytes = png.len(),
        "Sheet composed"
    );

    Ok(ComposedSheet {
        png,
        cell: CellSize {
            width: width / shape.columns(),
            height: height / shape.rows(),
        },
        width,
        height,
    })
}

/// Canvas dimensions for `shape` cells of size `cell`.
///
/// Fails with [`ComposeError::CanvasTooLarge`] when the canvas would exceed
/// [`MAX_CANVAS_PIXELS`]; a tile header is free to claim any size.
fn canvas_size(cell: CellSize, shape: GridShape) -> Result<(u32, u32), ComposeError> {
    let width = u64::from(cell.width) * u64::from(shape.columns());
    let height = u64::from(cell.height) * u64::from(shape.rows());
    let too_large = ComposeError::CanvasTooLarge { width, height };

    match width.checked_mul(height) {
        Some(pixels) if pixels <= MAX_CANVAS_PIXELS => {
            let width = u32::try_from(width).map_err(|_| too_large.clone())?;
            let height = u32::try_from(height).map_err(|_| too_large)?;
            Ok((width, height))
        }
        _ => Err(too_large),
    }
}

/// Renders the unencoded canvas.
pub fn render_canvas<T: AsRef<[u8]>>(
    tiles: &[T],
    shape: GridShape,
) -> Result<RgbaImage, ComposeError> {
    if tiles.len() != shape.cell_count() {
        return Err(ComposeError::TileCount {
            expected: shape.cell_count(),
            actual: tiles.len(),
        });
    }

    let cell = reference_cell_size(tiles[0].as_ref());
    let (width, height) = canvas_size(cell, shape)?;

    // RgbaImage::new is zero-filled: fully transparent
    let mut canvas = RgbaImage::new(width, height);

    for (index, data) in tiles.iter().enumerate() {
        let (x_offset, y_offset) = cell.offset(shape, index);
        match decode_tile(data.as_ref()) {
            Ok(tile) => place_tile(&mut canvas, &tile, cell, x_offset, y_offset),
            Err(reason) if index == 0 => return Err(ComposeError::ReferenceDecode(reason)),
            Err(reason) => {
                warn!(tile = index, error = %reason, "Failed to decode tile, leaving cell empty");
            }
        }
    }

    Ok(canvas)
}

/// Natural size of the first tile, read from its header without a full decode.
fn reference_cell_size(data: &[u8]) -> CellSize {
    let dimensions = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_dimensions().ok());

    match dimensions {
        Some((width, height)) if width > 0 && height > 0 => CellSize { width, height },
        _ => {
            warn!(
                fallback_width = CellSize::FALLBACK.width,
                fallback_height = CellSize::FALLBACK.height,
                "Unreadable reference tile dimensions, using fallback cell size"
            );
            CellSize::FALLBACK
        }
    }
}

fn decode_tile(data: &[u8]) -> Result<RgbaImage, String> {
    let img = image::load_from_memory(data).map_err(|e| format!("image decode error: {}", e))?;
    Ok(img.to_rgba8())
}

/// Copies `tile` into the cell at the given offset, clipped to the cell.
fn place_tile(canvas: &mut RgbaImage, tile: &RgbaImage, cell: CellSize, x_offset: u32, y_offset: u32) {
    let width = tile.width().min(cell.width);
    let height = tile.height().min(cell.height);

    for y in 0..height {
        for x in 0..width {
            canvas.put_pixel(x_offset + x, y_offset + y, *tile.get_pixel(x, y));
        }
    }
}
