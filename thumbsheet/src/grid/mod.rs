//! Grid geometry and request types.
//!
//! A sheet is a `columns × rows` grid of cells filled in row-major order:
//! index 0 is the top-left cell, index `columns - 1` the top-right one.

mod request;
mod shape;

pub use request::{SheetRequest, TileRequest};
pub use shape::{GridShape, DEFAULT_COLUMNS, DEFAULT_MAX_CELLS, DEFAULT_ROWS};
