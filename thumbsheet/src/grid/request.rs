//! Sheet and tile request types.

use super::GridShape;

/// Request to build one sheet.
///
/// Two requests are equal when they would fetch exactly the same tiles,
/// which is what identical-request coalescing keys on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetRequest {
    query: String,
    shape: GridShape,
    page: u32,
}

impl SheetRequest {
    /// Creates a sheet request.
    pub fn new(query: impl Into<String>, shape: GridShape, page: u32) -> Self {
        Self {
            query: query.into(),
            shape,
            page,
        }
    }

    /// Search term the tiles are fetched for.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Grid shape of the sheet.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Result page the tiles come from.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// One tile request per cell, in index order.
    pub fn tiles(&self) -> impl Iterator<Item = TileRequest> + '_ {
        (0..self.shape.cell_count()).map(move |index| TileRequest {
            query: self.query.clone(),
            page: self.page,
            shape: self.shape,
            index,
        })
    }
}

/// Request for the tile occupying one cell of a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileRequest {
    query: String,
    page: u32,
    shape: GridShape,
    index: usize,
}

impl TileRequest {
    /// Creates a tile request for a single cell.
    pub fn new(query: impl Into<String>, page: u32, shape: GridShape, index: usize) -> Self {
        Self {
            query: query.into(),
            page,
            shape,
            index,
        }
    }

    /// Search term.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Result page.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Grid shape of the sheet this tile belongs to.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Row-major cell index.
    pub fn index(&self) -> usize {
        self.index
    }
}
