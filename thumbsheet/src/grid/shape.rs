//! Grid shape: how many columns and rows a sheet has.

use serde::Serialize;

/// Columns used when a request does not name a usable value.
pub const DEFAULT_COLUMNS: u32 = 3;

/// Rows used when a request does not name a usable value.
pub const DEFAULT_ROWS: u32 = 4;

/// Largest number of cells a single sheet may have.
pub const DEFAULT_MAX_CELLS: usize = 400;

/// Column/row arrangement of a sheet.
///
/// Both dimensions are at least 1, so a shape always has at least one cell.
///
/// # Example
///
/// ```
/// use thumbsheet::grid::GridShape;
///
/// let shape = GridShape::new(3, 4).unwrap();
/// assert_eq!(shape.cell_count(), 12);
/// assert_eq!(shape.cell_position(7), (1, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GridShape {
    columns: u32,
    rows: u32,
}

impl GridShape {
    /// Creates a shape, or `None` if either dimension is zero.
    pub fn new(columns: u32, rows: u32) -> Option<Self> {
        if columns == 0 || rows == 0 {
            return None;
        }
        Some(Self { columns, rows })
    }

    /// Builds a shape from raw request parameters.
    ///
    /// Each dimension is parsed independently; a value that is absent,
    /// unparseable, or not positive falls back to the matching dimension
    /// of `fallback`.
    pub fn from_params(columns: Option<&str>, rows: Option<&str>, fallback: GridShape) -> Self {
        Self {
            columns: parse_dimension(columns).unwrap_or(fallback.columns),
            rows: parse_dimension(rows).unwrap_or(fallback.rows),
        }
    }

    /// Number of columns.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells (`columns × rows`).
    pub fn cell_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Column and row `(cx, cy)` of the cell at a row-major `index`.
    pub fn cell_position(&self, index: usize) -> (u32, u32) {
        let columns = self.columns as usize;
        ((index % columns) as u32, (index / columns) as u32)
    }

    /// Whether `index` addresses a cell of this shape.
    pub fn contains(&self, index: usize) -> bool {
        index < self.cell_count()
    }
}

impl Default for GridShape {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
        }
    }
}

impl std::fmt::Display for GridShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.columns, self.rows)
    }
}

fn parse_dimension(raw: Option<&str>) -> Option<u32> {
    let value: i64 = raw?.trim().parse().ok()?;
    if value <= 0 {
        return None;
    }
    u32::try_from(value).ok()
}
