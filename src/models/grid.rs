//! Fixed-size indexed-color pixel grid.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Width and height of every grid, in cells.
pub const GRID_SIZE: usize = 16;

/// Index into a palette's color list.
pub type ColorIndex = u8;

/// Color index reserved for transparent/background cells.
pub const TRANSPARENT: ColorIndex = 0;

/// One row of cells, indexed by x.
pub type Row = [ColorIndex; GRID_SIZE];

/// Error produced when raw cell data does not describe a 16x16 grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid has {0} rows, expected {}", GRID_SIZE)]
    Height(usize),
    #[error("grid row {row} has {len} cells, expected {}", GRID_SIZE)]
    Width { row: usize, len: usize },
}

/// A 16x16 matrix of color indices, addressed as `(x, y)` with (0,0) top-left.
///
/// Rows are reference counted. Cloning a grid shares every row, and writing a
/// cell copies only the row it lives in, so an edited grid and its source
/// share all untouched rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<ColorIndex>>", into = "Vec<Vec<ColorIndex>>")]
pub struct Grid {
    rows: [Arc<Row>; GRID_SIZE],
}

impl Grid {
    /// An all-transparent grid.
    pub fn new() -> Self {
        let blank = Arc::new([TRANSPARENT; GRID_SIZE]);
        Grid { rows: std::array::from_fn(|_| Arc::clone(&blank)) }
    }

    /// Whether `(x, y)` addresses a cell.
    pub fn contains(x: i32, y: i32) -> bool {
        x >= 0 && (x as usize) < GRID_SIZE && y >= 0 && (y as usize) < GRID_SIZE
    }

    /// Color at (x, y). Returns `None` if out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<ColorIndex> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Row `y`, if in bounds.
    pub fn row(&self, y: usize) -> Option<&Row> {
        self.rows.get(y).map(|row| row.as_ref())
    }

    /// All rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().map(|row| row.as_ref())
    }

    /// Whether row `y` is the same allocation in both grids.
    pub fn shares_row(&self, other: &Grid, y: usize) -> bool {
        match (self.rows.get(y), other.rows.get(y)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Number of cells that are not transparent.
    pub fn painted_cells(&self) -> usize {
        self.rows().flatten().filter(|&&c| c != TRANSPARENT).count()
    }

    /// Overwrite one cell in place, copying its row first if it is shared.
    ///
    /// Callers must have bounds-checked `(x, y)`.
    pub(crate) fn write(&mut self, x: usize, y: usize, color: ColorIndex) {
        Arc::make_mut(&mut self.rows[y])[x] = color;
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl From<[[ColorIndex; GRID_SIZE]; GRID_SIZE]> for Grid {
    fn from(cells: [[ColorIndex; GRID_SIZE]; GRID_SIZE]) -> Self {
        Grid { rows: cells.map(Arc::new) }
    }
}

impl TryFrom<Vec<Vec<ColorIndex>>> for Grid {
    type Error = GridError;

    fn try_from(cells: Vec<Vec<ColorIndex>>) -> Result<Self, Self::Error> {
        if cells.len() != GRID_SIZE {
            return Err(GridError::Height(cells.len()));
        }
        let mut grid = Grid::new();
        for (y, row) in cells.into_iter().enumerate() {
            let row: Row = row
                .try_into()
                .map_err(|row: Vec<ColorIndex>| GridError::Width { row: y, len: row.len() })?;
            grid.rows[y] = Arc::new(row);
        }
        Ok(grid)
    }
}

impl From<Grid> for Vec<Vec<ColorIndex>> {
    fn from(grid: Grid) -> Self {
        grid.rows().map(|row| row.to_vec()).collect()
    }
}
