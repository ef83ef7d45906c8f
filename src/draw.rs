//! Pixel edit engine: copy-on-write grid edits driven by editor tools.
//!
//! Every operation takes a grid by reference and returns a new grid; the
//! input is never modified. Because grid rows are shared, an edit only copies
//! the rows it actually writes.
//!
//! Pointer handling is split in two steps: [`cell_at`] maps a pointer offset
//! to a grid cell, and [`resolve`] turns the active tool plus a [`Gesture`]
//! into an [`Edit`], which [`apply`] executes.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

use crate::models::{ColorIndex, Grid, GRID_SIZE, TRANSPARENT};
use crate::shapes::rasterize_line;

pub use crate::models::Tool;

/// Error type for draw operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    /// Coordinate outside the 16x16 grid.
    #[error("coordinates ({x}, {y}) out of bounds for {size}x{size} grid", size = GRID_SIZE)]
    OutOfBounds { x: i32, y: i32 },
}

/// A grid cell address. Always in bounds when produced by [`cell_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    /// A cell at (x, y), or `None` when outside the grid.
    pub fn new(x: i32, y: i32) -> Option<Self> {
        Grid::contains(x, y).then(|| Cell { x: x as usize, y: y as usize })
    }

    fn point(self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

/// A single grid mutation (or read, for [`Edit::Pick`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Edit {
    /// Set one cell.
    Pixel { x: i32, y: i32, color: ColorIndex },
    /// Draw a Bresenham line, both endpoints inclusive.
    Line { from: (i32, i32), to: (i32, i32), color: ColorIndex },
    /// 4-connected flood fill from a seed cell.
    Fill { x: i32, y: i32, color: ColorIndex },
    /// Read the color under a cell without changing the grid.
    Pick { x: i32, y: i32 },
}

/// Result of applying an [`Edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The edited grid (may equal the input for no-op edits).
    Grid(Grid),
    /// The color index read by the eyedropper.
    Picked(ColorIndex),
}

/// Set a single cell, returning the new grid.
pub fn set_pixel(grid: &Grid, x: i32, y: i32, color: ColorIndex) -> Result<Grid, DrawError> {
    let cell = Cell::new(x, y).ok_or(DrawError::OutOfBounds { x, y })?;
    let mut out = grid.clone();
    if grid.get(cell.x, cell.y) != Some(color) {
        out.write(cell.x, cell.y, color);
    }
    Ok(out)
}

/// Draw a line from `from` to `to` with Bresenham's algorithm.
///
/// The segment is first clipped to the grid, so a line with an off-grid
/// endpoint draws only its visible part and the work stays bounded by the
/// grid size however far away the endpoints are.
pub fn draw_line(grid: &Grid, from: (i32, i32), to: (i32, i32), color: ColorIndex) -> Grid {
    let mut out = grid.clone();
    let Some((from, to)) = clip_to_grid(from, to) else {
        return out;
    };
    for (px, py) in rasterize_line(from, to) {
        if let Some(cell) = Cell::new(px, py) {
            if out.get(cell.x, cell.y) != Some(color) {
                out.write(cell.x, cell.y, color);
            }
        }
    }
    out
}

/// Liang-Barsky clip of a segment to the grid box, endpoints rounded to cells.
/// `None` when the segment misses the grid entirely.
fn clip_to_grid(from: (i32, i32), to: (i32, i32)) -> Option<((i32, i32), (i32, i32))> {
    if Grid::contains(from.0, from.1) && Grid::contains(to.0, to.1) {
        return Some((from, to));
    }

    let max = (GRID_SIZE - 1) as f64;
    let (x0, y0) = (f64::from(from.0), f64::from(from.1));
    let (dx, dy) = (f64::from(to.0) - x0, f64::from(to.1) - y0);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [(-dx, x0), (dx, max - x0), (-dy, y0), (dy, max - y0)] {
        if p == 0.0 {
            // Parallel to this edge and outside it
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    let at = |t: f64| {
        let x = (x0 + t * dx).round().clamp(0.0, max) as i32;
        let y = (y0 + t * dy).round().clamp(0.0, max) as i32;
        (x, y)
    };
    Some((at(t0), at(t1)))
}

/// Flood fill from a seed point using iterative BFS.
///
/// Every cell reachable from (x, y) through a 4-connected path of cells with
/// the seed's original color is set to `color`. Filling a region with its own
/// color returns the input unchanged.
pub fn flood_fill(grid: &Grid, x: i32, y: i32, color: ColorIndex) -> Result<Grid, DrawError> {
    let seed = Cell::new(x, y).ok_or(DrawError::OutOfBounds { x, y })?;
    let target = grid.get(seed.x, seed.y).ok_or(DrawError::OutOfBounds { x, y })?;

    let mut out = grid.clone();
    if target == color {
        return Ok(out);
    }

    let mut queue = VecDeque::new();
    queue.push_back(seed);
    // Mark visited by filling as we go: a filled cell no longer matches `target`
    out.write(seed.x, seed.y, color);

    while let Some(cell) = queue.pop_front() {
        let neighbors: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        for (dx, dy) in neighbors {
            let Some(next) = Cell::new(cell.x as i32 + dx, cell.y as i32 + dy) else {
                continue;
            };
            if out.get(next.x, next.y) == Some(target) {
                out.write(next.x, next.y, color);
                queue.push_back(next);
            }
        }
    }

    Ok(out)
}

/// Read the color under (x, y).
pub fn pick_color(grid: &Grid, x: i32, y: i32) -> Result<ColorIndex, DrawError> {
    let cell = Cell::new(x, y).ok_or(DrawError::OutOfBounds { x, y })?;
    grid.get(cell.x, cell.y).ok_or(DrawError::OutOfBounds { x, y })
}

/// Apply an edit to a grid.
pub fn apply(grid: &Grid, edit: &Edit) -> Result<EditOutcome, DrawError> {
    match *edit {
        Edit::Pixel { x, y, color } => set_pixel(grid, x, y, color).map(EditOutcome::Grid),
        Edit::Line { from, to, color } => Ok(EditOutcome::Grid(draw_line(grid, from, to, color))),
        Edit::Fill { x, y, color } => flood_fill(grid, x, y, color).map(EditOutcome::Grid),
        Edit::Pick { x, y } => pick_color(grid, x, y).map(EditOutcome::Picked),
    }
}

/// Map a pointer offset from the grid's origin to a cell.
///
/// `scale` is the rendered size of one cell. Offsets are floored, so a
/// pointer just left of or above the origin maps to no cell.
pub fn cell_at(offset_x: f64, offset_y: f64, scale: f64) -> Option<Cell> {
    if scale.is_nan() || scale <= 0.0 {
        return None;
    }
    let x = (offset_x / scale).floor();
    let y = (offset_y / scale).floor();
    if x < 0.0 || y < 0.0 || x >= GRID_SIZE as f64 || y >= GRID_SIZE as f64 {
        return None;
    }
    Some(Cell { x: x as usize, y: y as usize })
}

/// A pointer event already mapped to grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Pointer pressed on a cell.
    Down(Cell),
    /// Pointer dragged from the previous cell to a new one while pressed.
    Drag { from: Cell, to: Cell },
}

/// Turn the active tool and a gesture into an edit.
///
/// Pencil and eraser paint on press and draw connecting lines on drag so a
/// fast stroke stays continuous. Fill and eyedropper act on press only.
pub fn resolve(tool: Tool, gesture: Gesture, selected_color: ColorIndex) -> Option<Edit> {
    let paint = match tool {
        Tool::Pencil => Some(selected_color),
        Tool::Eraser => Some(TRANSPARENT),
        Tool::Fill | Tool::Eyedropper => None,
    };

    match (gesture, paint) {
        (Gesture::Down(cell), Some(color)) => {
            Some(Edit::Pixel { x: cell.x as i32, y: cell.y as i32, color })
        }
        (Gesture::Drag { from, to }, Some(color)) => {
            Some(Edit::Line { from: from.point(), to: to.point(), color })
        }
        (Gesture::Down(cell), None) => match tool {
            Tool::Fill => Some(Edit::Fill { x: cell.x as i32, y: cell.y as i32, color: selected_color }),
            _ => Some(Edit::Pick { x: cell.x as i32, y: cell.y as i32 }),
        },
        (Gesture::Drag { .. }, None) => None,
    }
}

/// Tracks the last cell of an in-progress pointer stroke.
#[derive(Debug, Clone, Default)]
pub struct Stroke {
    last: Option<Cell>,
}

impl Stroke {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the pointer is currently pressed.
    pub fn is_active(&self) -> bool {
        self.last.is_some()
    }

    /// Pointer pressed. `None` (pointer outside the grid) starts no stroke.
    pub fn press(&mut self, cell: Option<Cell>) -> Option<Gesture> {
        let cell = cell?;
        self.last = Some(cell);
        Some(Gesture::Down(cell))
    }

    /// Pointer moved. Yields a drag only while pressed and over the grid.
    pub fn moved(&mut self, cell: Option<Cell>) -> Option<Gesture> {
        let from = self.last?;
        let to = cell?;
        self.last = Some(to);
        Some(Gesture::Drag { from, to })
    }

    /// Pointer released or left the grid.
    pub fn release(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a grid from 16 strings of hex digits, one digit per cell.
    fn grid_from(rows: &[&str]) -> Grid {
        let cells: Vec<Vec<ColorIndex>> = rows
            .iter()
            .map(|r| r.chars().map(|c| c.to_digit(16).unwrap() as ColorIndex).collect())
            .collect();
        Grid::try_from(cells).unwrap()
    }

    fn walled_grid() -> Grid {
        // A vertical wall of 1s at x = 4 splits the grid in two regions of 0s
        let row = "0000100000000000";
        grid_from(&[row; 16])
    }

    #[test]
    fn test_set_pixel_changes_only_target() {
        let grid = Grid::new();
        let out = set_pixel(&grid, 3, 4, 9).unwrap();
        assert_eq!(out.get(3, 4), Some(9));
        assert_eq!(out.painted_cells(), 1);
        // Input untouched
        assert_eq!(grid.get(3, 4), Some(0));
    }

    #[test]
    fn test_set_pixel_out_of_bounds() {
        let grid = Grid::new();
        assert_eq!(set_pixel(&grid, 16, 0, 1), Err(DrawError::OutOfBounds { x: 16, y: 0 }));
        assert_eq!(set_pixel(&grid, 0, -1, 1), Err(DrawError::OutOfBounds { x: 0, y: -1 }));
    }

    #[test]
    fn test_set_pixel_copies_one_row() {
        let grid = Grid::new();
        let out = set_pixel(&grid, 0, 7, 2).unwrap();
        assert!(!out.shares_row(&grid, 7));
        assert!(out.shares_row(&grid, 6));
        assert!(out.shares_row(&grid, 8));
    }

    #[test]
    fn test_line_degenerate_matches_set_pixel() {
        let grid = Grid::new();
        assert_eq!(draw_line(&grid, (5, 5), (5, 5), 3), set_pixel(&grid, 5, 5, 3).unwrap());
    }

    #[test]
    fn test_line_main_diagonal() {
        let out = draw_line(&Grid::new(), (0, 0), (15, 15), 1);
        assert_eq!(out.painted_cells(), 16);
        for i in 0..16 {
            assert_eq!(out.get(i, i), Some(1));
        }
    }

    #[test]
    fn test_line_clips_off_grid_points() {
        let out = draw_line(&Grid::new(), (-3, 0), (3, 0), 1);
        assert_eq!(out.painted_cells(), 4);
        assert_eq!(out.get(0, 0), Some(1));
        assert_eq!(out.get(3, 0), Some(1));
    }

    #[test]
    fn test_line_with_extreme_endpoints_is_clipped() {
        let out = draw_line(&Grid::new(), (i32::MIN, 0), (i32::MAX, 0), 1);
        assert_eq!(out.painted_cells(), GRID_SIZE);
        assert!((0..GRID_SIZE).all(|x| out.get(x, 0) == Some(1)));

        let out = draw_line(&Grid::new(), (0, 0), (2_000_000_000, 0), 2);
        assert_eq!(out.painted_cells(), GRID_SIZE);
        assert_eq!(out.get(15, 0), Some(2));
    }

    #[test]
    fn test_line_missing_grid_is_noop() {
        let grid = Grid::new();
        assert_eq!(draw_line(&grid, (-50, -50), (-1, 40), 1), grid);
        assert_eq!(draw_line(&grid, (20, 3), (i32::MAX, i32::MIN), 1), grid);
        assert_eq!(draw_line(&grid, (0, 16), (15, 16), 1), grid);
    }

    #[test]
    fn test_flood_fill_stops_at_wall() {
        let grid = walled_grid();
        let out = flood_fill(&grid, 0, 0, 5).unwrap();

        for y in 0..16 {
            for x in 0..4 {
                assert_eq!(out.get(x, y), Some(5), "({},{}) should be filled", x, y);
            }
            assert_eq!(out.get(4, y), Some(1));
            for x in 5..16 {
                assert_eq!(out.get(x, y), Some(0), "({},{}) should be untouched", x, y);
            }
        }
    }

    #[test]
    fn test_flood_fill_same_color_noop() {
        let grid = walled_grid();
        let out = flood_fill(&grid, 0, 0, 0).unwrap();
        assert_eq!(out, grid);
        for y in 0..16 {
            assert!(out.shares_row(&grid, y));
        }
    }

    #[test]
    fn test_flood_fill_is_idempotent() {
        let grid = walled_grid();
        let once = flood_fill(&grid, 8, 8, 3).unwrap();
        let twice = flood_fill(&once, 8, 8, 3).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_flood_fill_ignores_diagonals() {
        let mut rows = ["1111111111111111"; 16];
        rows[0] = "0111111111111111";
        rows[1] = "1011111111111111";
        let grid = grid_from(&rows);

        let out = flood_fill(&grid, 0, 0, 7).unwrap();
        assert_eq!(out.get(0, 0), Some(7));
        // (1,1) touches (0,0) only diagonally
        assert_eq!(out.get(1, 1), Some(0));
    }

    #[test]
    fn test_flood_fill_entire_grid() {
        let out = flood_fill(&Grid::new(), 15, 15, 2).unwrap();
        assert!(out.rows().flatten().all(|&c| c == 2));
    }

    #[test]
    fn test_flood_fill_out_of_bounds() {
        let result = flood_fill(&Grid::new(), 20, 3, 1);
        assert_eq!(result, Err(DrawError::OutOfBounds { x: 20, y: 3 }));
    }

    #[test]
    fn test_pick_color_reads_without_writing() {
        let grid = set_pixel(&Grid::new(), 2, 2, 11).unwrap();
        assert_eq!(apply(&grid, &Edit::Pick { x: 2, y: 2 }), Ok(EditOutcome::Picked(11)));
        assert_eq!(pick_color(&grid, 3, 2), Ok(0));
    }

    #[test]
    fn test_cell_at_floors_and_rejects() {
        assert_eq!(cell_at(0.0, 0.0, 16.0), Some(Cell { x: 0, y: 0 }));
        assert_eq!(cell_at(31.9, 16.0, 16.0), Some(Cell { x: 1, y: 1 }));
        assert_eq!(cell_at(255.9, 255.9, 16.0), Some(Cell { x: 15, y: 15 }));
        assert_eq!(cell_at(256.0, 0.0, 16.0), None);
        assert_eq!(cell_at(-0.5, 4.0, 16.0), None);
        assert_eq!(cell_at(4.0, 4.0, 0.0), None);
    }

    #[test]
    fn test_resolve_pencil_and_eraser() {
        let down = Gesture::Down(Cell { x: 1, y: 2 });
        assert_eq!(resolve(Tool::Pencil, down, 6), Some(Edit::Pixel { x: 1, y: 2, color: 6 }));
        assert_eq!(resolve(Tool::Eraser, down, 6), Some(Edit::Pixel { x: 1, y: 2, color: 0 }));

        let drag = Gesture::Drag { from: Cell { x: 0, y: 0 }, to: Cell { x: 5, y: 1 } };
        assert_eq!(
            resolve(Tool::Pencil, drag, 6),
            Some(Edit::Line { from: (0, 0), to: (5, 1), color: 6 })
        );
    }

    #[test]
    fn test_resolve_fill_and_eyedropper_ignore_drag() {
        let down = Gesture::Down(Cell { x: 3, y: 3 });
        let drag = Gesture::Drag { from: Cell { x: 3, y: 3 }, to: Cell { x: 4, y: 3 } };
        assert_eq!(resolve(Tool::Fill, down, 2), Some(Edit::Fill { x: 3, y: 3, color: 2 }));
        assert_eq!(resolve(Tool::Eyedropper, down, 2), Some(Edit::Pick { x: 3, y: 3 }));
        assert_eq!(resolve(Tool::Fill, drag, 2), None);
        assert_eq!(resolve(Tool::Eyedropper, drag, 2), None);
    }

    #[test]
    fn test_stroke_tracks_last_cell() {
        let mut stroke = Stroke::new();
        assert_eq!(stroke.moved(Cell::new(1, 1)), None);

        let a = Cell::new(0, 0);
        let b = Cell::new(4, 2);
        assert_eq!(stroke.press(a), Some(Gesture::Down(Cell { x: 0, y: 0 })));
        assert!(stroke.is_active());
        assert_eq!(
            stroke.moved(b),
            Some(Gesture::Drag { from: Cell { x: 0, y: 0 }, to: Cell { x: 4, y: 2 } })
        );
        // Off-grid move keeps the stroke but yields nothing
        assert_eq!(stroke.moved(None), None);

        stroke.release();
        assert!(!stroke.is_active());
        assert_eq!(stroke.moved(b), None);
    }

    #[test]
    fn test_sparse_drag_draws_continuous_stroke() {
        let mut stroke = Stroke::new();
        let mut grid = Grid::new();
        for cell in [Cell::new(0, 0), Cell::new(6, 3), Cell::new(12, 0)] {
            let gesture = if stroke.is_active() { stroke.moved(cell) } else { stroke.press(cell) };
            let edit = resolve(Tool::Pencil, gesture.unwrap(), 1).unwrap();
            if let EditOutcome::Grid(next) = apply(&grid, &edit).unwrap() {
                grid = next;
            }
        }
        assert_eq!(grid.painted_cells(), 13);
        assert_eq!(grid.get(6, 3), Some(1));
    }
}
