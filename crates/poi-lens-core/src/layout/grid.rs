//! Discrete occupancy grid used to keep markers from overlapping

use std::collections::HashSet;

use serde::Serialize;

/// A cell of the layout grid; rows grow downwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GridCell {
    pub column: i64,
    pub row: i64,
}

impl GridCell {
    pub const fn new(column: i64, row: i64) -> Self {
        Self { column, row }
    }

    /// The cell directly below
    pub fn below(&self) -> Self {
        Self::new(self.column, self.row + 1)
    }
}

/// Tracks which cells are taken during one layout pass
#[derive(Debug, Clone)]
pub struct CollisionGrid {
    cell_size_px: f64,
    occupied: HashSet<GridCell>,
}

impl CollisionGrid {
    pub fn new(cell_size_px: f64) -> Self {
        Self {
            cell_size_px,
            occupied: HashSet::new(),
        }
    }

    pub fn cell_size_px(&self) -> f64 {
        self.cell_size_px
    }

    /// Cell containing a pixel position
    pub fn cell_at(&self, x_px: f64, y_px: f64) -> GridCell {
        GridCell::new(
            (x_px / self.cell_size_px).floor() as i64,
            (y_px / self.cell_size_px).floor() as i64,
        )
    }

    /// Top edge of a cell's row in pixels
    pub fn row_top_px(&self, cell: GridCell) -> f64 {
        cell.row as f64 * self.cell_size_px
    }

    pub fn is_occupied(&self, cell: GridCell) -> bool {
        self.occupied.contains(&cell)
    }

    /// Claim `preferred`, or the first free cell below it in the same column
    pub fn claim(&mut self, preferred: GridCell) -> GridCell {
        let mut cell = preferred;
        while self.occupied.contains(&cell) {
            cell = cell.below();
        }
        self.occupied.insert(cell);
        cell
    }

    pub fn len(&self) -> usize {
        self.occupied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }
}
