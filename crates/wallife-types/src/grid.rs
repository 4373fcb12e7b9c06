//! The simulation grid: a fixed-size, row-major matrix of [`Cell`]s.
//!
//! Grids are never resized. A size change means building a new grid.
//! Dimensions are floored to 1 at construction so every grid holds at
//! least one cell.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::color::Rgb;

/// Errors that can occur when building a grid from external data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The pattern contained no rows.
    #[error("pattern is empty")]
    EmptyPattern,

    /// A pattern row had a different width from the first row.
    #[error("pattern row {row} has width {found}, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },

    /// A pattern row contained a character other than `#` or `.`.
    #[error("unexpected character {found:?} at row {row}, column {col}")]
    InvalidCharacter {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        col: usize,
        /// The offending character.
        found: char,
    },

    /// The supplied cell vector does not match `rows * cols`.
    #[error("expected {expected} cells, got {found}")]
    CellCountMismatch {
        /// `rows * cols`.
        expected: usize,
        /// Length of the supplied vector.
        found: usize,
    },
}

/// A `rows x cols` matrix of cells stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all-dead grid. Zero dimensions are floored to 1.
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            rows,
            cols,
            cells: vec![Cell::DEAD; rows.saturating_mul(cols)],
        }
    }

    /// Create a grid from an existing row-major cell vector.
    ///
    /// Zero dimensions are floored to 1 before the length check.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::CellCountMismatch`] if `cells.len()` is not
    /// `rows * cols`.
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<Cell>) -> Result<Self, GridError> {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let expected = rows.saturating_mul(cols);
        if cells.len() != expected {
            return Err(GridError::CellCountMismatch {
                expected,
                found: cells.len(),
            });
        }
        Ok(Self { rows, cols, cells })
    }

    /// Parse a grid from rows of `#` (alive) and `.` (dead).
    ///
    /// Live cells are newborns of `color`.
    ///
    /// # Errors
    ///
    /// Returns a [`GridError`] if the pattern is empty, ragged, or contains
    /// any other character.
    pub fn from_pattern(pattern: &[&str], color: Rgb) -> Result<Self, GridError> {
        let first = pattern.first().ok_or(GridError::EmptyPattern)?;
        let cols = first.chars().count();
        if cols == 0 {
            return Err(GridError::EmptyPattern);
        }

        let mut cells = Vec::with_capacity(pattern.len().saturating_mul(cols));
        for (row, line) in pattern.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(GridError::RaggedRow {
                    row,
                    expected: cols,
                    found,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let cell = match ch {
                    '#' => Cell::newborn(color),
                    '.' => Cell::DEAD,
                    other => {
                        return Err(GridError::InvalidCharacter {
                            row,
                            col,
                            found: other,
                        });
                    }
                };
                cells.push(cell);
            }
        }

        Self::from_cells(pattern.len(), cols, cells)
    }

    /// Number of rows.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells (`rows * cols`).
    pub const fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`: a grid holds at least one cell.
    pub const fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `other` has the same dimensions.
    pub const fn same_shape(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    /// Row-major index of `(row, col)`, or `None` if out of range.
    pub const fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        // row < rows and col < cols, so this is < rows * cols.
        match row.checked_mul(self.cols) {
            Some(base) => base.checked_add(col),
            None => None,
        }
    }

    /// `(row, col)` of a row-major index, or `None` if out of range.
    pub const fn position_of(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.cells.len() {
            return None;
        }
        match (index.checked_div(self.cols), index.checked_rem(self.cols)) {
            (Some(row), Some(col)) => Some((row, col)),
            _ => None,
        }
    }

    /// The cell at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.index_of(row, col).and_then(|i| self.cells.get(i))
    }

    /// Replace the cell at `(row, col)`. Returns `false` if out of range.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) -> bool {
        match self.index_of(row, col).and_then(|i| self.cells.get_mut(i)) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Mutable access to the cell at a row-major index.
    pub fn cell_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(index)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of live cells.
    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    /// Whether no cell is alive.
    pub fn is_extinct(&self) -> bool {
        !self.cells.iter().any(Cell::is_alive)
    }

    /// Render the alive/dead pattern as `#`/`.` rows.
    pub fn to_pattern(&self) -> Vec<String> {
        self.cells
            .chunks(self.cols)
            .map(|row| {
                row.iter()
                    .map(|c| if c.is_alive() { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimensions_floor_to_one() {
        let grid = Grid::new(0, 0);
        assert_eq!(grid.rows(), 1);
        assert_eq!(grid.cols(), 1);
        assert_eq!(grid.len(), 1);
        assert!(grid.is_extinct());
    }

    #[test]
    fn pattern_round_trips_alive_state() {
        let rows = [".#.", "##.", "..#"];
        let grid = Grid::from_pattern(&rows, Rgb::WHITE).unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.live_count(), 4);
        assert_eq!(grid.to_pattern(), rows.map(str::to_owned).to_vec());
    }

    #[test]
    fn pattern_cells_are_newborns() {
        let grid = Grid::from_pattern(&["#"], Rgb::new(9, 9, 9)).unwrap();
        assert_eq!(grid.get(0, 0), Some(&Cell::newborn(Rgb::new(9, 9, 9))));
    }

    #[test]
    fn ragged_pattern_is_rejected() {
        let result = Grid::from_pattern(&["##", "#"], Rgb::WHITE);
        assert_eq!(
            result,
            Err(GridError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn unknown_character_is_rejected() {
        let result = Grid::from_pattern(&["#x"], Rgb::WHITE);
        assert!(matches!(
            result,
            Err(GridError::InvalidCharacter { row: 0, col: 1, found: 'x' })
        ));
    }

    #[test]
    fn empty_pattern_is_rejected() {
        assert_eq!(Grid::from_pattern(&[], Rgb::WHITE), Err(GridError::EmptyPattern));
        assert_eq!(Grid::from_pattern(&[""], Rgb::WHITE), Err(GridError::EmptyPattern));
    }

    #[test]
    fn index_and_position_agree() {
        let grid = Grid::new(3, 4);
        assert_eq!(grid.index_of(2, 3), Some(11));
        assert_eq!(grid.position_of(11), Some((2, 3)));
        assert_eq!(grid.index_of(3, 0), None);
        assert_eq!(grid.index_of(0, 4), None);
        assert_eq!(grid.position_of(12), None);
    }

    #[test]
    fn set_out_of_range_is_rejected() {
        let mut grid = Grid::new(2, 2);
        assert!(grid.set(1, 1, Cell::newborn(Rgb::WHITE)));
        assert!(!grid.set(2, 0, Cell::newborn(Rgb::WHITE)));
        assert_eq!(grid.live_count(), 1);
    }

    #[test]
    fn from_cells_checks_length() {
        let result = Grid::from_cells(2, 2, vec![Cell::DEAD; 3]);
        assert_eq!(
            result,
            Err(GridError::CellCountMismatch {
                expected: 4,
                found: 3
            })
        );
    }
}
