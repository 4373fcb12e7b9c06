//! Moore-neighborhood enumeration.
//!
//! Every cell has eight neighbors. Under [`EdgeMode::Wrap`] coordinates are
//! taken modulo the grid dimensions, so the grid behaves as a torus; on
//! very small grids this means a cell can be its own neighbor. Under
//! [`EdgeMode::Clip`] neighbors that fall outside the grid are skipped.

use serde::{Deserialize, Serialize};
use wallife_types::{Cell, Grid, Rgb};

/// Edge topology for neighbor lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeMode {
    /// Toroidal: lookups past an edge wrap to the opposite edge.
    Wrap,
    /// Bounded: lookups past an edge see nothing.
    Clip,
}

impl EdgeMode {
    /// Map the `edge_wrapping` toggle onto a topology.
    pub const fn from_wrapping(edge_wrapping: bool) -> Self {
        if edge_wrapping { Self::Wrap } else { Self::Clip }
    }
}

/// Relative offsets of the eight Moore neighbors, as `(d_row, d_col)`.
const OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Move `pos` by `delta` (one of -1, 0, 1) within `0..len`.
fn shift(pos: usize, delta: i8, len: usize, edges: EdgeMode) -> Option<usize> {
    match (delta, edges) {
        (0, _) => Some(pos),
        (d, EdgeMode::Wrap) if d < 0 => pos.checked_add(len)?.checked_sub(1)?.checked_rem(len),
        (_, EdgeMode::Wrap) => pos.checked_add(1)?.checked_rem(len),
        (d, EdgeMode::Clip) if d < 0 => pos.checked_sub(1),
        (_, EdgeMode::Clip) => pos.checked_add(1).filter(|&p| p < len),
    }
}

/// Call `visit` once for each of the (up to eight) neighbors of `(row, col)`.
pub fn for_each_neighbor(
    grid: &Grid,
    row: usize,
    col: usize,
    edges: EdgeMode,
    mut visit: impl FnMut(&Cell),
) {
    for &(d_row, d_col) in &OFFSETS {
        let neighbor_row = shift(row, d_row, grid.rows(), edges);
        let neighbor_col = shift(col, d_col, grid.cols(), edges);
        if let (Some(r), Some(c)) = (neighbor_row, neighbor_col) {
            if let Some(cell) = grid.get(r, c) {
                visit(cell);
            }
        }
    }
}

/// Count the live neighbors of `(row, col)`.
pub fn live_neighbors(grid: &Grid, row: usize, col: usize, edges: EdgeMode) -> u8 {
    let mut count: u8 = 0;
    for_each_neighbor(grid, row, col, edges, |cell| {
        if cell.is_alive() {
            count = count.saturating_add(1);
        }
    });
    count
}

/// Colors and ages of the live neighbors of one cell.
///
/// `colors` and `ages` are parallel: entry `i` of each describes the same
/// neighbor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Neighborhood {
    /// Colors of live neighbors.
    pub colors: Vec<Rgb>,
    /// Ages of live neighbors.
    pub ages: Vec<Option<u32>>,
}

impl Neighborhood {
    /// Collect the live neighbors of `(row, col)`.
    pub fn collect(grid: &Grid, row: usize, col: usize, edges: EdgeMode) -> Self {
        let mut hood = Self {
            colors: Vec::with_capacity(OFFSETS.len()),
            ages: Vec::with_capacity(OFFSETS.len()),
        };
        for_each_neighbor(grid, row, col, edges, |cell| {
            if let Some(vitals) = cell.vitals() {
                hood.colors.push(vitals.color);
                hood.ages.push(Some(vitals.age));
            }
        });
        hood
    }

    /// Number of live neighbors.
    pub fn live_count(&self) -> u8 {
        u8::try_from(self.colors.len()).unwrap_or(u8::MAX)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> Grid {
        Grid::from_pattern(rows, Rgb::WHITE).unwrap()
    }

    #[test]
    fn interior_cell_sees_all_eight() {
        let g = grid(&["###", "#.#", "###"]);
        assert_eq!(live_neighbors(&g, 1, 1, EdgeMode::Clip), 8);
        assert_eq!(live_neighbors(&g, 1, 1, EdgeMode::Wrap), 8);
    }

    #[test]
    fn clipped_corner_sees_three() {
        let g = grid(&["###", "###", "###"]);
        assert_eq!(live_neighbors(&g, 0, 0, EdgeMode::Clip), 3);
        assert_eq!(live_neighbors(&g, 2, 2, EdgeMode::Clip), 3);
    }

    #[test]
    fn wrapped_corner_reaches_opposite_edges() {
        let g = grid(&["....", "...#", "....", "#..#"]);
        // (0,0) wraps onto (3,3), (3,0), and (1,3).
        assert_eq!(live_neighbors(&g, 0, 0, EdgeMode::Wrap), 3);
        assert_eq!(live_neighbors(&g, 0, 0, EdgeMode::Clip), 0);
    }

    #[test]
    fn one_by_one_wrapped_cell_neighbors_itself() {
        let g = grid(&["#"]);
        assert_eq!(live_neighbors(&g, 0, 0, EdgeMode::Wrap), 8);
        assert_eq!(live_neighbors(&g, 0, 0, EdgeMode::Clip), 0);
    }

    #[test]
    fn neighborhood_collects_parallel_colors_and_ages() {
        let mut g = Grid::new(3, 3);
        g.set(0, 0, Cell::alive(Rgb::new(255, 0, 0), 4));
        g.set(2, 2, Cell::alive(Rgb::new(0, 0, 255), 2));
        let hood = Neighborhood::collect(&g, 1, 1, EdgeMode::Clip);
        assert_eq!(hood.live_count(), 2);
        assert_eq!(hood.colors, vec![Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)]);
        assert_eq!(hood.ages, vec![Some(4), Some(2)]);
    }

    #[test]
    fn wrapping_maps_from_edge_toggle() {
        assert_eq!(EdgeMode::from_wrapping(true), EdgeMode::Wrap);
        assert_eq!(EdgeMode::from_wrapping(false), EdgeMode::Clip);
    }
}
