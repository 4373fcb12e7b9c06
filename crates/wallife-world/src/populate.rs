//! Random populations.
//!
//! Used for the initial grid and for every full reset, and for cells that
//! a revival perturbation brings to life without parents.

use rand::Rng;
use serde::{Deserialize, Serialize};
use wallife_types::{Cell, Grid, Rgb};

use crate::genetics;

/// Where parentless cells get their color from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Palette {
    /// A fresh uniformly random color per cell (color mode).
    Random,
    /// One fixed color for every cell (monochrome mode).
    Solid(Rgb),
}

impl Palette {
    /// Draw a color for one parentless cell.
    pub fn draw<R: Rng>(self, rng: &mut R) -> Rgb {
        match self {
            Self::Random => genetics::random_color(rng),
            Self::Solid(color) => color,
        }
    }
}

/// Build a `rows x cols` grid where each cell is alive with probability
/// `density`. Live cells are newborns colored from `palette`.
///
/// `density` outside `[0, 1]` behaves as the nearest bound.
pub fn random_grid<R: Rng>(
    rows: usize,
    cols: usize,
    density: f64,
    palette: Palette,
    rng: &mut R,
) -> Grid {
    let mut grid = Grid::new(rows, cols);
    for index in 0..grid.len() {
        let roll: f64 = rng.random();
        if roll < density {
            let color = palette.draw(rng);
            if let Some(cell) = grid.cell_mut(index) {
                *cell = Cell::newborn(color);
            }
        }
    }
    grid
}
