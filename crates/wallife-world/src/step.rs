//! One generation of the birth/survival rule.
//!
//! A live cell with two or three live neighbors survives; a dead cell with
//! exactly three is born; everything else is or becomes dead. The new grid
//! is built from the old one without mutating it.
//!
//! With color mode on, births inherit a color from their parents through
//! [`genetics::newborn_color`] and survivors are saturated by age. With it
//! off, births take the solid foreground color and survivors only age.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;
use wallife_types::{Cell, Grid, Rgb};

use crate::genetics::{self, GeneticsParams};
use crate::neighborhood::{self, EdgeMode, Neighborhood};

/// Everything [`step`] needs besides the grid and randomness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRules {
    /// Edge topology for neighbor counting.
    pub edges: EdgeMode,
    /// Whether the genetic color pipeline is active.
    pub color_mode: bool,
    /// Color genetics parameters (used only in color mode).
    pub genetics: GeneticsParams,
    /// Color given to newborns when color mode is off.
    pub foreground: Rgb,
}

impl Default for StepRules {
    fn default() -> Self {
        Self {
            edges: EdgeMode::Wrap,
            color_mode: false,
            genetics: GeneticsParams::default(),
            foreground: Rgb::WHITE,
        }
    }
}

/// Compute the next generation of `grid`.
///
/// Randomness is drawn only for color-mode births.
pub fn step<R: Rng>(grid: &Grid, rules: &StepRules, rng: &mut R) -> Grid {
    let mut next = Grid::new(grid.rows(), grid.cols());

    for (index, cell) in grid.cells().iter().enumerate() {
        let Some((row, col)) = grid.position_of(index) else {
            continue;
        };
        let successor = if rules.color_mode {
            let hood = Neighborhood::collect(grid, row, col, rules.edges);
            colored_successor(*cell, &hood, &rules.genetics, rng)
        } else {
            let live = neighborhood::live_neighbors(grid, row, col, rules.edges);
            plain_successor(*cell, live, rules.foreground)
        };
        if let Some(slot) = next.cell_mut(index) {
            *slot = successor;
        }
    }

    trace!(
        rows = grid.rows(),
        cols = grid.cols(),
        live_before = grid.live_count(),
        live_after = next.live_count(),
        "Generation stepped"
    );
    next
}

/// Successor of one cell outside color mode.
fn plain_successor(cell: Cell, live_neighbors: u8, foreground: Rgb) -> Cell {
    match (cell.is_alive(), live_neighbors) {
        (true, 2 | 3) => cell.aged(),
        (false, 3) => Cell::newborn(foreground),
        _ => Cell::DEAD,
    }
}

/// Successor of one cell in color mode.
fn colored_successor<R: Rng>(
    cell: Cell,
    hood: &Neighborhood,
    params: &GeneticsParams,
    rng: &mut R,
) -> Cell {
    match (cell.vitals(), hood.live_count()) {
        (Some(vitals), 2 | 3) => {
            let age = vitals.age.saturating_add(1);
            let color = genetics::saturate(
                vitals.color,
                age,
                params.max_saturation_age,
                params.saturation_factor,
            );
            Cell::alive(color, age)
        }
        (None, 3) => Cell::newborn(genetics::newborn_color(hood, params, rng)),
        _ => Cell::DEAD,
    }
}
