//! A single cell of the simulation grid.
//!
//! A cell is either dead or alive. Live cells always carry [`Vitals`]: the
//! color they display and the number of generations they have been alive.
//! Dead cells carry neither. Holding the two together in one optional field
//! makes a live cell without a color unrepresentable.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Color and age of a live cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vitals {
    /// Displayed color.
    pub color: Rgb,
    /// Generations survived, starting at 1 on birth.
    pub age: u32,
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    vitals: Option<Vitals>,
}

impl Cell {
    /// A dead cell.
    pub const DEAD: Self = Self { vitals: None };

    /// A live cell with an explicit color and age.
    pub const fn alive(color: Rgb, age: u32) -> Self {
        Self {
            vitals: Some(Vitals { color, age }),
        }
    }

    /// A freshly born cell (age 1).
    pub const fn newborn(color: Rgb) -> Self {
        Self::alive(color, 1)
    }

    /// Whether the cell is alive.
    pub const fn is_alive(&self) -> bool {
        self.vitals.is_some()
    }

    /// The cell's color, present if and only if it is alive.
    pub fn color(&self) -> Option<Rgb> {
        self.vitals.map(|v| v.color)
    }

    /// The cell's age, present if and only if it is alive.
    pub fn age(&self) -> Option<u32> {
        self.vitals.map(|v| v.age)
    }

    /// The cell's vitals, if alive.
    pub const fn vitals(&self) -> Option<Vitals> {
        self.vitals
    }

    /// The same cell one generation older. Dead cells stay dead.
    #[must_use]
    pub fn aged(self) -> Self {
        Self {
            vitals: self.vitals.map(|v| Vitals {
                color: v.color,
                age: v.age.saturating_add(1),
            }),
        }
    }

    /// Flip the alive/dead state. A cell brought to life is a newborn of
    /// `color`; a cell killed loses its color and age.
    #[must_use]
    pub const fn toggled(self, color: Rgb) -> Self {
        if self.is_alive() {
            Self::DEAD
        } else {
            Self::newborn(color)
        }
    }
}
