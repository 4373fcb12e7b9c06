//! Grid geometry derived from the viewport and cell settings.
//!
//! Each cell occupies a square "pitch" of `cell_size + cell_padding`
//! pixels. The grid fills as many whole pitches as fit across the viewport
//! width and down the viewport height minus the bottom margin. The drawn
//! square is inset by half the padding on each side.

use serde::{Deserialize, Serialize};

use crate::config::{Settings, Viewport};

/// An axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

/// Grid dimensions and cell placement for one viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridLayout {
    /// Number of rows (at least 1).
    pub rows: usize,
    /// Number of columns (at least 1).
    pub cols: usize,
    /// Drawn cell side in pixels.
    pub cell_size: u32,
    /// Gap between cells in pixels.
    pub padding: u32,
}

impl GridLayout {
    /// Compute the layout for `viewport` under `settings`.
    ///
    /// Degenerate results (a viewport smaller than one pitch) are floored
    /// to a single row or column.
    pub fn from_viewport(viewport: Viewport, settings: &Settings) -> Self {
        let pitch = settings.cell_size.saturating_add(settings.cell_padding).max(1);
        let usable_height = viewport.height.saturating_sub(settings.bottom_margin);
        let cols = viewport.width.checked_div(pitch).unwrap_or(0).max(1);
        let rows = usable_height.checked_div(pitch).unwrap_or(0).max(1);
        Self {
            rows: usize::try_from(rows).unwrap_or(1),
            cols: usize::try_from(cols).unwrap_or(1),
            cell_size: settings.cell_size,
            padding: settings.cell_padding,
        }
    }

    /// Distance between the origins of adjacent cells.
    pub const fn pitch(&self) -> u32 {
        self.cell_size.saturating_add(self.padding)
    }

    /// Total number of cells.
    pub const fn cell_count(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    /// The rectangle cell `(row, col)` is drawn into.
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_rect(&self, row: usize, col: usize) -> Rect {
        let pitch = f64::from(self.pitch());
        let inset = f64::from(self.padding) / 2.0;
        let size = f64::from(self.cell_size);
        Rect {
            x: (col as f64).mul_add(pitch, inset),
            y: (row as f64).mul_add(pitch, inset),
            w: size,
            h: size,
        }
    }

    /// The cell whose pitch square contains the point `(x, y)`, if any.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn cell_at(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if x.is_nan() || y.is_nan() || x < 0.0 || y < 0.0 {
            return None;
        }
        let pitch = f64::from(self.pitch().max(1));
        // Non-negative and finite-checked above; `as` saturates on overflow.
        let col = (x / pitch).floor() as usize;
        let row = (y / pitch).floor() as usize;
        (row < self.rows && col < self.cols).then_some((row, col))
    }
}
