//! Per-frame cell appearance and fade blending.
//!
//! Every cell resolves to a display [`CellAppearance`]: live cells are
//! opaque in their own color; dead cells are either invisible or, with
//! neighbor opacity enabled, a translucent "ghost" whose opacity grows
//! with the number of live neighbors. During a fade the appearances of the
//! current and target generations are interpolated linearly. Only cells
//! with a positive resulting opacity are drawn.

use serde::{Deserialize, Serialize};
use wallife_types::{Grid, Rgb, Rgba};
use wallife_world::genetics;
use wallife_world::neighborhood::{self, Neighborhood};

use crate::config::Settings;
use crate::layout::{GridLayout, Rect};

/// Opacity ceiling for ghosted dead cells.
pub const MAX_GHOST_ALPHA: f64 = 0.8;

/// The minimal 2D drawing contract the renderer needs.
pub trait DrawSurface {
    /// Clear the whole canvas to `color`.
    fn clear(&mut self, color: Rgb);

    /// Fill a rounded rectangle.
    fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, color: Rgba);
}

/// Display color and opacity of one cell, with unrounded channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellAppearance {
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
    /// Red channel, 0-255.
    pub r: f64,
    /// Green channel, 0-255.
    pub g: f64,
    /// Blue channel, 0-255.
    pub b: f64,
}

impl CellAppearance {
    /// `color` at opacity `alpha`.
    pub fn new(color: Rgb, alpha: f64) -> Self {
        Self {
            alpha,
            r: f64::from(color.r),
            g: f64::from(color.g),
            b: f64::from(color.b),
        }
    }

    /// Linear interpolation toward `target` at progress `p`.
    ///
    /// `p = 0` returns `self` exactly and `p = 1` returns `target` exactly.
    #[must_use]
    pub fn blend(self, target: Self, p: f64) -> Self {
        let mix = |from: f64, to: f64| from.mul_add(1.0 - p, to * p);
        Self {
            alpha: mix(self.alpha, target.alpha),
            r: mix(self.r, target.r),
            g: mix(self.g, target.g),
            b: mix(self.b, target.b),
        }
    }

    /// Quantize into a surface color.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_rgba(self) -> Rgba {
        // Clamped to [0, 255] first, so the casts are exact.
        let channel = |v: f64| if v.is_nan() { 0 } else { v.round().clamp(0.0, 255.0) as u8 };
        Rgba {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
            a: if self.alpha.is_nan() { 0.0 } else { self.alpha.clamp(0.0, 1.0) },
        }
    }
}

/// Appearance of cell `(row, col)` of `grid` on its own.
///
/// Out-of-range positions are invisible.
pub fn cell_appearance(grid: &Grid, row: usize, col: usize, settings: &Settings) -> CellAppearance {
    let Some(cell) = grid.get(row, col) else {
        return CellAppearance::new(settings.background_color, 0.0);
    };

    if let Some(color) = cell.color() {
        let shown = if settings.color_mode {
            color
        } else {
            settings.foreground_color
        };
        return CellAppearance::new(shown, 1.0);
    }

    if !settings.neighbor_opacity_enabled {
        return CellAppearance::new(settings.background_color, 0.0);
    }

    let edges = settings.edge_mode();
    let (live, color) = if settings.color_mode {
        let hood = Neighborhood::collect(grid, row, col, edges);
        (hood.live_count(), genetics::average_colors(&hood.colors))
    } else {
        (
            neighborhood::live_neighbors(grid, row, col, edges),
            settings.foreground_color,
        )
    };
    let alpha = (f64::from(live) * settings.neighbor_opacity_increment).min(MAX_GHOST_ALPHA);
    CellAppearance::new(color, alpha)
}

/// Draw one frame.
///
/// With a `target` of the same shape as `current`, each cell blends from
/// its current to its target appearance at `progress` (clamped to
/// `[0, 1]`). Without one, only `current` is drawn. Returns the number of
/// cells filled.
pub fn render_frame<S: DrawSurface + ?Sized>(
    current: &Grid,
    target: Option<&Grid>,
    progress: f64,
    settings: &Settings,
    layout: &GridLayout,
    surface: &mut S,
) -> usize {
    surface.clear(settings.background_color);

    let p = if progress.is_nan() { 1.0 } else { progress.clamp(0.0, 1.0) };
    let target = target.filter(|t| t.same_shape(current));
    let mut drawn: usize = 0;

    for index in 0..current.len() {
        let Some((row, col)) = current.position_of(index) else {
            continue;
        };
        let from = cell_appearance(current, row, col, settings);
        let shown = match target {
            Some(next) => from.blend(cell_appearance(next, row, col, settings), p),
            None => from,
        };
        if shown.alpha > 0.0 {
            surface.fill_rounded_rect(
                layout.cell_rect(row, col),
                settings.cell_corner_radius,
                shown.to_rgba(),
            );
            drawn = drawn.saturating_add(1);
        }
    }
    drawn
}

/// A drawing command captured by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    /// Canvas cleared to a color.
    Clear(Rgb),
    /// Rounded rectangle filled.
    FillRoundedRect {
        /// Target rectangle.
        rect: Rect,
        /// Corner radius.
        radius: f64,
        /// Fill color.
        color: Rgba,
    },
}

/// A surface that keeps the commands of the most recent frame.
///
/// Each [`clear`](DrawSurface::clear) starts a new frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    /// Create an empty recorder.
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Commands of the most recent frame, beginning with its clear.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of fills in the most recent frame.
    pub fn fill_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRoundedRect { .. }))
            .count()
    }
}

impl DrawSurface for RecordingSurface {
    fn clear(&mut self, color: Rgb) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::FillRoundedRect {
            rect,
            radius,
            color,
        });
    }
}
