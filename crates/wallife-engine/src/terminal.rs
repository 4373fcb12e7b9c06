//! Terminal surface for the headless engine.
//!
//! Frames are recorded with [`RecordingSurface`] and turned into text by
//! mapping each filled cell's opacity onto a character ramp, from blank for
//! invisible cells to `@` for opaque ones.

use std::io::Write;

use tracing::warn;
use wallife_core::layout::GridLayout;
use wallife_core::render::{DrawCommand, RecordingSurface};
use wallife_core::runner::FrameCallback;
use wallife_core::scheduler::FrameReport;

/// Glyphs by increasing opacity.
pub const RAMP: &[u8] = b" .:-=+*#%@";

/// Glyph for a cell drawn at `alpha`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn alpha_glyph(alpha: f64) -> char {
    if alpha.is_nan() {
        return ' ';
    }
    let last = RAMP.len().saturating_sub(1);
    // Clamped to [0, 1] and scaled by a small constant, so the cast is exact.
    let index = (alpha.clamp(0.0, 1.0) * 9.0).round() as usize;
    RAMP.get(index.min(last)).map_or(' ', |b| char::from(*b))
}

/// Render recorded fills as one string per grid row.
pub fn ascii_frame(commands: &[DrawCommand], layout: &GridLayout) -> Vec<String> {
    let mut canvas = vec![vec![' '; layout.cols]; layout.rows];
    for command in commands {
        let DrawCommand::FillRoundedRect { rect, color, .. } = command else {
            continue;
        };
        let center_x = rect.w.mul_add(0.5, rect.x);
        let center_y = rect.h.mul_add(0.5, rect.y);
        if let Some((row, col)) = layout.cell_at(center_x, center_y) {
            if let Some(slot) = canvas.get_mut(row).and_then(|cells| cells.get_mut(col)) {
                *slot = alpha_glyph(color.a);
            }
        }
    }
    canvas.into_iter().map(|cells| cells.into_iter().collect()).collect()
}

/// Frame callback that prints each committed generation.
pub struct TerminalPrinter<W> {
    enabled: bool,
    out: W,
}

impl<W: Write + Send> TerminalPrinter<W> {
    /// Create a printer writing to `out`; a disabled printer writes nothing.
    pub const fn new(enabled: bool, out: W) -> Self {
        Self { enabled, out }
    }

    /// Consume the printer, returning its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn print(&mut self, report: &FrameReport, surface: &RecordingSurface) -> std::io::Result<()> {
        writeln!(
            self.out,
            "-- generation {} ({} cells) --",
            report.generation, report.cells_drawn
        )?;
        for line in ascii_frame(surface.commands(), &report.layout) {
            writeln!(self.out, "{}", line.trim_end())?;
        }
        self.out.flush()
    }
}

impl<W: Write + Send> FrameCallback<RecordingSurface> for TerminalPrinter<W> {
    fn on_frame(&mut self, report: &FrameReport, surface: &RecordingSurface) {
        if !self.enabled || !report.committed {
            return;
        }
        if let Err(error) = self.print(report, surface) {
            warn!(%error, "Terminal output failed, disabling frame printing");
            self.enabled = false;
        }
    }
}
