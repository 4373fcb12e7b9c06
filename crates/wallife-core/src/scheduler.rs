//! The per-tick driver.
//!
//! A [`Scheduler`] owns the [`Settings`], the viewport layout, the shared
//! random source, and an explicit [`SimulationState`]. Each call to
//! [`Scheduler::tick`] with a monotonically increasing timestamp:
//!
//! 1. Advances a generation when no fade is running and a full cycle
//!    (`fade time + stable time`) has elapsed since the last advance. The
//!    stepped grid passes through stuck detection and recovery, and the
//!    accepted grid becomes the fade target (or is committed at once when the
//!    fade time is zero).
//! 2. Renders one frame, blending current and target while fading, and
//!    commits the target once fade progress reaches 1.
//!
//! Pausing is the host's concern: a paused host simply does not call
//! `tick`, so no state (including the last-advance timestamp) moves.

use rand::Rng;
use serde_json::{Map, Value};
use tracing::{debug, info};
use wallife_types::Grid;
use wallife_world::{random_grid, step};

use crate::bridge::{self, BridgeReport};
use crate::config::{Settings, Viewport};
use crate::layout::GridLayout;
use crate::recovery::{self, Recovered, RecoveryAction, RecoveryPolicy, RecoveryState};
use crate::render::{self, DrawSurface};
use crate::stuck::StuckDetector;

/// Current and target generations plus fade timing.
#[derive(Debug, Clone, PartialEq)]
pub struct FadeState {
    /// The committed generation.
    pub current: Grid,
    /// The generation being faded toward, cleared once committed.
    pub target: Option<Grid>,
    /// Whether a fade is in progress.
    pub fading: bool,
    /// Timestamp the running fade began at, in milliseconds.
    pub fade_start_ms: f64,
}

impl FadeState {
    /// A settled state showing `current` with no fade.
    pub const fn settled(current: Grid) -> Self {
        Self {
            current,
            target: None,
            fading: false,
            fade_start_ms: 0.0,
        }
    }

    /// Fade progress at `now_ms` for a fade lasting `fade_time_ms`, in `[0, 1]`.
    ///
    /// A non-positive fade time reports a finished fade.
    pub fn progress(&self, now_ms: f64, fade_time_ms: f64) -> f64 {
        if fade_time_ms <= 0.0 || fade_time_ms.is_nan() {
            return 1.0;
        }
        let p = (now_ms - self.fade_start_ms) / fade_time_ms;
        if p.is_nan() { 1.0 } else { p.clamp(0.0, 1.0) }
    }

    /// Promote the target, if any, to current and end the fade.
    fn commit(&mut self) {
        if let Some(target) = self.target.take() {
            self.current = target;
        }
        self.fading = false;
    }
}

/// Everything the scheduler carries from one tick to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    /// Grids and fade timing.
    pub fade: FadeState,
    /// Revival escalation counters.
    pub recovery: RecoveryState,
    /// Recent generation fingerprints.
    pub detector: StuckDetector,
    /// Timestamp of the most recent generation advance, in milliseconds.
    pub last_update_ms: f64,
    /// Generations advanced since the last full reset.
    pub generation: u64,
}

impl SimulationState {
    /// A fresh state showing `grid`, with all history cleared.
    pub fn new(grid: Grid, last_update_ms: f64) -> Self {
        Self {
            fade: FadeState::settled(grid),
            recovery: RecoveryState::default(),
            detector: StuckDetector::new(),
            last_update_ms,
            generation: 0,
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Timestamp the tick ran at, in milliseconds.
    pub timestamp_ms: f64,
    /// Generation number after the tick.
    pub generation: u64,
    /// Whether a new generation was computed on this tick.
    pub advanced: bool,
    /// Whether a target generation became current on this tick.
    pub committed: bool,
    /// The recovery decision, when a generation was computed.
    pub action: Option<RecoveryAction>,
    /// Fade progress rendered, when fading.
    pub fade_progress: Option<f64>,
    /// Number of cells filled on the surface.
    pub cells_drawn: usize,
    /// Layout the frame was drawn with.
    pub layout: GridLayout,
}

/// Drives stepping, recovery, and fade rendering for one viewport.
#[derive(Debug)]
pub struct Scheduler<R: Rng> {
    settings: Settings,
    viewport: Viewport,
    layout: GridLayout,
    state: SimulationState,
    rng: R,
}

impl<R: Rng> Scheduler<R> {
    /// Create a scheduler showing a freshly populated grid.
    ///
    /// `settings` are sanitized first. The first generation advances one
    /// full cycle after timestamp 0.
    pub fn new(settings: Settings, viewport: Viewport, mut rng: R) -> Self {
        let settings = settings.sanitized();
        let layout = GridLayout::from_viewport(viewport, &settings);
        let grid = populate(&layout, &settings, &mut rng);
        info!(
            rows = layout.rows,
            cols = layout.cols,
            live = grid.live_count(),
            "Simulation created"
        );
        Self {
            settings,
            viewport,
            layout,
            state: SimulationState::new(grid, 0.0),
            rng,
        }
    }

    /// Active settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current viewport.
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Current grid layout.
    pub const fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// The simulation state.
    pub const fn state(&self) -> &SimulationState {
        &self.state
    }

    /// The committed generation.
    pub const fn current(&self) -> &Grid {
        &self.state.fade.current
    }

    /// The generation being faded toward, if any.
    pub const fn target(&self) -> Option<&Grid> {
        self.state.fade.target.as_ref()
    }

    /// Generations advanced since the last reset.
    pub const fn generation(&self) -> u64 {
        self.state.generation
    }

    /// Run one tick at timestamp `now_ms` and draw the frame on `surface`.
    pub fn tick<S: DrawSurface + ?Sized>(&mut self, now_ms: f64, surface: &mut S) -> FrameReport {
        let fade_time = self.settings.fade_time_ms();
        let mut advanced = false;
        let mut committed = false;
        let mut action = None;

        let elapsed = now_ms - self.state.last_update_ms;
        if !self.state.fade.fading && elapsed >= self.settings.cycle_time_ms() {
            let recovered = self.advance();
            action = Some(recovered.action);
            advanced = true;
            self.state.last_update_ms = now_ms;

            if fade_time > 0.0 {
                let fade = &mut self.state.fade;
                fade.target = Some(recovered.grid);
                fade.fading = true;
                fade.fade_start_ms = now_ms;
            } else {
                self.state.fade.current = recovered.grid;
                self.state.fade.target = None;
                committed = true;
            }
        }

        let (cells_drawn, fade_progress) = if self.state.fade.fading {
            let p = self.state.fade.progress(now_ms, fade_time);
            let drawn = render::render_frame(
                &self.state.fade.current,
                self.state.fade.target.as_ref(),
                p,
                &self.settings,
                &self.layout,
                surface,
            );
            if p >= 1.0 {
                self.state.fade.commit();
                committed = true;
            }
            (drawn, Some(p))
        } else {
            let drawn = render::render_frame(
                &self.state.fade.current,
                None,
                1.0,
                &self.settings,
                &self.layout,
                surface,
            );
            (drawn, None)
        };

        FrameReport {
            timestamp_ms: now_ms,
            generation: self.state.generation,
            advanced,
            committed,
            action,
            fade_progress,
            cells_drawn,
            layout: self.layout,
        }
    }

    /// Step the current grid and run the result through recovery.
    fn advance(&mut self) -> Recovered {
        let rules = self.settings.step_rules();
        let proposed = step(&self.state.fade.current, &rules, &mut self.rng);
        let stuck = self.state.detector.is_stuck(&proposed);
        let policy = RecoveryPolicy::from_settings(&self.settings);
        let recovered = recovery::recover(
            proposed,
            stuck,
            &mut self.state.recovery,
            &mut self.state.detector,
            &policy,
            &mut self.rng,
        );

        if matches!(recovered.action, RecoveryAction::Reset(_)) {
            self.state.generation = 0;
        } else {
            self.state.generation = self.state.generation.saturating_add(1);
        }
        debug!(
            generation = self.state.generation,
            live = recovered.grid.live_count(),
            action = ?recovered.action,
            "Generation advanced"
        );
        recovered
    }

    /// Replace the simulation with a fresh random grid (pointer click).
    ///
    /// Clears fade, recovery, and history state. The cycle timer is left
    /// alone, so the new grid advances on the existing cadence.
    pub fn reset(&mut self) {
        let grid = populate(&self.layout, &self.settings, &mut self.rng);
        info!(
            rows = self.layout.rows,
            cols = self.layout.cols,
            live = grid.live_count(),
            "Simulation reset"
        );
        self.state = SimulationState::new(grid, self.state.last_update_ms);
    }

    /// Show `grid` as the current generation, clearing all other state.
    ///
    /// Returns `false` and changes nothing when `grid` does not match the
    /// current layout.
    pub fn load_grid(&mut self, grid: Grid) -> bool {
        if grid.rows() != self.layout.rows || grid.cols() != self.layout.cols {
            return false;
        }
        self.state = SimulationState::new(grid, self.state.last_update_ms);
        true
    }

    /// Adopt a new viewport and reset onto the recomputed grid.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.layout = GridLayout::from_viewport(viewport, &self.settings);
        debug!(
            width = viewport.width,
            height = viewport.height,
            rows = self.layout.rows,
            cols = self.layout.cols,
            "Viewport resized"
        );
        self.reset();
    }

    /// Replace the settings, resetting when the change invalidates the grid.
    ///
    /// Returns whether a reset happened.
    pub fn apply_settings(&mut self, settings: Settings) -> bool {
        let settings = settings.sanitized();
        let needs_reset = settings.requires_reset(&self.settings);
        self.settings = settings;
        if needs_reset {
            self.layout = GridLayout::from_viewport(self.viewport, &self.settings);
            self.reset();
        }
        needs_reset
    }

    /// Apply a batch of host property updates through the property table.
    pub fn apply_properties(&mut self, properties: &Map<String, Value>) -> BridgeReport {
        let (settings, mut report) = bridge::apply_properties(&self.settings, properties);
        report.reset = self.apply_settings(settings);
        report
    }
}

/// A random grid for `layout` under `settings`.
fn populate<R: Rng>(layout: &GridLayout, settings: &Settings, rng: &mut R) -> Grid {
    random_grid(
        layout.rows,
        layout.cols,
        settings.grid_population_percentage,
        settings.palette(),
        rng,
    )
}
