//! Recovery from stuck and extinct generations.
//!
//! Once the [`StuckDetector`] has classified a proposed generation, the
//! recovery policy decides what the scheduler actually shows next:
//!
//! 1. Extinct: reset to a fresh random grid, whatever the settings say.
//! 2. Not stuck: accept the generation and forget any escalation.
//! 3. Stuck with `hard_reset_on_stuck`: reset.
//! 4. Stuck without `try_revive_stuck_sim`: accept the stuck generation.
//!    The display then freezes on the cycle until the settings change.
//! 5. Otherwise revive: flip `fibonacci(k)` random cells on the `k`-th
//!    consecutive stuck generation, resetting once the attempt budget or
//!    one third of the grid is exceeded.
//!
//! A reset always zeroes the counters and clears the detector history.
//!
//! [`StuckDetector`]: crate::stuck::StuckDetector

use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use wallife_types::Grid;
use wallife_world::{Palette, random_grid};

use crate::config::Settings;
use crate::stuck::StuckDetector;

/// The `n`-th term of the escalation sequence: 1, 1, 2, 3, 5, 8, ...
///
/// Saturates at `u64::MAX`.
pub const fn fibonacci(n: u32) -> u64 {
    let mut previous: u64 = 1;
    let mut current: u64 = 1;
    let mut i: u32 = 1;
    while i < n {
        let next = previous.saturating_add(current);
        previous = current;
        current = next;
        i = i.saturating_add(1);
    }
    current
}

/// Escalation counters carried between generations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryState {
    /// Consecutive stuck generations handled by revival.
    pub stuck_counter: u32,
    /// Index into the Fibonacci sequence for the next revival size.
    pub fibonacci_index: u32,
}

impl RecoveryState {
    /// Zero both counters.
    pub const fn reset(&mut self) {
        self.stuck_counter = 0;
        self.fibonacci_index = 0;
    }

    /// Current controller phase.
    pub const fn phase(&self) -> RecoveryPhase {
        if self.stuck_counter == 0 {
            RecoveryPhase::Normal
        } else {
            RecoveryPhase::Reviving
        }
    }
}

/// Controller phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecoveryPhase {
    /// Generations are progressing.
    Normal,
    /// Consecutive stuck generations are being perturbed.
    Reviving,
    /// The grid was just replaced by a fresh population.
    Reset,
}

/// Why the grid was replaced by a fresh population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResetReason {
    /// No live cells remained.
    Extinction,
    /// Stuck with `hard_reset_on_stuck` enabled.
    HardReset,
    /// More consecutive stuck generations than `max_revival_attempts`.
    AttemptsExhausted,
    /// The next revival would flip more than a third of the grid.
    EscalationLimit,
}

/// What recovery did with a proposed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecoveryAction {
    /// The generation progressed and was accepted as-is.
    Accepted,
    /// The generation was stuck and accepted unchanged (revival disabled).
    AcceptedStuck,
    /// The generation was stuck and this many cells were flipped.
    Revived {
        /// Number of cells toggled.
        cells_flipped: u64,
    },
    /// The generation was replaced by a fresh random grid.
    Reset(ResetReason),
}

impl RecoveryAction {
    /// The phase this action leaves the controller in.
    pub const fn phase(&self) -> RecoveryPhase {
        match self {
            Self::Accepted | Self::AcceptedStuck => RecoveryPhase::Normal,
            Self::Revived { .. } => RecoveryPhase::Reviving,
            Self::Reset(_) => RecoveryPhase::Reset,
        }
    }
}

/// The subset of [`Settings`] recovery depends on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecoveryPolicy {
    /// Perturb stuck generations.
    pub try_revive: bool,
    /// Reset on any stuck generation.
    pub hard_reset: bool,
    /// Revival attempts before a forced reset.
    pub max_revival_attempts: u32,
    /// Live-cell density of a reset grid.
    pub density: f64,
    /// Colors for reset and revived cells.
    pub palette: Palette,
}

impl RecoveryPolicy {
    /// Extract the recovery policy from the runtime settings.
    pub const fn from_settings(settings: &Settings) -> Self {
        Self {
            try_revive: settings.try_revive_stuck_sim,
            hard_reset: settings.hard_reset_on_stuck,
            max_revival_attempts: settings.max_revival_attempts,
            density: settings.grid_population_percentage,
            palette: settings.palette(),
        }
    }
}

/// The generation recovery decided to show, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    /// The accepted next generation.
    pub grid: Grid,
    /// What was done to produce it.
    pub action: RecoveryAction,
}

/// Build a fresh population with the dimensions of `like` and clear all
/// escalation state.
pub fn reset_grid<R: Rng>(
    like: &Grid,
    state: &mut RecoveryState,
    detector: &mut StuckDetector,
    policy: &RecoveryPolicy,
    rng: &mut R,
) -> Grid {
    state.reset();
    detector.clear();
    random_grid(like.rows(), like.cols(), policy.density, policy.palette, rng)
}

/// Decide what to show after `proposed`, which the detector classified as
/// `stuck`.
pub fn recover<R: Rng>(
    proposed: Grid,
    stuck: bool,
    state: &mut RecoveryState,
    detector: &mut StuckDetector,
    policy: &RecoveryPolicy,
    rng: &mut R,
) -> Recovered {
    if proposed.is_extinct() {
        return reset_with(ResetReason::Extinction, &proposed, state, detector, policy, rng);
    }

    if !stuck {
        state.reset();
        return Recovered {
            grid: proposed,
            action: RecoveryAction::Accepted,
        };
    }

    if policy.hard_reset {
        return reset_with(ResetReason::HardReset, &proposed, state, detector, policy, rng);
    }

    if !policy.try_revive {
        return Recovered {
            grid: proposed,
            action: RecoveryAction::AcceptedStuck,
        };
    }

    state.stuck_counter = state.stuck_counter.saturating_add(1);
    if state.stuck_counter > policy.max_revival_attempts {
        return reset_with(
            ResetReason::AttemptsExhausted,
            &proposed,
            state,
            detector,
            policy,
            rng,
        );
    }

    let cells_to_flip = fibonacci(state.fibonacci_index);
    let total = u64::try_from(proposed.len()).unwrap_or(u64::MAX);
    if cells_to_flip.saturating_mul(3) > total {
        return reset_with(
            ResetReason::EscalationLimit,
            &proposed,
            state,
            detector,
            policy,
            rng,
        );
    }

    let grid = perturb(proposed, cells_to_flip, policy.palette, rng);
    state.fibonacci_index = state.fibonacci_index.saturating_add(1);
    debug!(
        cells_flipped = cells_to_flip,
        stuck_counter = state.stuck_counter,
        fibonacci_index = state.fibonacci_index,
        "Reviving stuck simulation"
    );
    Recovered {
        grid,
        action: RecoveryAction::Revived {
            cells_flipped: cells_to_flip,
        },
    }
}

/// Reset for `reason`, logging the replacement.
fn reset_with<R: Rng>(
    reason: ResetReason,
    proposed: &Grid,
    state: &mut RecoveryState,
    detector: &mut StuckDetector,
    policy: &RecoveryPolicy,
    rng: &mut R,
) -> Recovered {
    info!(
        ?reason,
        rows = proposed.rows(),
        cols = proposed.cols(),
        "Resetting simulation"
    );
    Recovered {
        grid: reset_grid(proposed, state, detector, policy, rng),
        action: RecoveryAction::Reset(reason),
    }
}

/// Toggle `count` distinct, uniformly chosen cells of `grid`.
///
/// Cells brought to life are newborns colored from `palette`.
fn perturb<R: Rng>(mut grid: Grid, count: u64, palette: Palette, rng: &mut R) -> Grid {
    let amount = usize::try_from(count).unwrap_or(usize::MAX).min(grid.len());
    for cell_index in index::sample(rng, grid.len(), amount) {
        let color = palette.draw(rng);
        if let Some(cell) = grid.cell_mut(cell_index) {
            *cell = cell.toggled(color);
        }
    }
    grid
}
