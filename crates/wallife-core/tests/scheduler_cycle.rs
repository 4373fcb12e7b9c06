//! Integration tests driving the scheduler through complete fade cycles.
//!
//! Every test uses a 6x10 grid (100x60 viewport, 10 px cells, no padding)
//! and, unless stated otherwise, a 1000 ms cycle: a 500 ms fade followed by
//! a 500 ms hold.

// Integration tests use unwrap extensively for clarity -- panicking on
// failure is the correct behavior in test code.
#![allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wallife_core::config::{Settings, Viewport};
use wallife_core::recovery::{RecoveryAction, ResetReason};
use wallife_core::render::{DrawCommand, RecordingSurface};
use wallife_core::scheduler::{FrameReport, Scheduler};
use wallife_types::{Grid, Rgb};

// =============================================================================
// Helpers
// =============================================================================

fn settings() -> Settings {
    Settings {
        cell_size: 10,
        cell_padding: 0,
        simulation_speed: 1000.0,
        fade_amount: 0.5,
        stable_display_time: 500.0,
        ..Settings::default()
    }
}

fn scheduler(settings: Settings, seed: u64) -> Scheduler<SmallRng> {
    Scheduler::new(settings, Viewport::new(100, 60), SmallRng::seed_from_u64(seed))
}

fn pattern(rows: &[&str]) -> Grid {
    Grid::from_pattern(rows, Rgb::new(40, 160, 220)).unwrap()
}

fn blinker() -> Grid {
    pattern(&[
        "..........",
        "..........",
        "...###....",
        "..........",
        "..........",
        "..........",
    ])
}

fn block() -> Grid {
    pattern(&[
        "..........",
        "..........",
        "....##....",
        "....##....",
        "..........",
        "..........",
    ])
}

fn lonely() -> Grid {
    pattern(&[
        "..........",
        "..........",
        ".....#....",
        "..........",
        "..........",
        "..........",
    ])
}

/// Advance one generation at `start` and finish its fade. Returns the
/// advancing report and the committing report.
fn cycle(
    scheduler: &mut Scheduler<SmallRng>,
    surface: &mut RecordingSurface,
    start: f64,
) -> (FrameReport, FrameReport) {
    let begin = scheduler.tick(start, surface);
    let end = scheduler.tick(start + scheduler.settings().fade_time_ms(), surface);
    (begin, end)
}

fn cells_differing(a: &Grid, b: &Grid) -> usize {
    a.cells()
        .iter()
        .zip(b.cells())
        .filter(|(x, y)| x.is_alive() != y.is_alive())
        .count()
}

// =============================================================================
// Fade cycles
// =============================================================================

#[test]
fn blinker_oscillates_across_cycles() {
    let mut s = scheduler(settings(), 1);
    assert!(s.load_grid(blinker()));
    let mut surface = RecordingSurface::new();

    let horizontal = blinker().to_pattern();
    let (begin, end) = cycle(&mut s, &mut surface, 1000.0);
    assert!(begin.advanced && end.committed);
    let vertical = s.current().to_pattern();
    assert_ne!(vertical, horizontal);

    cycle(&mut s, &mut surface, 2000.0);
    assert_eq!(s.current().to_pattern(), horizontal);
    assert_eq!(s.generation(), 2);
}

#[test]
fn mid_fade_frame_blends_both_generations() {
    let mut s = scheduler(settings(), 2);
    assert!(s.load_grid(blinker()));
    let mut surface = RecordingSurface::new();

    s.tick(1000.0, &mut surface);
    let report = s.tick(1250.0, &mut surface);
    assert_eq!(report.fade_progress, Some(0.5));

    let mut alphas: Vec<f64> = surface
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::FillRoundedRect { color, .. } => Some(color.a),
            DrawCommand::Clear(_) => None,
        })
        .collect();
    alphas.sort_by(f64::total_cmp);

    // The center survives (opaque); two arms die and two are born (half).
    assert_eq!(alphas.len(), 5);
    assert_eq!(alphas.iter().filter(|a| (**a - 0.5).abs() < 1e-9).count(), 4);
    assert_eq!(alphas.last().copied(), Some(1.0));
}

#[test]
fn zero_fade_commits_every_cycle() {
    let mut s = scheduler(
        Settings {
            fade_amount: 0.0,
            ..settings()
        },
        3,
    );
    assert!(s.load_grid(blinker()));
    let mut surface = RecordingSurface::new();

    for k in 1..=4_u32 {
        let report = s.tick(f64::from(k) * 500.0, &mut surface);
        assert!(report.advanced);
        assert!(report.committed);
        assert!(report.fade_progress.is_none());
        assert!(s.target().is_none());
    }
}

#[test]
fn same_seed_reproduces_the_run() {
    let mut a = scheduler(settings(), 99);
    let mut b = scheduler(settings(), 99);
    assert_eq!(a.current(), b.current());

    let mut surface = RecordingSurface::new();
    for k in 1..=20_u32 {
        let t = f64::from(k) * 1000.0;
        let ra = cycle(&mut a, &mut surface, t);
        let rb = cycle(&mut b, &mut surface, t);
        assert_eq!(ra.0.action, rb.0.action);
        assert_eq!(a.current(), b.current());
    }
}

// =============================================================================
// Recovery through the scheduler
// =============================================================================

#[test]
fn still_life_is_revived_with_one_flip() {
    let mut s = scheduler(settings(), 4);
    assert!(s.load_grid(block()));
    let mut surface = RecordingSurface::new();

    let (first, _) = cycle(&mut s, &mut surface, 1000.0);
    assert_eq!(first.action, Some(RecoveryAction::Accepted));

    let begin = s.tick(2000.0, &mut surface);
    assert_eq!(begin.action, Some(RecoveryAction::Revived { cells_flipped: 1 }));
    assert_eq!(cells_differing(s.target().unwrap(), &block()), 1);
    assert_eq!(s.state().recovery.stuck_counter, 1);
    assert_eq!(s.state().recovery.fibonacci_index, 1);
}

#[test]
fn hard_reset_replaces_stuck_grid() {
    let mut s = scheduler(
        Settings {
            hard_reset_on_stuck: true,
            ..settings()
        },
        5,
    );
    assert!(s.load_grid(block()));
    let mut surface = RecordingSurface::new();

    cycle(&mut s, &mut surface, 1000.0);
    let begin = s.tick(2000.0, &mut surface);
    assert_eq!(begin.action, Some(RecoveryAction::Reset(ResetReason::HardReset)));
    assert_eq!(begin.generation, 0);
    assert!(s.state().detector.is_empty());
}

#[test]
fn zero_revival_attempts_resets_at_first_stuck() {
    let mut s = scheduler(
        Settings {
            max_revival_attempts: 0,
            ..settings()
        },
        6,
    );
    assert!(s.load_grid(block()));
    let mut surface = RecordingSurface::new();

    cycle(&mut s, &mut surface, 1000.0);
    let begin = s.tick(2000.0, &mut surface);
    assert_eq!(
        begin.action,
        Some(RecoveryAction::Reset(ResetReason::AttemptsExhausted))
    );
    assert_eq!(s.state().recovery.stuck_counter, 0);
}

#[test]
fn extinction_resets_with_every_recovery_toggle_off() {
    let mut s = scheduler(
        Settings {
            try_revive_stuck_sim: false,
            hard_reset_on_stuck: false,
            ..settings()
        },
        7,
    );
    assert!(s.load_grid(lonely()));
    let mut surface = RecordingSurface::new();

    let (begin, end) = cycle(&mut s, &mut surface, 1000.0);
    assert_eq!(begin.action, Some(RecoveryAction::Reset(ResetReason::Extinction)));
    assert!(end.committed);
    assert_eq!(s.current().rows(), 6);
    assert_eq!(s.current().cols(), 10);
    assert!(!s.current().is_extinct());
}

#[test]
fn freeze_mode_keeps_cycling_without_intervention() {
    let mut s = scheduler(
        Settings {
            try_revive_stuck_sim: false,
            ..settings()
        },
        8,
    );
    assert!(s.load_grid(blinker()));
    let mut surface = RecordingSurface::new();

    let actions: Vec<Option<RecoveryAction>> = (1..=5_u32)
        .map(|k| cycle(&mut s, &mut surface, f64::from(k) * 1000.0).0.action)
        .collect();
    assert_eq!(actions[0], Some(RecoveryAction::Accepted));
    assert_eq!(actions[1], Some(RecoveryAction::Accepted));
    assert!(
        actions[2..]
            .iter()
            .all(|a| *a == Some(RecoveryAction::AcceptedStuck))
    );
    // Period 2: after an odd number of generations the blinker is vertical.
    assert_ne!(s.current().to_pattern(), blinker().to_pattern());
    assert_eq!(s.current().live_count(), 3);
}

// =============================================================================
// Host-driven resets
// =============================================================================

#[test]
fn click_mid_fade_drops_the_target() {
    let mut s = scheduler(settings(), 9);
    assert!(s.load_grid(blinker()));
    let mut surface = RecordingSurface::new();

    s.tick(1000.0, &mut surface);
    assert!(s.target().is_some());
    s.reset();
    assert!(s.target().is_none());

    let report = s.tick(1100.0, &mut surface);
    assert!(!report.advanced);
    assert!(report.fade_progress.is_none());
    assert_eq!(report.generation, 0);
}

#[test]
fn color_change_applies_without_reset() {
    let mut s = scheduler(
        Settings {
            color_mode: false,
            ..settings()
        },
        10,
    );
    assert!(s.load_grid(block()));
    let mut surface = RecordingSurface::new();

    let props = serde_json::json!({ "foreground_color": "#ff0000" });
    let report = s.apply_properties(props.as_object().unwrap());
    assert!(!report.reset);
    assert_eq!(s.current(), &block());

    s.tick(0.0, &mut surface);
    let fills: Vec<Rgb> = surface
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::FillRoundedRect { color, .. } => Some(color.rgb()),
            DrawCommand::Clear(_) => None,
        })
        .collect();
    assert_eq!(fills.len(), 4);
    assert!(fills.iter().all(|c| *c == Rgb::new(255, 0, 0)));
}
