//! Async frame loop with host controls.
//!
//! [`run_frames`] drives a [`Scheduler`] from a [`tokio::time::interval`]
//! at the configured frame cadence, with support for:
//!
//! - **Bounded runs**: stop after `max_frames` or `max_real_time_seconds`
//! - **Pause/resume**: while paused no frame is ticked and the simulation
//!   clock stands still, so resuming continues exactly where it stopped
//! - **Host events**: resizes, property batches, and click resets are
//!   applied before the next tick
//! - **Clean stop**: a host stop request ends the loop, even while paused

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::control::{HostControl, HostEvents};
use crate::render::DrawSurface;
use crate::scheduler::{FrameReport, Scheduler};

/// Reason the frame loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEndReason {
    /// Reached the configured `max_frames` limit.
    MaxFramesReached,
    /// Reached the configured `max_real_time_seconds` limit.
    MaxRealTimeReached,
    /// The host requested a stop.
    HostStop,
}

/// Result of a frame loop run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Why the loop ended.
    pub end_reason: RunEndReason,
    /// Frames ticked.
    pub frames: u64,
    /// Frames on which a generation advanced.
    pub generations: u64,
    /// Report of the last frame, if any frame ran.
    pub last_report: Option<FrameReport>,
}

/// Callback invoked after each frame is drawn.
pub trait FrameCallback<S: ?Sized>: Send {
    /// Called with the frame's report and the surface it was drawn on.
    fn on_frame(&mut self, report: &FrameReport, surface: &S);
}

/// A no-op frame callback.
pub struct NoOpCallback;

impl<S: ?Sized> FrameCallback<S> for NoOpCallback {
    fn on_frame(&mut self, _report: &FrameReport, _surface: &S) {}
}

/// Apply drained host events: resize first, then property batches, then a
/// click reset.
pub fn apply_host_events<R: Rng>(scheduler: &mut Scheduler<R>, events: HostEvents) {
    if let Some(viewport) = events.resize {
        scheduler.resize(viewport);
    }
    for batch in &events.properties {
        let report = scheduler.apply_properties(batch);
        debug!(
            applied = report.applied.len(),
            rejected = report.rejected.len(),
            reset = report.reset,
            "Host properties applied"
        );
    }
    if events.click {
        scheduler.reset();
    }
}

/// Run the frame loop until a termination condition is met.
///
/// Timestamps passed to [`Scheduler::tick`] count milliseconds since the
/// loop started, excluding time spent paused.
pub async fn run_frames<R, S>(
    scheduler: &mut Scheduler<R>,
    control: &Arc<HostControl>,
    surface: &mut S,
    callback: &mut dyn FrameCallback<S>,
) -> RunSummary
where
    R: Rng,
    S: DrawSurface + ?Sized,
{
    let started = Instant::now();
    let mut paused_for = Duration::ZERO;
    let mut interval = time::interval(Duration::from_millis(control.frame_interval_ms()));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut summary = RunSummary {
        end_reason: RunEndReason::HostStop,
        frames: 0,
        generations: 0,
        last_report: None,
    };

    info!(
        max_frames = control.max_frames(),
        max_real_time_seconds = control.max_real_time_seconds(),
        frame_interval_ms = control.frame_interval_ms(),
        "Frame loop starting"
    );

    loop {
        // --- Check pause ---
        if control.is_paused() {
            info!("Simulation paused, waiting for resume...");
            let paused_at = Instant::now();
            control.wait_if_paused().await;
            paused_for = paused_for.saturating_add(paused_at.elapsed());
            interval.reset();
            info!("Simulation resumed");
        }

        // --- Check stop request ---
        if control.is_stop_requested() {
            info!("Host stop requested");
            summary.end_reason = RunEndReason::HostStop;
            return summary;
        }

        // --- Check time limit ---
        if control.time_limit_reached() {
            info!(
                max_seconds = control.max_real_time_seconds(),
                elapsed = control.elapsed_seconds(),
                "Real-time limit reached"
            );
            summary.end_reason = RunEndReason::MaxRealTimeReached;
            return summary;
        }

        interval.tick().await;
        if control.is_paused() || control.is_stop_requested() {
            continue;
        }

        // --- Tick ---
        apply_host_events(scheduler, control.drain_events().await);
        let now_ms = millis(started.elapsed().saturating_sub(paused_for));
        let report = scheduler.tick(now_ms, surface);

        summary.frames = summary.frames.saturating_add(1);
        if report.advanced {
            summary.generations = summary.generations.saturating_add(1);
        }
        callback.on_frame(&report, surface);
        summary.last_report = Some(report);

        // --- Check frame limit ---
        if control.frame_limit_reached(summary.frames) {
            info!(
                frames = summary.frames,
                max_frames = control.max_frames(),
                "Frame limit reached"
            );
            summary.end_reason = RunEndReason::MaxFramesReached;
            return summary;
        }
    }
}

/// Log the end of a run.
pub fn log_run_end(summary: &RunSummary) {
    info!(
        reason = ?summary.end_reason,
        frames = summary.frames,
        generations = summary.generations,
        final_generation = summary.last_report.map(|r| r.generation),
        "Frame loop ended"
    );
    if summary.frames == 0 {
        warn!("Frame loop ended with no frames rendered");
    }
}

/// A duration in fractional milliseconds.
#[allow(clippy::cast_precision_loss)]
fn millis(duration: Duration) -> f64 {
    // Whole seconds stay exact far beyond any realistic run length.
    (duration.as_secs() as f64).mul_add(1000.0, f64::from(duration.subsec_nanos()) / 1e6)
}
