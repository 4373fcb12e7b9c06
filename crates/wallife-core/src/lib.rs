//! Stuck detection, recovery, fade rendering, and frame scheduling for the
//! Wallife simulation.
//!
//! This crate owns the per-frame pipeline that turns the automaton in
//! `wallife-world` into a continuously animated wallpaper:
//!
//! ```text
//! Scheduler -> step -> StuckDetector -> recovery -> fade render -> surface
//! ```
//!
//! # Modules
//!
//! - [`config`] -- Runtime [`Settings`] and YAML configuration loading.
//! - [`bridge`] -- Static property table mapping host property updates onto
//!   settings.
//! - [`layout`] -- Grid dimensions and cell rectangles from the viewport.
//! - [`stuck`] -- Generation fingerprints and the bounded history that
//!   flags cycles and extinction.
//! - [`recovery`] -- Fibonacci-escalated revival and full resets.
//! - [`render`] -- Per-cell appearance, fade blending, and the
//!   [`DrawSurface`] contract.
//! - [`scheduler`] -- The per-tick driver and its explicit
//!   [`SimulationState`].
//! - [`control`] -- Shared host control state (pause, click, resize, stop).
//! - [`runner`] -- Async frame loop that drives the scheduler from a timer.
//!
//! [`Settings`]: config::Settings
//! [`DrawSurface`]: render::DrawSurface
//! [`SimulationState`]: scheduler::SimulationState

pub mod bridge;
pub mod config;
pub mod control;
pub mod layout;
pub mod recovery;
pub mod render;
pub mod runner;
pub mod scheduler;
pub mod stuck;
