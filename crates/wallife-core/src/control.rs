//! Host control state shared between the frame loop and the host.
//!
//! The host (a wallpaper runtime, or the engine's stdin reader) pauses and
//! resumes the simulation, reports pointer clicks and viewport resizes,
//! pushes property updates, and requests shutdown. The frame loop reads the
//! flags on every frame and drains the queued events before each tick.
//!
//! # Architecture
//!
//! Flags use [`std::sync::atomic`] types so the frame loop reads them
//! without locking. Queued payloads (resize, property batches) sit behind
//! [`tokio::sync::Mutex`]. The whole struct is shared through an
//! [`Arc`](std::sync::Arc).

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Map, Value};
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use crate::config::{EngineConfig, Viewport};

/// Host events accumulated since the last frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostEvents {
    /// The most recent requested viewport, if the host resized.
    pub resize: Option<Viewport>,
    /// Whether the host reported a pointer click.
    pub click: bool,
    /// Property batches in arrival order.
    pub properties: Vec<Map<String, Value>>,
}

impl HostEvents {
    /// Whether nothing happened.
    pub fn is_empty(&self) -> bool {
        self.resize.is_none() && !self.click && self.properties.is_empty()
    }
}

/// Shared host control state.
#[derive(Debug)]
pub struct HostControl {
    /// Whether rendering is paused.
    paused: AtomicBool,

    /// Wakes the frame loop on resume or stop.
    resume_notify: Notify,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Whether a click reset is pending.
    click_pending: AtomicBool,

    /// Latest requested viewport, pending.
    pending_resize: Mutex<Option<Viewport>>,

    /// Property batches awaiting the next frame.
    pending_properties: Mutex<Vec<Map<String, Value>>>,

    /// When the run started.
    started_at: Instant,

    /// Milliseconds between frames.
    frame_interval_ms: u64,

    /// Maximum number of frames (0 = unlimited).
    max_frames: u64,

    /// Maximum wall-clock seconds (0 = unlimited).
    max_real_time_seconds: u64,
}

impl HostControl {
    /// Create control state from the engine configuration.
    pub fn new(engine: &EngineConfig) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            click_pending: AtomicBool::new(false),
            pending_resize: Mutex::new(None),
            pending_properties: Mutex::new(Vec::new()),
            started_at: Instant::now(),
            frame_interval_ms: engine.frame_interval_ms.max(1),
            max_frames: engine.max_frames,
            max_real_time_seconds: engine.max_real_time_seconds,
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Check whether the simulation is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the simulation. The frame loop stops ticking until resumed.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume the simulation and wake the frame loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until the simulation is no longer paused or a stop is requested.
    pub async fn wait_if_paused(&self) {
        while self.is_paused() && !self.is_stop_requested() {
            self.resume_notify.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop. Also wakes a paused frame loop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------------
    // Host events
    // -----------------------------------------------------------------------

    /// Report a pointer click. Several clicks before the next frame
    /// collapse into one reset.
    pub fn request_reset(&self) {
        self.click_pending.store(true, Ordering::Release);
    }

    /// Report a viewport resize. Only the latest size before the next frame
    /// is applied.
    pub async fn request_resize(&self, viewport: Viewport) {
        let mut pending = self.pending_resize.lock().await;
        *pending = Some(viewport);
    }

    /// Queue a batch of property updates.
    pub async fn queue_properties(&self, properties: Map<String, Value>) {
        let mut queue = self.pending_properties.lock().await;
        queue.push(properties);
    }

    /// Take every pending host event.
    pub async fn drain_events(&self) -> HostEvents {
        let resize = self.pending_resize.lock().await.take();
        let properties = std::mem::take(&mut *self.pending_properties.lock().await);
        HostEvents {
            resize,
            click: self.click_pending.swap(false, Ordering::AcqRel),
            properties,
        }
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Milliseconds between frames (at least 1).
    pub const fn frame_interval_ms(&self) -> u64 {
        self.frame_interval_ms
    }

    /// Get the configured max frames.
    pub const fn max_frames(&self) -> u64 {
        self.max_frames
    }

    /// Get the configured max real-time seconds.
    pub const fn max_real_time_seconds(&self) -> u64 {
        self.max_real_time_seconds
    }

    /// Check whether the frame limit has been reached.
    ///
    /// Returns `true` if `max_frames > 0` and `frames >= max_frames`.
    pub const fn frame_limit_reached(&self, frames: u64) -> bool {
        self.max_frames > 0 && frames >= self.max_frames
    }

    /// Check whether the wall-clock limit has been reached.
    pub fn time_limit_reached(&self) -> bool {
        self.max_real_time_seconds > 0 && self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Elapsed whole seconds since the run started.
    pub fn elapsed_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
