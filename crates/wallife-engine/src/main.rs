//! Headless engine binary for the Wallife simulation.
//!
//! Stands in for a wallpaper host: it loads configuration, drives the frame
//! loop against a recording surface, reads host commands from stdin, and
//! optionally prints each committed generation to the terminal.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `WALLIFE_CONFIG` or `wallife-config.yaml`
//! 2. Initialize structured logging (tracing) on stderr
//! 3. Apply the optional startup properties file through the bridge
//! 4. Seed the shared random source
//! 5. Create the scheduler and host control state
//! 6. Start the stdin command reader and the Ctrl-C handler
//! 7. Run the frame loop
//! 8. Log the result

mod error;
mod host;
mod terminal;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Map, Value};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wallife_core::bridge;
use wallife_core::config::{Settings, WallifeConfig};
use wallife_core::control::HostControl;
use wallife_core::render::RecordingSurface;
use wallife_core::runner;
use wallife_core::scheduler::Scheduler;

use crate::error::EngineError;
use crate::terminal::TerminalPrinter;

/// Config file used when `WALLIFE_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "wallife-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration or the startup properties file cannot
/// be loaded.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("wallife-engine starting");
    info!(
        path = %config_path.display(),
        width = config.viewport.width,
        height = config.viewport.height,
        seed = config.engine.seed,
        frame_interval_ms = config.engine.frame_interval_ms,
        "Configuration loaded"
    );

    // 3. Apply startup properties.
    let settings = match &config.engine.properties_file {
        Some(path) => apply_properties_file(&config.settings, Path::new(path))?,
        None => config.settings.clone(),
    };

    // 4. Seed the random source.
    let rng = match config.engine.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    // 5. Create the scheduler and control state.
    let mut scheduler = Scheduler::new(settings, config.viewport, rng);
    let control = Arc::new(HostControl::new(&config.engine));
    info!(
        rows = scheduler.layout().rows,
        cols = scheduler.layout().cols,
        max_frames = control.max_frames(),
        max_real_time_seconds = control.max_real_time_seconds(),
        "Scheduler initialized"
    );

    // 6. Host command stream and interrupt handling.
    let _stdin_handle = host::spawn_stdin_reader(Arc::clone(&control));
    {
        let interrupt_control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, stopping");
                    interrupt_control.request_stop();
                }
                Err(error) => warn!(%error, "Failed to listen for Ctrl-C"),
            }
        });
    }

    // 7. Run the frame loop.
    let mut surface = RecordingSurface::new();
    let mut printer = TerminalPrinter::new(config.engine.print_frames, std::io::stdout());
    let summary = runner::run_frames(&mut scheduler, &control, &mut surface, &mut printer).await;

    // 8. Log results.
    runner::log_run_end(&summary);
    info!(
        end_reason = ?summary.end_reason,
        frames = summary.frames,
        "wallife-engine shutdown complete"
    );

    Ok(())
}

/// Load the configuration from `WALLIFE_CONFIG`, else `wallife-config.yaml`.
///
/// A missing file yields the defaults.
fn load_config() -> Result<(WallifeConfig, PathBuf), EngineError> {
    let path = std::env::var_os("WALLIFE_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        let config = WallifeConfig::from_file(&path)?;
        Ok((config, path))
    } else {
        Ok((WallifeConfig::default(), path))
    }
}

/// Apply a JSON object of host properties on top of `settings`.
fn apply_properties_file(settings: &Settings, path: &Path) -> Result<Settings, EngineError> {
    let contents = std::fs::read_to_string(path).map_err(|source| EngineError::PropertiesRead {
        path: path.to_path_buf(),
        source,
    })?;
    let properties: Map<String, Value> =
        serde_json::from_str(&contents).map_err(|source| EngineError::PropertiesParse {
            path: path.to_path_buf(),
            source,
        })?;

    let (settings, report) = bridge::apply_properties(settings, &properties);
    info!(
        path = %path.display(),
        applied = report.applied.len(),
        rejected = report.rejected.len(),
        "Startup properties applied"
    );
    Ok(settings)
}
