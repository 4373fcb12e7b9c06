//! Configuration loading and runtime settings for the Wallife simulation.
//!
//! The configuration file (`wallife-config.yaml` by default) holds the
//! initial [`Settings`] plus engine, viewport, and logging options. Every
//! field has a default, so an empty file is a valid configuration.
//!
//! At runtime the host may override any single setting through the
//! property bridge (see [`crate::bridge`]). Out-of-range values are clamped
//! by [`Settings::sanitized`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use wallife_types::Rgb;
use wallife_world::{EdgeMode, GeneticsParams, Palette, StepRules};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct WallifeConfig {
    /// Initial simulation settings.
    #[serde(default)]
    pub settings: Settings,

    /// Initial viewport size.
    #[serde(default)]
    pub viewport: Viewport,

    /// Engine loop options.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging options.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WallifeConfig {
    /// Load configuration from a YAML file. Settings are sanitized.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string. Settings are sanitized.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.settings = config.settings.sanitized();
        Ok(config)
    }
}

/// Viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Viewport {
    /// Width in pixels.
    #[serde(default = "default_viewport_width")]
    pub width: u32,
    /// Height in pixels.
    #[serde(default = "default_viewport_height")]
    pub height: u32,
}

impl Viewport {
    /// Create a viewport.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

/// Engine loop options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Seed for the shared random source. `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Milliseconds between frames (display refresh cadence).
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Stop after this many rendered frames (0 = unlimited).
    #[serde(default)]
    pub max_frames: u64,

    /// Stop after this many wall-clock seconds (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,

    /// Print the grid to the terminal after each committed generation.
    #[serde(default)]
    pub print_frames: bool,

    /// Optional JSON file of host property overrides applied at startup.
    #[serde(default)]
    pub properties_file: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            frame_interval_ms: default_frame_interval_ms(),
            max_frames: 0,
            max_real_time_seconds: 0,
            print_frames: false,
            properties_file: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Inclusive bounds for every numeric setting.
pub mod limits {
    /// Cell side length in pixels.
    pub const CELL_SIZE: (u32, u32) = (2, 50);
    /// Gap between cells in pixels.
    pub const CELL_PADDING: (u32, u32) = (0, 50);
    /// Rounded-rect corner radius in pixels.
    pub const CELL_CORNER_RADIUS: (f64, f64) = (0.0, 20.0);
    /// Generation cadence in milliseconds.
    pub const SIMULATION_SPEED: (f64, f64) = (100.0, 4000.0);
    /// Fraction of the cycle spent fading.
    pub const FADE_AMOUNT: (f64, f64) = (0.0, 1.0);
    /// Hold time after a fade, in milliseconds.
    pub const STABLE_DISPLAY_TIME: (f64, f64) = (0.0, 2000.0);
    /// Ghost opacity per live neighbor.
    pub const NEIGHBOR_OPACITY_INCREMENT: (f64, f64) = (0.01, 0.5);
    /// Mutation probability on birth.
    pub const RANDOM_COLOR_CHANCE: (f64, f64) = (0.0, 1.0);
    /// Age at which saturation peaks.
    pub const MAX_SATURATION_AGE: (u32, u32) = (1, 50);
    /// Maximum saturation multiplier minus one.
    pub const SATURATION_FACTOR: (f64, f64) = (0.0, 1.0);
    /// Revival attempts before a forced reset.
    pub const MAX_REVIVAL_ATTEMPTS: (u32, u32) = (0, 1000);
    /// Initial live-cell density.
    pub const GRID_POPULATION: (f64, f64) = (0.0, 1.0);
    /// Reserved vertical space in pixels.
    pub const BOTTOM_MARGIN: (u32, u32) = (0, 4000);
}

/// Clamp a float into `bounds`; NaN becomes `fallback`.
fn clamp_f64(value: f64, bounds: (f64, f64), fallback: f64) -> f64 {
    if value.is_nan() {
        return fallback;
    }
    value.clamp(bounds.0, bounds.1)
}

/// Clamp an integer into `bounds`.
fn clamp_u32(value: u32, bounds: (u32, u32)) -> u32 {
    value.clamp(bounds.0, bounds.1)
}

/// Whether two floats differ by more than rounding noise.
fn differs(a: f64, b: f64) -> bool {
    (a - b).abs() > f64::EPSILON
}

/// Runtime simulation settings.
///
/// Read once per tick. Any field can be replaced independently; fields
/// that change grid geometry or the stepping mode force a reset (see
/// [`Settings::requires_reset`]).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Settings {
    /// Canvas clear color.
    pub background_color: Rgb,
    /// Cell color outside color mode.
    pub foreground_color: Rgb,
    /// Cell side length in pixels.
    pub cell_size: u32,
    /// Gap between cells in pixels.
    pub cell_padding: u32,
    /// Rounded-rect corner radius in pixels.
    pub cell_corner_radius: f64,
    /// Base generation cadence in milliseconds.
    pub simulation_speed: f64,
    /// Fraction of the cadence spent fading between generations.
    pub fade_amount: f64,
    /// Milliseconds to hold a settled generation after its fade.
    pub stable_display_time: f64,
    /// Toroidal (`true`) or clipped (`false`) neighbor lookup.
    pub edge_wrapping: bool,
    /// Show ghost opacity on dead cells next to live ones.
    pub neighbor_opacity_enabled: bool,
    /// Ghost opacity per live neighbor.
    pub neighbor_opacity_increment: f64,
    /// Enable the genetic color pipeline.
    pub color_mode: bool,
    /// Mutation probability on birth.
    pub random_color_chance: f64,
    /// Mutations are fully random rather than tweaks of the inherited color.
    pub random_color_pure: bool,
    /// Age at which the saturation boost maxes out.
    pub max_saturation_age: u32,
    /// Maximum saturation multiplier minus one.
    pub saturation_factor: f64,
    /// Perturb stuck simulations with Fibonacci-escalated revivals.
    pub try_revive_stuck_sim: bool,
    /// Reset immediately whenever the simulation is stuck.
    pub hard_reset_on_stuck: bool,
    /// Revival attempts before a forced reset.
    pub max_revival_attempts: u32,
    /// Initial and reset live-cell density.
    pub grid_population_percentage: f64,
    /// Reserved vertical space at the bottom of the viewport, in pixels.
    pub bottom_margin: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            background_color: Rgb::BLACK,
            foreground_color: Rgb::WHITE,
            cell_size: 10,
            cell_padding: 2,
            cell_corner_radius: 2.0,
            simulation_speed: 1000.0,
            fade_amount: 0.5,
            stable_display_time: 500.0,
            edge_wrapping: true,
            neighbor_opacity_enabled: false,
            neighbor_opacity_increment: 0.1,
            color_mode: true,
            random_color_chance: 0.05,
            random_color_pure: false,
            max_saturation_age: 10,
            saturation_factor: 0.3,
            try_revive_stuck_sim: true,
            hard_reset_on_stuck: false,
            max_revival_attempts: 5,
            grid_population_percentage: 0.3,
            bottom_margin: 0,
        }
    }
}

impl Settings {
    /// Return a copy with every numeric field clamped into its range.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            cell_size: clamp_u32(self.cell_size, limits::CELL_SIZE),
            cell_padding: clamp_u32(self.cell_padding, limits::CELL_PADDING),
            cell_corner_radius: clamp_f64(
                self.cell_corner_radius,
                limits::CELL_CORNER_RADIUS,
                defaults.cell_corner_radius,
            ),
            simulation_speed: clamp_f64(
                self.simulation_speed,
                limits::SIMULATION_SPEED,
                defaults.simulation_speed,
            ),
            fade_amount: clamp_f64(self.fade_amount, limits::FADE_AMOUNT, defaults.fade_amount),
            stable_display_time: clamp_f64(
                self.stable_display_time,
                limits::STABLE_DISPLAY_TIME,
                defaults.stable_display_time,
            ),
            neighbor_opacity_increment: clamp_f64(
                self.neighbor_opacity_increment,
                limits::NEIGHBOR_OPACITY_INCREMENT,
                defaults.neighbor_opacity_increment,
            ),
            random_color_chance: clamp_f64(
                self.random_color_chance,
                limits::RANDOM_COLOR_CHANCE,
                defaults.random_color_chance,
            ),
            max_saturation_age: clamp_u32(self.max_saturation_age, limits::MAX_SATURATION_AGE),
            saturation_factor: clamp_f64(
                self.saturation_factor,
                limits::SATURATION_FACTOR,
                defaults.saturation_factor,
            ),
            max_revival_attempts: clamp_u32(self.max_revival_attempts, limits::MAX_REVIVAL_ATTEMPTS),
            grid_population_percentage: clamp_f64(
                self.grid_population_percentage,
                limits::GRID_POPULATION,
                defaults.grid_population_percentage,
            ),
            bottom_margin: clamp_u32(self.bottom_margin, limits::BOTTOM_MARGIN),
            ..self
        }
    }

    /// Whether moving from `previous` to `self` requires a full reset.
    ///
    /// Geometry (cell size, padding, bottom margin), topology, color mode,
    /// and population density all invalidate the running grid.
    pub fn requires_reset(&self, previous: &Self) -> bool {
        self.cell_size != previous.cell_size
            || self.cell_padding != previous.cell_padding
            || self.bottom_margin != previous.bottom_margin
            || self.edge_wrapping != previous.edge_wrapping
            || self.color_mode != previous.color_mode
            || differs(
                self.grid_population_percentage,
                previous.grid_population_percentage,
            )
    }

    /// Milliseconds spent fading per cycle.
    pub fn fade_time_ms(&self) -> f64 {
        self.simulation_speed * self.fade_amount
    }

    /// Milliseconds a settled generation is held after its fade.
    pub const fn stable_time_ms(&self) -> f64 {
        self.stable_display_time
    }

    /// Full cycle length: fade plus hold.
    pub fn cycle_time_ms(&self) -> f64 {
        self.fade_time_ms() + self.stable_time_ms()
    }

    /// Neighbor topology.
    pub const fn edge_mode(&self) -> EdgeMode {
        EdgeMode::from_wrapping(self.edge_wrapping)
    }

    /// Palette for parentless cells (initial grid, resets, revivals).
    pub const fn palette(&self) -> Palette {
        if self.color_mode {
            Palette::Random
        } else {
            Palette::Solid(self.foreground_color)
        }
    }

    /// Rules for one generation step.
    pub const fn step_rules(&self) -> StepRules {
        StepRules {
            edges: self.edge_mode(),
            color_mode: self.color_mode,
            genetics: GeneticsParams {
                random_color_chance: self.random_color_chance,
                random_color_pure: self.random_color_pure,
                max_saturation_age: self.max_saturation_age,
                saturation_factor: self.saturation_factor,
            },
            foreground: self.foreground_color,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_viewport_width() -> u32 {
    1920
}

const fn default_viewport_height() -> u32 {
    1080
}

const fn default_frame_interval_ms() -> u64 {
    16
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = WallifeConfig::default();
        assert_eq!(config.settings.cell_size, 10);
        assert_eq!(config.viewport, Viewport::new(1920, 1080));
        assert_eq!(config.engine.frame_interval_ms, 16);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.settings.clone().sanitized(), config.settings);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
settings:
  background_color: { r: 10, g: 20, b: 30 }
  foreground_color: { r: 200, g: 210, b: 220 }
  cell_size: 8
  cell_padding: 1
  cell_corner_radius: 3.5
  simulation_speed: 500
  fade_amount: 0.25
  stable_display_time: 100
  edge_wrapping: false
  neighbor_opacity_enabled: true
  neighbor_opacity_increment: 0.2
  color_mode: false
  random_color_chance: 0.1
  random_color_pure: true
  max_saturation_age: 20
  saturation_factor: 0.5
  try_revive_stuck_sim: false
  hard_reset_on_stuck: true
  max_revival_attempts: 3
  grid_population_percentage: 0.4
  bottom_margin: 40

viewport:
  width: 800
  height: 600

engine:
  seed: 123
  frame_interval_ms: 33
  max_frames: 500
  print_frames: true

logging:
  level: debug
";
        let config = WallifeConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.settings.background_color, Rgb::new(10, 20, 30));
        assert_eq!(config.settings.cell_size, 8);
        assert!(!config.settings.edge_wrapping);
        assert!(config.settings.hard_reset_on_stuck);
        assert_eq!(config.settings.bottom_margin, 40);
        assert_eq!(config.viewport, Viewport::new(800, 600));
        assert_eq!(config.engine.seed, Some(123));
        assert_eq!(config.engine.max_frames, 500);
        assert!(config.engine.print_frames);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = WallifeConfig::parse("settings:\n  cell_size: 4\n");
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.settings.cell_size, 4);
        // Everything else uses defaults
        assert_eq!(config.settings.cell_padding, 2);
        assert_eq!(config.engine.seed, None);
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(WallifeConfig::parse("").ok(), Some(WallifeConfig::default()));
    }

    #[test]
    fn parse_invalid_yaml_fails() {
        let result = WallifeConfig::parse("settings: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn parsed_settings_are_clamped() {
        let config = WallifeConfig::parse("settings:\n  cell_size: 500\n  fade_amount: 3.0\n")
            .ok()
            .unwrap_or_default();
        assert_eq!(config.settings.cell_size, 50);
        assert!((config.settings.fade_amount - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sanitize_clamps_every_range() {
        let wild = Settings {
            cell_size: 0,
            cell_padding: 99,
            cell_corner_radius: -4.0,
            simulation_speed: 10.0,
            fade_amount: f64::NAN,
            stable_display_time: 10_000.0,
            neighbor_opacity_increment: 0.0,
            random_color_chance: 2.0,
            max_saturation_age: 0,
            saturation_factor: -1.0,
            max_revival_attempts: 5_000,
            grid_population_percentage: 1.5,
            bottom_margin: 10_000,
            ..Settings::default()
        };
        let clean = wild.sanitized();
        assert_eq!(clean.cell_size, 2);
        assert_eq!(clean.cell_padding, 50);
        assert!(clean.cell_corner_radius.abs() < f64::EPSILON);
        assert!((clean.simulation_speed - 100.0).abs() < f64::EPSILON);
        assert!((clean.fade_amount - 0.5).abs() < f64::EPSILON);
        assert!((clean.stable_display_time - 2000.0).abs() < f64::EPSILON);
        assert!((clean.neighbor_opacity_increment - 0.01).abs() < f64::EPSILON);
        assert!((clean.random_color_chance - 1.0).abs() < f64::EPSILON);
        assert_eq!(clean.max_saturation_age, 1);
        assert!(clean.saturation_factor.abs() < f64::EPSILON);
        assert_eq!(clean.max_revival_attempts, 1000);
        assert!((clean.grid_population_percentage - 1.0).abs() < f64::EPSILON);
        assert_eq!(clean.bottom_margin, 4000);
    }

    #[test]
    fn geometry_and_mode_changes_require_reset() {
        let base = Settings::default();
        let cases = [
            Settings { cell_size: 12, ..base.clone() },
            Settings { cell_padding: 0, ..base.clone() },
            Settings { bottom_margin: 30, ..base.clone() },
            Settings { edge_wrapping: false, ..base.clone() },
            Settings { color_mode: false, ..base.clone() },
            Settings { grid_population_percentage: 0.7, ..base.clone() },
        ];
        for changed in &cases {
            assert!(changed.requires_reset(&base), "{changed:?}");
        }
    }

    #[test]
    fn cosmetic_changes_apply_live() {
        let base = Settings::default();
        let cases = [
            Settings { cell_corner_radius: 8.0, ..base.clone() },
            Settings { fade_amount: 0.9, ..base.clone() },
            Settings { simulation_speed: 3000.0, ..base.clone() },
            Settings { neighbor_opacity_enabled: true, ..base.clone() },
            Settings { foreground_color: Rgb::new(1, 2, 3), ..base.clone() },
            Settings { hard_reset_on_stuck: true, ..base.clone() },
        ];
        for changed in &cases {
            assert!(!changed.requires_reset(&base), "{changed:?}");
        }
    }

    #[test]
    fn cycle_time_combines_fade_and_hold() {
        let settings = Settings {
            simulation_speed: 1000.0,
            fade_amount: 0.25,
            stable_display_time: 300.0,
            ..Settings::default()
        };
        assert!((settings.fade_time_ms() - 250.0).abs() < f64::EPSILON);
        assert!((settings.cycle_time_ms() - 550.0).abs() < f64::EPSILON);
    }

    #[test]
    fn palette_follows_color_mode() {
        let colored = Settings::default();
        assert_eq!(colored.palette(), Palette::Random);
        let mono = Settings {
            color_mode: false,
            foreground_color: Rgb::new(5, 6, 7),
            ..Settings::default()
        };
        assert_eq!(mono.palette(), Palette::Solid(Rgb::new(5, 6, 7)));
        assert!(!mono.step_rules().color_mode);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("wallife-config.yaml");
        if path.exists() {
            let config = WallifeConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
