//! Host property bridge.
//!
//! Wallpaper hosts push user property changes as loosely typed JSON. This
//! module maps each property name through a static table onto one
//! [`Settings`] field, with a fixed expected value shape and coercion. A
//! property that fails to coerce is rejected on its own; every other
//! property in the same batch still applies.
//!
//! Values may be bare (`0.5`) or wrapped the way hosts deliver them
//! (`{ "value": 0.5 }`). Accepted forms per shape:
//!
//! | Shape | Accepts |
//! |---|---|
//! | bool | `true`/`false`, numbers (non-zero is true), `"true"`/`"false"`/`"1"`/`"0"` |
//! | number | numbers, numeric strings |
//! | color | `"r g b"` with 0-1 floats, `"#rrggbb"`, `[r, g, b]` or `{ "r", "g", "b" }` with 0-255 channels |

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use wallife_types::Rgb;

use crate::config::Settings;

/// Why a single property update was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// The property name is not in the table.
    #[error("unknown property")]
    UnknownProperty,

    /// The value has the wrong JSON shape for the property.
    #[error("expected {expected}, found {found}")]
    WrongShape {
        /// The accepted shape.
        expected: ValueShape,
        /// The JSON type that was provided.
        found: &'static str,
    },

    /// A numeric value was NaN or infinite.
    #[error("value is not a finite number")]
    NotFinite,

    /// A color string or array could not be parsed.
    #[error("malformed color: {value}")]
    MalformedColor {
        /// The offending value, as JSON text.
        value: String,
    },
}

/// Value shape a property expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueShape {
    /// A toggle.
    Bool,
    /// A number; integer fields round to the nearest value.
    Number,
    /// An RGB color.
    Color,
}

impl std::fmt::Display for ValueShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Bool => "bool",
            Self::Number => "number",
            Self::Color => "color",
        })
    }
}

/// The settings field a property writes.
///
/// Variants mirror the [`Settings`] fields of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[allow(missing_docs)]
pub enum SettingField {
    BackgroundColor,
    ForegroundColor,
    CellSize,
    CellPadding,
    CellCornerRadius,
    SimulationSpeed,
    FadeAmount,
    StableDisplayTime,
    EdgeWrapping,
    NeighborOpacityEnabled,
    NeighborOpacityIncrement,
    ColorMode,
    RandomColorChance,
    RandomColorPure,
    MaxSaturationAge,
    SaturationFactor,
    TryReviveStuckSim,
    HardResetOnStuck,
    MaxRevivalAttempts,
    GridPopulationPercentage,
    BottomMargin,
}

/// One row of the property table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyBinding {
    /// Property name as the host sends it.
    pub name: &'static str,
    /// Expected value shape, which also selects the coercion.
    pub shape: ValueShape,
    /// Field written on success.
    pub field: SettingField,
}

const fn bind(name: &'static str, shape: ValueShape, field: SettingField) -> PropertyBinding {
    PropertyBinding { name, shape, field }
}

/// Every property the host may set.
pub static PROPERTY_TABLE: &[PropertyBinding] = &[
    bind("background_color", ValueShape::Color, SettingField::BackgroundColor),
    bind("foreground_color", ValueShape::Color, SettingField::ForegroundColor),
    bind("cell_size", ValueShape::Number, SettingField::CellSize),
    bind("cell_padding", ValueShape::Number, SettingField::CellPadding),
    bind("cell_corner_radius", ValueShape::Number, SettingField::CellCornerRadius),
    bind("simulation_speed", ValueShape::Number, SettingField::SimulationSpeed),
    bind("fade_amount", ValueShape::Number, SettingField::FadeAmount),
    bind("stable_display_time", ValueShape::Number, SettingField::StableDisplayTime),
    bind("edge_wrapping", ValueShape::Bool, SettingField::EdgeWrapping),
    bind("wrap_edges", ValueShape::Bool, SettingField::EdgeWrapping),
    bind("neighbor_opacity_enabled", ValueShape::Bool, SettingField::NeighborOpacityEnabled),
    bind("neighbor_opacity_increment", ValueShape::Number, SettingField::NeighborOpacityIncrement),
    bind("color_mode", ValueShape::Bool, SettingField::ColorMode),
    bind("random_color_chance", ValueShape::Number, SettingField::RandomColorChance),
    bind("random_color_pure", ValueShape::Bool, SettingField::RandomColorPure),
    bind("max_saturation_age", ValueShape::Number, SettingField::MaxSaturationAge),
    bind("saturation_factor", ValueShape::Number, SettingField::SaturationFactor),
    bind("try_revive_stuck_sim", ValueShape::Bool, SettingField::TryReviveStuckSim),
    bind("hard_reset_on_stuck", ValueShape::Bool, SettingField::HardResetOnStuck),
    bind("max_revival_attempts", ValueShape::Number, SettingField::MaxRevivalAttempts),
    bind("grid_population_percentage", ValueShape::Number, SettingField::GridPopulationPercentage),
    bind("bottom_margin", ValueShape::Number, SettingField::BottomMargin),
];

/// Look up a property by name.
pub fn binding(name: &str) -> Option<&'static PropertyBinding> {
    PROPERTY_TABLE.iter().find(|b| b.name == name)
}

/// A coerced property value.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Coerced {
    Bool(bool),
    Number(f64),
    Color(Rgb),
}

impl Coerced {
    const fn bool(self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(b),
            _ => None,
        }
    }

    const fn number(self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    const fn color(self) -> Option<Rgb> {
        match self {
            Self::Color(c) => Some(c),
            _ => None,
        }
    }
}

/// One rejected property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Property name as received.
    pub property: String,
    /// Why it was rejected.
    pub error: BridgeError,
}

/// Outcome of applying one batch of properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeReport {
    /// Properties that were applied, in application order.
    pub applied: Vec<&'static str>,
    /// Properties that were ignored.
    pub rejected: Vec<Rejection>,
    /// Whether the resulting settings forced a simulation reset. Filled in
    /// by the scheduler.
    pub reset: bool,
}

/// Apply `properties` on top of `settings`.
///
/// Returns the sanitized result and a report of what applied. When both
/// `edge_wrapping` and its alias `wrap_edges` are present, the later one in
/// map order wins.
pub fn apply_properties(settings: &Settings, properties: &Map<String, Value>) -> (Settings, BridgeReport) {
    let mut next = settings.clone();
    let mut report = BridgeReport::default();

    for (name, raw) in properties {
        let outcome = binding(name)
            .ok_or(BridgeError::UnknownProperty)
            .and_then(|b| {
                let value = unwrap_value(raw);
                let coerced = coerce(b.shape, value)?;
                assign(&mut next, b.field, coerced).ok_or(BridgeError::WrongShape {
                    expected: b.shape,
                    found: json_type(value),
                })?;
                Ok(b)
            });
        match outcome {
            Ok(b) => {
                debug!(property = b.name, value = %raw, "Property applied");
                report.applied.push(b.name);
            }
            Err(error) => {
                warn!(property = %name, value = %raw, %error, "Property rejected");
                report.rejected.push(Rejection {
                    property: name.clone(),
                    error,
                });
            }
        }
    }

    (next.sanitized(), report)
}

/// Strip a host `{ "value": ... }` wrapper.
fn unwrap_value(raw: &Value) -> &Value {
    match raw {
        Value::Object(map) => map.get("value").unwrap_or(raw),
        _ => raw,
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn coerce(shape: ValueShape, value: &Value) -> Result<Coerced, BridgeError> {
    let wrong_shape = || BridgeError::WrongShape {
        expected: shape,
        found: json_type(value),
    };
    match shape {
        ValueShape::Bool => match value {
            Value::Bool(b) => Ok(Coerced::Bool(*b)),
            Value::Number(n) => n
                .as_f64()
                .map(|f| Coerced::Bool(f.abs() > 0.0))
                .ok_or_else(wrong_shape),
            Value::String(s) => match s.trim() {
                "true" | "1" => Ok(Coerced::Bool(true)),
                "false" | "0" => Ok(Coerced::Bool(false)),
                _ => Err(wrong_shape()),
            },
            _ => Err(wrong_shape()),
        },
        ValueShape::Number => {
            let number = match value {
                Value::Number(n) => n.as_f64().ok_or_else(wrong_shape)?,
                Value::String(s) => s.trim().parse::<f64>().ok().ok_or_else(wrong_shape)?,
                _ => return Err(wrong_shape()),
            };
            if number.is_finite() {
                Ok(Coerced::Number(number))
            } else {
                Err(BridgeError::NotFinite)
            }
        }
        ValueShape::Color => {
            let malformed = || BridgeError::MalformedColor {
                value: value.to_string(),
            };
            match value {
                Value::String(s) => parse_color_string(s).map(Coerced::Color).ok_or_else(malformed),
                Value::Array(items) => {
                    let channels: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
                    channels
                        .and_then(|c| byte_channels(&c))
                        .map(Coerced::Color)
                        .ok_or_else(malformed)
                }
                Value::Object(map) => {
                    let channels: Option<Vec<f64>> = ["r", "g", "b"]
                        .iter()
                        .map(|key| map.get(*key).and_then(Value::as_f64))
                        .collect();
                    channels
                        .and_then(|c| byte_channels(&c))
                        .map(Coerced::Color)
                        .ok_or_else(malformed)
                }
                _ => Err(wrong_shape()),
            }
        }
    }
}

/// Parse `"#rrggbb"` or a host `"r g b"` string of 0-1 floats.
fn parse_color_string(text: &str) -> Option<Rgb> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range).and_then(|pair| u8::from_str_radix(pair, 16).ok())
        };
        return Some(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?));
    }

    let floats: Option<Vec<f64>> = text
        .split_whitespace()
        .map(|part| part.parse::<f64>().ok())
        .collect();
    let scaled: Vec<f64> = floats?.iter().map(|f| f * 255.0).collect();
    byte_channels(&scaled)
}

/// Three finite 0-255 channel values into a color, rounding and clamping.
fn byte_channels(channels: &[f64]) -> Option<Rgb> {
    let [r, g, b] = channels else {
        return None;
    };
    Some(Rgb::new(to_byte(*r)?, to_byte(*g)?, to_byte(*b)?))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_byte(value: f64) -> Option<u8> {
    // Clamped to [0, 255] first, so the cast is exact.
    value
        .is_finite()
        .then(|| value.round().clamp(0.0, 255.0) as u8)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u32(value: f64) -> u32 {
    // Clamped to the u32 range first, so the cast is exact.
    value.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Write `value` into `field`, or `None` when the value has the wrong kind.
fn assign(settings: &mut Settings, field: SettingField, value: Coerced) -> Option<()> {
    match field {
        SettingField::BackgroundColor => settings.background_color = value.color()?,
        SettingField::ForegroundColor => settings.foreground_color = value.color()?,
        SettingField::CellSize => settings.cell_size = to_u32(value.number()?),
        SettingField::CellPadding => settings.cell_padding = to_u32(value.number()?),
        SettingField::CellCornerRadius => settings.cell_corner_radius = value.number()?,
        SettingField::SimulationSpeed => settings.simulation_speed = value.number()?,
        SettingField::FadeAmount => settings.fade_amount = value.number()?,
        SettingField::StableDisplayTime => settings.stable_display_time = value.number()?,
        SettingField::EdgeWrapping => settings.edge_wrapping = value.bool()?,
        SettingField::NeighborOpacityEnabled => settings.neighbor_opacity_enabled = value.bool()?,
        SettingField::NeighborOpacityIncrement => {
            settings.neighbor_opacity_increment = value.number()?;
        }
        SettingField::ColorMode => settings.color_mode = value.bool()?,
        SettingField::RandomColorChance => settings.random_color_chance = value.number()?,
        SettingField::RandomColorPure => settings.random_color_pure = value.bool()?,
        SettingField::MaxSaturationAge => settings.max_saturation_age = to_u32(value.number()?),
        SettingField::SaturationFactor => settings.saturation_factor = value.number()?,
        SettingField::TryReviveStuckSim => settings.try_revive_stuck_sim = value.bool()?,
        SettingField::HardResetOnStuck => settings.hard_reset_on_stuck = value.bool()?,
        SettingField::MaxRevivalAttempts => {
            settings.max_revival_attempts = to_u32(value.number()?);
        }
        SettingField::GridPopulationPercentage => {
            settings.grid_population_percentage = value.number()?;
        }
        SettingField::BottomMargin => settings.bottom_margin = to_u32(value.number()?),
    }
    Some(())
}
