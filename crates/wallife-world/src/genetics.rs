//! Genetic color inheritance.
//!
//! Newborn cells take the age-weighted average color of their parents,
//! occasionally mutated. Survivors have their colors pushed away from
//! gray as they age, which keeps repeated averaging from washing every
//! lineage out to the same muddy tone.
//!
//! All functions here are pure apart from the randomness drawn from the
//! caller-supplied [`Rng`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use wallife_types::Rgb;

use crate::neighborhood::Neighborhood;

/// Parameters of the color genetics, derived from the runtime settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneticsParams {
    /// Probability in `[0, 1]` that a newborn's color mutates.
    pub random_color_chance: f64,
    /// Mutations draw a fully random color instead of tweaking the
    /// inherited one.
    pub random_color_pure: bool,
    /// Age at which the saturation boost reaches its maximum. At least 1.
    pub max_saturation_age: u32,
    /// Maximum saturation multiplier minus one, in `[0, 1]`.
    pub saturation_factor: f64,
}

impl Default for GeneticsParams {
    fn default() -> Self {
        Self {
            random_color_chance: 0.05,
            random_color_pure: false,
            max_saturation_age: 10,
            saturation_factor: 0.3,
        }
    }
}

/// Round and clamp a channel value into `0..=255`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    // Clamped to [0, 255] first, so the cast is exact.
    value.round().clamp(0.0, 255.0) as u8
}

/// Convert a collection length into an `f64` divisor.
fn len_f64(len: usize) -> f64 {
    f64::from(u32::try_from(len).unwrap_or(u32::MAX))
}

/// A uniformly random color: three independent draws over `0..=255`.
pub fn random_color<R: Rng>(rng: &mut R) -> Rgb {
    Rgb::new(rng.random(), rng.random(), rng.random())
}

/// A mutation that keeps two channels of the lineage: one channel of
/// `base`, chosen uniformly, is forced to 0 or 255 by a coin flip.
pub fn tweak_color<R: Rng>(base: Rgb, rng: &mut R) -> Rgb {
    let channel = rng.random_range(0..3_usize);
    let value = if rng.random_bool(0.5) { 255 } else { 0 };
    base.with_channel(channel, value)
}

/// Rounded per-channel mean. Returns [`Rgb::WHITE`] for an empty set.
pub fn average_colors(colors: &[Rgb]) -> Rgb {
    if colors.is_empty() {
        return Rgb::WHITE;
    }
    let mut sums = [0.0_f64; 3];
    for color in colors {
        for (sum, channel) in sums.iter_mut().zip(color.channels()) {
            *sum += f64::from(channel);
        }
    }
    let n = len_f64(colors.len());
    Rgb::from_channels(sums.map(|sum| to_channel(sum / n)))
}

/// Per-channel mean weighted by each color's age.
///
/// A missing age weighs 1. If `colors` and `ages` differ in length the
/// unweighted [`average_colors`] is returned instead.
pub fn average_colors_weighted(colors: &[Rgb], ages: &[Option<u32>]) -> Rgb {
    if colors.len() != ages.len() {
        return average_colors(colors);
    }
    if colors.is_empty() {
        return Rgb::WHITE;
    }

    let mut sums = [0.0_f64; 3];
    let mut total_weight = 0.0_f64;
    for (color, age) in colors.iter().zip(ages) {
        let weight = f64::from(age.unwrap_or(1));
        total_weight += weight;
        for (sum, channel) in sums.iter_mut().zip(color.channels()) {
            *sum += f64::from(channel) * weight;
        }
    }

    if total_weight <= 0.0 {
        // Every neighbor recorded age 0; treat them as equals.
        return average_colors(colors);
    }
    Rgb::from_channels(sums.map(|sum| to_channel(sum / total_weight)))
}

/// Saturation multiplier for a cell of `age`.
///
/// `1 + min(age, max_age) / max_age * factor`: exactly 1 at age 0 and
/// exactly `1 + factor` from `max_age` onward.
pub fn saturation_scale(age: u32, max_age: u32, factor: f64) -> f64 {
    let max_age = max_age.max(1);
    let boost = f64::from(age.min(max_age)) / f64::from(max_age);
    boost.mul_add(factor, 1.0)
}

/// Push each channel away from the channel mean by [`saturation_scale`].
pub fn saturate(color: Rgb, age: u32, max_age: u32, factor: f64) -> Rgb {
    let scale = saturation_scale(age, max_age, factor);
    let channels = color.channels().map(f64::from);
    let center = channels.iter().sum::<f64>() / 3.0;
    Rgb::from_channels(channels.map(|c| to_channel((c - center).mul_add(scale, center))))
}

/// Color for a cell born into `neighborhood`.
///
/// Draws once from `[0, 1)`; below `random_color_chance` the color
/// mutates (fully random if `random_color_pure`, otherwise a tweak of the
/// inherited color). Otherwise the age-weighted inherited color is used
/// unchanged.
pub fn newborn_color<R: Rng>(
    neighborhood: &Neighborhood,
    params: &GeneticsParams,
    rng: &mut R,
) -> Rgb {
    let roll: f64 = rng.random();
    if roll < params.random_color_chance {
        if params.random_color_pure {
            return random_color(rng);
        }
        let inherited = average_colors_weighted(&neighborhood.colors, &neighborhood.ages);
        return tweak_color(inherited, rng);
    }
    average_colors_weighted(&neighborhood.colors, &neighborhood.ages)
}
