//! Color values used by cells and the drawing surface.

use serde::{Deserialize, Serialize};

/// An opaque 8-bit-per-channel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Pure white, the neutral result of averaging no colors.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Create a color from its three channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Return the channels as `[r, g, b]`.
    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Build a color from `[r, g, b]`.
    pub const fn from_channels(channels: [u8; 3]) -> Self {
        let [r, g, b] = channels;
        Self { r, g, b }
    }

    /// Return a copy with channel `index` (0 = r, 1 = g, 2 = b) replaced.
    ///
    /// Indices above 2 leave the color unchanged.
    #[must_use]
    pub const fn with_channel(self, index: usize, value: u8) -> Self {
        match index {
            0 => Self { r: value, ..self },
            1 => Self { g: value, ..self },
            2 => Self { b: value, ..self },
            _ => self,
        }
    }
}

/// A color with fractional opacity, as passed to the drawing surface.
///
/// Channels are 0-255; `a` is in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Opacity in `[0, 1]`.
    pub a: f64,
}

impl Rgba {
    /// Attach an opacity to an opaque color.
    pub const fn from_rgb(color: Rgb, a: f64) -> Self {
        Self {
            r: color.r,
            g: color.g,
            b: color.b,
            a,
        }
    }

    /// Drop the opacity.
    pub const fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_channel_replaces_one_channel() {
        let base = Rgb::new(10, 20, 30);
        assert_eq!(base.with_channel(0, 255), Rgb::new(255, 20, 30));
        assert_eq!(base.with_channel(1, 0), Rgb::new(10, 0, 30));
        assert_eq!(base.with_channel(2, 7), Rgb::new(10, 20, 7));
        assert_eq!(base.with_channel(3, 7), base);
    }

    #[test]
    fn channels_round_trip() {
        let color = Rgb::new(1, 2, 3);
        assert_eq!(Rgb::from_channels(color.channels()), color);
    }

    #[test]
    fn rgb_deserializes_from_object() {
        let parsed: Result<Rgb, _> = serde_json::from_str(r#"{"r":12,"g":34,"b":56}"#);
        assert_eq!(parsed.ok(), Some(Rgb::new(12, 34, 56)));
    }
}
