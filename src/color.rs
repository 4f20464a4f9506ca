//! Color types and operations.
//!
//! Two color types live here:
//! - [`Color`]: a display-referred RGB triple, 0–255 per channel. This is
//!   the color of the gradient description and serializes as `#rrggbb`.
//!   It carries no alpha; alpha travels separately wherever blending needs it.
//! - [`Rgba8`]: a u8 RGBA pixel value with the fixed-point helpers used by
//!   the pixel format and compositing layers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::basics::{channel_round, clamp_unit, uround};
use crate::error::ColorParseError;

// ============================================================================
// Color (description RGB)
// ============================================================================

/// Opaque RGB color with u8 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    /// Fallback for an empty stop list.
    pub const MID_GRAY: Color = Color::new(128, 128, 128);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`, `rrggbb`, `#rgb` or `rgb` (case-insensitive).
    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ColorParseError::Empty);
        }
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !digits.is_ascii() {
            return Err(ColorParseError::Digit(s.to_string()));
        }
        let nibble = |i: usize| -> Result<u8, ColorParseError> {
            u8::from_str_radix(&digits[i..i + 1], 16)
                .map_err(|_| ColorParseError::Digit(s.to_string()))
        };
        match digits.len() {
            6 => Ok(Self::new(
                nibble(0)? << 4 | nibble(1)?,
                nibble(2)? << 4 | nibble(3)?,
                nibble(4)? << 4 | nibble(5)?,
            )),
            3 => {
                let (r, g, b) = (nibble(0)?, nibble(1)?, nibble(2)?);
                Ok(Self::new(r << 4 | r, g << 4 | g, b << 4 | b))
            }
            _ => Err(ColorParseError::Length(s.to_string())),
        }
    }

    /// Parse a hex color, falling back to opaque black on malformed input.
    pub fn from_hex_or_black(s: &str) -> Self {
        match Self::from_hex(s) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("{e}; using black");
                Self::BLACK
            }
        }
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Build a color from HSL. `h` in degrees (any value, wrapped),
    /// `s` and `l` in `[0, 1]`.
    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        let h = if h.is_finite() { h.rem_euclid(360.0) } else { 0.0 };
        let s = clamp_unit(s);
        let l = clamp_unit(l);

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let hp = h / 60.0;
        let x = chroma * (1.0 - (hp % 2.0 - 1.0).abs());
        let (r1, g1, b1) = match hp as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        Self::new(
            channel_round((r1 + m) * 255.0),
            channel_round((g1 + m) * 255.0),
            channel_round((b1 + m) * 255.0),
        )
    }

    /// Per-channel linear interpolation towards `c` by `k` in `[0, 1]`,
    /// rounded to the nearest integer.
    pub fn lerp(&self, c: &Color, k: f64) -> Color {
        let k = clamp_unit(k);
        let mix = |a: u8, b: u8| channel_round(a as f64 + (b as f64 - a as f64) * k);
        Color::new(mix(self.r, c.r), mix(self.g, c.g), mix(self.b, c.b))
    }

    pub fn to_rgba8(self, alpha: u8) -> Rgba8 {
        Rgba8::new(self.r as u32, self.g as u32, self.b as u32, alpha as u32)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<Rgba8> for Color {
    fn from(c: Rgba8) -> Self {
        Color::new(c.r, c.g, c.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    /// Lenient: a malformed string decodes as black instead of failing the
    /// whole description.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Color::from_hex_or_black(&s))
    }
}

// ============================================================================
// Rgba8 (8-bit per channel pixel)
// ============================================================================

/// RGBA color with u8 components, straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BASE_SHIFT: u32 = 8;
    pub const BASE_SCALE: u32 = 1 << Self::BASE_SHIFT;
    pub const BASE_MASK: u32 = Self::BASE_SCALE - 1;

    pub fn new(r: u32, g: u32, b: u32, a: u32) -> Self {
        Self {
            r: r as u8,
            g: g as u8,
            b: b as u8,
            a: a as u8,
        }
    }

    pub fn to_double(a: u8) -> f64 {
        a as f64 / Self::BASE_MASK as f64
    }

    pub fn from_double(a: f64) -> u8 {
        uround(clamp_unit(a) * Self::BASE_MASK as f64) as u8
    }
}

// ============================================================================
// Tests
// ============================================================================
