//! Color interpolation along stops, and the lookup table built from it.
//!
//! [`ColorRamp`] normalizes a stop list once (clamp offsets to `[0, 1]`,
//! stable sort) and answers [`ColorRamp::color_at`]. [`GradientLut`] samples
//! a ramp into a fixed-size table so span generators can map a gradient
//! position to a pixel color with one index.

use crate::basics::{clamp_unit, uround};
use crate::color::{Color, Rgba8};
use crate::description::Stop;

/// Color returned for an empty stop list.
pub const FALLBACK_COLOR: Color = Color::MID_GRAY;

/// Default LUT size. Large enough that a 5120 px wide ramp has no visible
/// steps beyond the 8-bit channel quantization itself.
pub const DEFAULT_LUT_SIZE: usize = 1024;

// ============================================================================
// ColorFunction trait
// ============================================================================

/// Indexed access to a color palette of known size.
pub trait ColorFunction {
    type Color;

    fn size(&self) -> usize;
    fn get(&self, index: usize) -> Self::Color;
}

// ============================================================================
// ColorRamp
// ============================================================================

/// Stops with offsets clamped to `[0, 1]` and stably sorted.
///
/// Stops sharing an offset keep their definition order, so at that offset
/// the first-defined stop wins when approached from below.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<Stop>,
}

impl ColorRamp {
    pub fn new(stops: &[Stop]) -> Self {
        let mut stops: Vec<Stop> = stops
            .iter()
            .map(|s| Stop::new(clamp_unit(s.offset), s.color))
            .collect();
        // `sort_by` is stable.
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Self { stops }
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Color at position `t`.
    ///
    /// Before the first stop the first color holds, after the last stop the
    /// last color holds; in between R, G and B interpolate linearly and
    /// independently. NaN reads as 0.
    pub fn color_at(&self, t: f64) -> Color {
        let stops = match self.stops.as_slice() {
            [] => return FALLBACK_COLOR,
            [only] => return only.color,
            stops => stops,
        };
        let t = if t.is_nan() { 0.0 } else { t };

        let first = &stops[0];
        let last = &stops[stops.len() - 1];
        if t <= first.offset {
            return first.color;
        }
        if t >= last.offset {
            return last.color;
        }

        // first.offset < t < last.offset, so 1 <= i <= len - 1.
        let i = stops.partition_point(|s| s.offset < t);
        let s0 = &stops[i - 1];
        let s1 = &stops[i];
        let span = s1.offset - s0.offset;
        if span <= 0.0 {
            return s1.color;
        }
        s0.color.lerp(&s1.color, (t - s0.offset) / span)
    }
}

/// Color at `t` for an arbitrary (unsorted, unclamped) stop list.
pub fn color_at(stops: &[Stop], t: f64) -> Color {
    ColorRamp::new(stops).color_at(t)
}

// ============================================================================
// GradientLut
// ============================================================================

/// Gradient color lookup table sampled from a [`ColorRamp`].
///
/// Entry `i` holds the ramp color at `i / (size - 1)`, so the first and last
/// entries are exactly the first and last stop colors.
pub struct GradientLut {
    color_lut: Vec<Rgba8>,
}

impl GradientLut {
    pub fn new(ramp: &ColorRamp, lut_size: usize) -> Self {
        let lut_size = lut_size.max(2);
        let last = (lut_size - 1) as f64;
        let color_lut = (0..lut_size)
            .map(|i| ramp.color_at(i as f64 / last).to_rgba8(255))
            .collect();
        Self { color_lut }
    }

    pub fn from_stops(stops: &[Stop]) -> Self {
        Self::new(&ColorRamp::new(stops), DEFAULT_LUT_SIZE)
    }

    /// Index of the entry nearest to position `t` (clamped to `[0, 1]`).
    #[inline]
    pub fn index_of(&self, t: f64) -> usize {
        uround(clamp_unit(t) * (self.color_lut.len() - 1) as f64) as usize
    }

    #[inline]
    pub fn lookup(&self, t: f64) -> Rgba8 {
        self.color_lut[self.index_of(t)]
    }
}

impl ColorFunction for GradientLut {
    type Color = Rgba8;

    fn size(&self) -> usize {
        self.color_lut.len()
    }

    fn get(&self, index: usize) -> Rgba8 {
        self.color_lut[index.min(self.color_lut.len() - 1)]
    }
}

// ============================================================================
// Tests
// ============================================================================
