//! Gradient span generator and gradient functions.
//!
//! A [`GradientFunction`] maps a pixel-space point to a scalar. For the
//! linear and radial shapes that scalar is the ramp position `t`; for a
//! mesh blob it is the blob's opacity falloff. Span generators turn those
//! scalars into rows of colors that a [`PixelFormat`](crate::pixfmt_rgba::PixelFormat)
//! copies or blends.
//!
//! All coordinates are in pixels with the origin at the top-left corner
//! and y growing downward. Pixels are sampled at their centers.

use crate::basics::{clamp_unit, uround};
use crate::color::{Color, Rgba8};
use crate::gradient_lut::ColorFunction;

// ============================================================================
// GradientFunction trait
// ============================================================================

/// Trait for gradient shape functions.
///
/// Maps a 2D point `(x, y)` in pixel space to a scalar, nominally in
/// `[0, 1]`. Callers clamp.
pub trait GradientFunction {
    fn calculate(&self, x: f64, y: f64) -> f64;
}

// ============================================================================
// SpanGenerator trait
// ============================================================================

/// Trait for span generators that produce per-pixel colors.
pub trait SpanGenerator {
    type Color;

    /// Called once before rendering begins.
    fn prepare(&mut self);

    /// Fill `span` with colors for the pixels starting at (x, y).
    fn generate(&mut self, span: &mut [Self::Color], x: u32, y: u32);
}

// ============================================================================
// GradientLinear
// ============================================================================

/// Linear gradient along an axis through the surface center.
///
/// The axis is rotated `angle_deg` clockwise from left-to-right. Its length
/// is `|w·cos θ| + |h·sin θ|`, the shortest axis whose perpendiculars
/// through its endpoints enclose every pixel, so `t` is 0 at one corner
/// and 1 at the opposite one.
#[derive(Debug, Clone, Copy)]
pub struct GradientLinear {
    cx: f64,
    cy: f64,
    dx: f64,
    dy: f64,
}

impl GradientLinear {
    pub fn new(width: f64, height: f64, angle_deg: f64) -> Self {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let len = (width * cos).abs() + (height * sin).abs();
        // Scale the direction by 1/len so the projection is already in t units.
        let inv = if len > 0.0 { 1.0 / len } else { 0.0 };
        Self {
            cx: width * 0.5,
            cy: height * 0.5,
            dx: cos * inv,
            dy: sin * inv,
        }
    }
}

impl GradientFunction for GradientLinear {
    #[inline]
    fn calculate(&self, x: f64, y: f64) -> f64 {
        (x - self.cx) * self.dx + (y - self.cy) * self.dy + 0.5
    }
}

// ============================================================================
// GradientRadial
// ============================================================================

/// Circular gradient: `t` is the distance from the center over the radius.
///
/// A zero radius yields 0 at the exact center and 1 everywhere else.
#[derive(Debug, Clone, Copy)]
pub struct GradientRadial {
    cx: f64,
    cy: f64,
    radius: f64,
}

impl GradientRadial {
    pub fn new(cx: f64, cy: f64, radius: f64) -> Self {
        Self {
            cx,
            cy,
            radius: radius.max(0.0),
        }
    }
}

impl GradientFunction for GradientRadial {
    #[inline]
    fn calculate(&self, x: f64, y: f64) -> f64 {
        let d = (x - self.cx).hypot(y - self.cy);
        if self.radius > 0.0 {
            d / self.radius
        } else if d == 0.0 {
            0.0
        } else {
            1.0
        }
    }
}

// ============================================================================
// BlobFalloff
// ============================================================================

/// Opacity profile of a mesh blob.
///
/// 1 inside the core radius `(1 - softness)·R`, falling linearly to 0 at
/// `R`, and 0 beyond.
#[derive(Debug, Clone, Copy)]
pub struct BlobFalloff {
    cx: f64,
    cy: f64,
    radius: f64,
    core: f64,
}

impl BlobFalloff {
    pub fn new(cx: f64, cy: f64, radius: f64, softness: f64) -> Self {
        let radius = radius.max(0.0);
        Self {
            cx,
            cy,
            radius,
            core: (1.0 - clamp_unit(softness)) * radius,
        }
    }

    /// Pixel rectangle `[x0, x1) × [y0, y1)` whose centers can receive
    /// coverage, clipped to a `width × height` surface. `None` when the
    /// blob touches no pixel.
    pub fn bounds(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        if self.radius <= 0.0 {
            return None;
        }
        let clip = |lo: f64, hi: f64, max: u32| -> Option<(u32, u32)> {
            let a = (lo - 0.5).floor().max(0.0);
            let b = (hi + 0.5).ceil().min(max as f64);
            (a < b).then_some((a as u32, b as u32))
        };
        let (x0, x1) = clip(self.cx - self.radius, self.cx + self.radius, width)?;
        let (y0, y1) = clip(self.cy - self.radius, self.cy + self.radius, height)?;
        Some((x0, y0, x1, y1))
    }
}

impl GradientFunction for BlobFalloff {
    #[inline]
    fn calculate(&self, x: f64, y: f64) -> f64 {
        let d = (x - self.cx).hypot(y - self.cy);
        if d <= self.core {
            1.0
        } else if d >= self.radius {
            0.0
        } else {
            (self.radius - d) / (self.radius - self.core)
        }
    }
}

// ============================================================================
// SpanGradient: ramp-colored spans
// ============================================================================

/// Gradient span generator.
///
/// Combines a gradient function (shape) with a color function (palette
/// lookup): `t` is clamped to `[0, 1]` and mapped onto the palette.
pub struct SpanGradient<'a, G, F> {
    gradient_function: G,
    color_function: &'a F,
}

impl<'a, G: GradientFunction, F: ColorFunction> SpanGradient<'a, G, F> {
    pub fn new(gradient_function: G, color_function: &'a F) -> Self {
        Self {
            gradient_function,
            color_function,
        }
    }
}

impl<'a, G, F> SpanGenerator for SpanGradient<'a, G, F>
where
    G: GradientFunction,
    F: ColorFunction,
{
    type Color = F::Color;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [F::Color], x: u32, y: u32) {
        let last = self.color_function.size().saturating_sub(1) as f64;
        let py = y as f64 + 0.5;
        for (i, pixel) in span.iter_mut().enumerate() {
            let px = x as f64 + i as f64 + 0.5;
            let t = clamp_unit(self.gradient_function.calculate(px, py));
            *pixel = self.color_function.get(uround(t * last) as usize);
        }
    }
}

// ============================================================================
// SpanBlob: one solid color with a falloff alpha
// ============================================================================

/// Span generator for a mesh blob: the blob color with per-pixel alpha
/// `alpha · falloff`.
pub struct SpanBlob {
    falloff: BlobFalloff,
    color: Color,
    alpha: f64,
}

impl SpanBlob {
    pub fn new(falloff: BlobFalloff, color: Color, alpha: f64) -> Self {
        Self {
            falloff,
            color,
            alpha: clamp_unit(alpha),
        }
    }
}

impl SpanGenerator for SpanBlob {
    type Color = Rgba8;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [Rgba8], x: u32, y: u32) {
        let py = y as f64 + 0.5;
        for (i, pixel) in span.iter_mut().enumerate() {
            let px = x as f64 + i as f64 + 0.5;
            let a = Rgba8::from_double(self.alpha * self.falloff.calculate(px, py));
            *pixel = self.color.to_rgba8(a);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
