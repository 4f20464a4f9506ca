//! Compositing operations and the compositing pixel format.
//!
//! Mesh blobs are composited either with alpha-over (`SrcOver`) or with a
//! saturating premultiplied sum (`Plus`). [`PixfmtRgba32CompOp`] is a pixel
//! format whose blending is dispatched through a runtime-selected
//! [`CompOp`].

use crate::basics::CoverType;
use crate::color::Rgba8;
use crate::description::BlendMode;
use crate::pixfmt_rgba::{copy_rgba_span, read_rgba, PixelFormat};
use crate::rendering_buffer::{Surface, BPP};

// ============================================================================
// CompOp enum
// ============================================================================

/// Compositing operation, named after the SVG compositing formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompOp {
    /// `Dca' = Sca + Dca.(1 - Sa)`
    #[default]
    SrcOver,
    /// `Dca' = Sca + Dca`, clamped.
    Plus,
}

impl From<BlendMode> for CompOp {
    fn from(mode: BlendMode) -> Self {
        match mode {
            BlendMode::Normal => CompOp::SrcOver,
            BlendMode::Additive => CompOp::Plus,
        }
    }
}

// ============================================================================
// Premultiplied f64 RGBA working space
// ============================================================================

/// Premultiplied RGBA in f64 [0, 1] working space.
#[derive(Debug, Clone, Copy)]
struct PremulRgba {
    r: f64,
    g: f64,
    b: f64,
    a: f64,
}

impl PremulRgba {
    /// Read a destination pixel (RGBA order).
    ///
    /// Surface pixels are stored straight, so they are premultiplied here.
    #[inline]
    fn get_pix(p: &[u8]) -> Self {
        let a = Rgba8::to_double(p[3]);
        Self {
            r: Rgba8::to_double(p[0]) * a,
            g: Rgba8::to_double(p[1]) * a,
            b: Rgba8::to_double(p[2]) * a,
            a,
        }
    }

    /// Write back to a pixel, un-premultiplying.
    #[inline]
    fn set(p: &mut [u8], c: &PremulRgba) {
        if c.a <= 0.0 {
            p.copy_from_slice(&[0, 0, 0, 0]);
            return;
        }
        p[0] = Rgba8::from_double(c.r / c.a);
        p[1] = Rgba8::from_double(c.g / c.a);
        p[2] = Rgba8::from_double(c.b / c.a);
        p[3] = Rgba8::from_double(c.a);
    }

    /// Clamp all components to [0, 1].
    #[inline]
    fn clip(c: &mut PremulRgba) {
        c.r = c.r.clamp(0.0, 1.0);
        c.g = c.g.clamp(0.0, 1.0);
        c.b = c.b.clamp(0.0, 1.0);
        c.a = c.a.clamp(0.0, 1.0);
    }
}

// ============================================================================
// Per-operation blend functions
// ============================================================================

/// Blend pixel `p` with the straight (non-premultiplied) source color.
#[inline]
pub fn comp_op_blend(op: CompOp, p: &mut [u8], c: &Rgba8, cover: CoverType) {
    let s = premultiplied_source(c, cover);
    if s.a <= 0.0 {
        return;
    }
    match op {
        CompOp::SrcOver => blend_src_over(p, &s),
        CompOp::Plus => blend_plus(p, &s),
    }
}

#[inline]
fn premultiplied_source(c: &Rgba8, cover: CoverType) -> PremulRgba {
    let a = Rgba8::to_double(c.a) * cover as f64 / 255.0;
    PremulRgba {
        r: Rgba8::to_double(c.r) * a,
        g: Rgba8::to_double(c.g) * a,
        b: Rgba8::to_double(c.b) * a,
        a,
    }
}

// ---- SrcOver: Dca' = Sca + Dca.(1 - Sa)
#[inline]
fn blend_src_over(p: &mut [u8], s: &PremulRgba) {
    let d = PremulRgba::get_pix(p);
    let s1a = 1.0 - s.a;
    let mut out = PremulRgba {
        r: s.r + d.r * s1a,
        g: s.g + d.g * s1a,
        b: s.b + d.b * s1a,
        a: s.a + d.a * s1a,
    };
    PremulRgba::clip(&mut out);
    PremulRgba::set(p, &out);
}

// ---- Plus: Dca' = Sca + Dca, Da' = Sa + Da
#[inline]
fn blend_plus(p: &mut [u8], s: &PremulRgba) {
    let mut d = PremulRgba::get_pix(p);
    d.a = (d.a + s.a).min(1.0);
    d.r = (d.r + s.r).min(d.a);
    d.g = (d.g + s.g).min(d.a);
    d.b = (d.b + s.b).min(d.a);
    PremulRgba::clip(&mut d);
    PremulRgba::set(p, &d);
}

// ============================================================================
// PixfmtRgba32CompOp: pixel format with runtime-selectable compositing
// ============================================================================

/// RGBA32 pixel format with a runtime-selectable compositing operation.
pub struct PixfmtRgba32CompOp<'a> {
    surface: &'a mut Surface,
    comp_op: CompOp,
}

impl<'a> PixfmtRgba32CompOp<'a> {
    pub fn new_with_op(surface: &'a mut Surface, op: CompOp) -> Self {
        Self { surface, comp_op: op }
    }

    /// Composite a horizontal span of per-pixel colors with uniform coverage.
    pub fn blend_color_hspan(&mut self, x: u32, y: u32, colors: &[Rgba8], cover: CoverType) {
        let op = self.comp_op;
        let start = x as usize * BPP;
        let end = start + colors.len() * BPP;
        let row = &mut self.surface.row_mut(y)[start..end];
        for (p, c) in row.chunks_exact_mut(BPP).zip(colors) {
            comp_op_blend(op, p, c, cover);
        }
    }
}

impl<'a> PixelFormat for PixfmtRgba32CompOp<'a> {
    type ColorType = Rgba8;

    fn width(&self) -> u32 {
        self.surface.width()
    }

    fn height(&self) -> u32 {
        self.surface.height()
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        read_rgba(&*self.surface, x, y)
    }

    fn copy_color_hspan(&mut self, x: u32, y: u32, colors: &[Rgba8]) {
        copy_rgba_span(self.surface, x, y, colors);
    }
}

// ============================================================================
// Tests
// ============================================================================
