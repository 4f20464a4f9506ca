//! RGBA pixel format.
//!
//! Pixel format that reads and writes RGBA32 pixels (4 bytes per pixel,
//! non-premultiplied alpha) in a [`Surface`].
//!
//! Provides the `PixelFormat` trait and the plain copying `PixfmtRgba32`.
//! Compositing lives in [`comp_op`](crate::comp_op).

use crate::color::Rgba8;
use crate::rendering_buffer::{Surface, BPP};

// ============================================================================
// PixelFormat trait
// ============================================================================

/// Trait for pixel formats that write colors into a surface.
///
/// This is the abstraction layer between the renderer and the raw pixel
/// bytes. Coordinates are not bounds-checked beyond the slice indexing of
/// the underlying row; callers clip to the surface first.
pub trait PixelFormat {
    type ColorType;

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Get the pixel color at (x, y).
    fn pixel(&self, x: u32, y: u32) -> Self::ColorType;

    /// Copy a horizontal span of per-pixel colors starting at (x, y).
    fn copy_color_hspan(&mut self, x: u32, y: u32, colors: &[Self::ColorType]);
}

#[inline]
pub(crate) fn read_rgba(surface: &Surface, x: u32, y: u32) -> Rgba8 {
    let off = x as usize * BPP;
    let p = &surface.row(y)[off..off + BPP];
    Rgba8::new(p[0] as u32, p[1] as u32, p[2] as u32, p[3] as u32)
}

#[inline]
pub(crate) fn copy_rgba_span(surface: &mut Surface, x: u32, y: u32, colors: &[Rgba8]) {
    let start = x as usize * BPP;
    let end = start + colors.len() * BPP;
    let row = &mut surface.row_mut(y)[start..end];
    for (p, c) in row.chunks_exact_mut(BPP).zip(colors) {
        p.copy_from_slice(&[c.r, c.g, c.b, c.a]);
    }
}

// ============================================================================
// PixfmtRgba32: non-premultiplied RGBA, 8 bits per channel
// ============================================================================

/// Pixel format for non-premultiplied RGBA32 (4 bytes per pixel).
///
/// Component order: R=0, G=1, B=2, A=3. Spans overwrite what is there.
pub struct PixfmtRgba32<'a> {
    surface: &'a mut Surface,
}

impl<'a> PixfmtRgba32<'a> {
    pub fn new(surface: &'a mut Surface) -> Self {
        Self { surface }
    }

    /// Clear the entire surface to a solid color.
    pub fn clear(&mut self, c: &Rgba8) {
        let px = [c.r, c.g, c.b, c.a];
        for row in self.surface.rows_mut() {
            for p in row.chunks_exact_mut(BPP) {
                p.copy_from_slice(&px);
            }
        }
    }
}

impl<'a> PixelFormat for PixfmtRgba32<'a> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let mut s = Surface::new(100, 50).unwrap();
        let pf = PixfmtRgba32::new(&mut s);
        assert_eq!(pf.width(), 100);
        assert_eq!(pf.height(), 50);
    }

    #[test]
    fn test_copy_color_hspan() {
        let mut s = Surface::new(8, 2).unwrap();
        let mut pf = PixfmtRgba32::new(&mut s);
        let colors = [Rgba8::new(1, 2, 3, 255), Rgba8::new(4, 5, 6, 255)];
        pf.copy_color_hspan(3, 1, &colors);
        assert_eq!(pf.pixel(3, 1), colors[0]);
        assert_eq!(pf.pixel(4, 1), colors[1]);
        assert_eq!(pf.pixel(5, 1), Rgba8::default());
        assert_eq!(pf.pixel(2, 1), Rgba8::default());
        assert_eq!(pf.pixel(3, 0), Rgba8::default());
    }

    #[test]
    fn test_copy_overwrites_alpha() {
        let mut s = Surface::new(2, 1).unwrap();
        let mut pf = PixfmtRgba32::new(&mut s);
        pf.clear(&Rgba8::new(10, 20, 30, 255));
        pf.copy_color_hspan(0, 0, &[Rgba8::new(200, 200, 200, 0)]);
        assert_eq!(pf.pixel(0, 0), Rgba8::new(200, 200, 200, 0));
        assert_eq!(pf.pixel(1, 0), Rgba8::new(10, 20, 30, 255));
    }

    #[test]
    fn test_clear() {
        let mut s = Surface::new(6, 6).unwrap();
        let mut pf = PixfmtRgba32::new(&mut s);
        pf.clear(&Rgba8::new(11, 16, 38, 255));
        for y in 0..6 {
            for x in 0..6 {
                assert_eq!(pf.pixel(x, y), Rgba8::new(11, 16, 38, 255));
            }
        }
    }
}
