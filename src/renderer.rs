//! Rasterizer entry points.
//!
//! [`render`] fills every pixel of a [`Surface`] from a [`Gradient`]. Every
//! geometric quantity is expressed as a fraction of the surface size, so
//! the same description renders the same picture at any resolution.
//!
//! Mesh gradients are drawn in a fixed order: background, blobs (in list
//! order), noise, vignette.

use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::basics::{clamp_finite, CoverType, COVER_FULL};
use crate::color::Rgba8;
use crate::comp_op::PixfmtRgba32CompOp;
use crate::description::{Gradient, LinearGradient, MeshGradient, RadialGradient};
use crate::error::SurfaceError;
use crate::filters::{NoisePass, PostPass, VignettePass, VIGNETTE_FLOOR};
use crate::gradient_lut::{ColorRamp, GradientLut, DEFAULT_LUT_SIZE};
use crate::pixfmt_rgba::{PixelFormat, PixfmtRgba32};
use crate::rendering_buffer::Surface;
use crate::span_gradient::{
    BlobFalloff, GradientLinear, GradientRadial, SpanBlob, SpanGenerator, SpanGradient,
};

/// Largest device pixel ratio a preview is rendered at.
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 3.0;

/// Knobs that are not part of the description itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Seed for the noise pass. `None` draws a fresh seed per render.
    pub noise_seed: Option<u64>,
    /// Vignette multiplier at the corners.
    pub vignette_floor: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            noise_seed: None,
            vignette_floor: VIGNETTE_FLOOR,
        }
    }
}

impl RenderOptions {
    /// Options with a fixed noise seed, for reproducible output.
    pub fn seeded(seed: u64) -> Self {
        Self {
            noise_seed: Some(seed),
            ..Self::default()
        }
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Render `gradient` into every pixel of `surface`.
pub fn render(surface: &mut Surface, gradient: &Gradient) {
    render_with_options(surface, gradient, &RenderOptions::default());
}

pub fn render_with_options(surface: &mut Surface, gradient: &Gradient, options: &RenderOptions) {
    let start = Instant::now();
    match gradient {
        Gradient::Mesh(mesh) => render_mesh(surface, mesh, options),
        Gradient::Linear(linear) => render_linear(surface, linear),
        Gradient::Radial(radial) => render_radial(surface, radial),
    }
    log::debug!(
        "rendered {} gradient at {}x{} in {:?}",
        gradient.kind(),
        surface.width(),
        surface.height(),
        start.elapsed()
    );
}

/// Allocate a `width × height` surface and render into it.
pub fn render_to_surface(gradient: &Gradient, width: u32, height: u32) -> Result<Surface, SurfaceError> {
    render_to_surface_with_options(gradient, width, height, &RenderOptions::default())
}

pub fn render_to_surface_with_options(
    gradient: &Gradient,
    width: u32,
    height: u32,
    options: &RenderOptions,
) -> Result<Surface, SurfaceError> {
    let mut surface = Surface::new(width, height)?;
    render_with_options(&mut surface, gradient, options);
    Ok(surface)
}

/// Backing-store size of a preview drawn at `css_width × css_height`
/// logical pixels.
///
/// The pixel ratio is clamped to `[1, 3]`; each side is at least 1 px.
pub fn preview_size(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> (u32, u32) {
    let dpr = clamp_finite(device_pixel_ratio, 1.0, MAX_DEVICE_PIXEL_RATIO, 1.0);
    let side = |v: f64| {
        let v = if v.is_finite() { v.max(1.0) } else { 1.0 };
        (v.round() * dpr).round().min(u32::MAX as f64) as u32
    };
    (side(css_width), side(css_height))
}

// ============================================================================
// Span drivers
// ============================================================================

/// Copy generated spans over the rectangle `[x0, x1) × [y0, y1)`.
fn copy_spans<PF, SG>(pf: &mut PF, span_gen: &mut SG, rect: (u32, u32, u32, u32), buf: &mut Vec<Rgba8>)
where
    PF: PixelFormat<ColorType = Rgba8>,
    SG: SpanGenerator<Color = Rgba8>,
{
    let (x0, y0, x1, y1) = rect;
    buf.resize((x1 - x0) as usize, Rgba8::default());
    span_gen.prepare();
    for y in y0..y1 {
        span_gen.generate(buf.as_mut_slice(), x0, y);
        pf.copy_color_hspan(x0, y, buf.as_slice());
    }
}

/// Composite generated spans over the rectangle `[x0, x1) × [y0, y1)`.
fn blend_spans<SG>(
    pf: &mut PixfmtRgba32CompOp<'_>,
    span_gen: &mut SG,
    rect: (u32, u32, u32, u32),
    buf: &mut Vec<Rgba8>,
    cover: CoverType,
) where
    SG: SpanGenerator<Color = Rgba8>,
{
    let (x0, y0, x1, y1) = rect;
    buf.resize((x1 - x0) as usize, Rgba8::default());
    span_gen.prepare();
    for y in y0..y1 {
        span_gen.generate(buf.as_mut_slice(), x0, y);
        pf.blend_color_hspan(x0, y, buf.as_slice(), cover);
    }
}

// ============================================================================
// Per-variant renderers
// ============================================================================

fn render_linear(surface: &mut Surface, linear: &LinearGradient) {
    let (w, h) = (surface.width(), surface.height());
    let lut = GradientLut::new(&ColorRamp::new(&linear.stops), DEFAULT_LUT_SIZE);
    let mut sg = SpanGradient::new(GradientLinear::new(w as f64, h as f64, linear.angle()), &lut);
    let mut buf = Vec::new();
    copy_spans(&mut PixfmtRgba32::new(surface), &mut sg, (0, 0, w, h), &mut buf);
}

fn render_radial(surface: &mut Surface, radial: &RadialGradient) {
    let (w, h) = (surface.width(), surface.height());
    let (cx, cy) = radial.center();
    let radius = radial.radius() * w.min(h) as f64;
    let lut = GradientLut::new(&ColorRamp::new(&radial.stops), DEFAULT_LUT_SIZE);
    let shape = GradientRadial::new(cx * w as f64, cy * h as f64, radius);
    let mut sg = SpanGradient::new(shape, &lut);
    let mut buf = Vec::new();
    copy_spans(&mut PixfmtRgba32::new(surface), &mut sg, (0, 0, w, h), &mut buf);
}

fn render_mesh(surface: &mut Surface, mesh: &MeshGradient, options: &RenderOptions) {
    let (w, h) = (surface.width(), surface.height());
    let min_dim = w.min(h) as f64;
    let softness = mesh.softness();

    PixfmtRgba32::new(surface).clear(&mesh.background.to_rgba8(255));

    let mut pf = PixfmtRgba32CompOp::new_with_op(surface, mesh.blend_mode.into());
    let mut buf = Vec::new();
    for blob in &mesh.blobs {
        let (bx, by) = blob.center();
        let falloff = BlobFalloff::new(bx * w as f64, by * h as f64, blob.radius() * min_dim, softness);
        let Some(rect) = falloff.bounds(w, h) else {
            continue;
        };
        let mut sg = SpanBlob::new(falloff, blob.color, blob.alpha());
        blend_spans(&mut pf, &mut sg, rect, &mut buf, COVER_FULL);
    }

    let mut passes: Vec<Box<dyn PostPass>> = Vec::new();
    let noise = mesh.noise();
    if noise > 0.0 {
        let seed = options.noise_seed.unwrap_or_else(|| rand::rng().random());
        passes.push(Box::new(NoisePass::new(noise, SmallRng::seed_from_u64(seed))));
    }
    if mesh.vignette() {
        passes.push(Box::new(VignettePass::new(options.vignette_floor)));
    }
    for pass in &mut passes {
        let start = Instant::now();
        pass.apply(surface);
        log::debug!("{} pass on {}x{} took {:?}", pass.name(), w, h, start.elapsed());
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::description::{BlendMode, Blob, Stop};
    use crate::rendering_buffer::BPP;

    fn px(s: &Surface, x: u32, y: u32) -> [u8; 4] {
        let off = x as usize * BPP;
        let r = s.row(y);
        [r[off], r[off + 1], r[off + 2], r[off + 3]]
    }

    fn plain_mesh(blend_mode: BlendMode, blobs: Vec<Blob>) -> Gradient {
        Gradient::Mesh(MeshGradient {
            background: Color::BLACK,
            blobs,
            blend_mode,
            softness: Some(0.0),
            noise: Some(0.0),
            vignette: Some(false),
        })
    }

    #[test]
    fn test_linear_zero_degrees_black_to_white() {
        let g = Gradient::Linear(LinearGradient {
            angle_deg: 0.0,
            stops: vec![Stop::new(0.0, Color::BLACK), Stop::new(1.0, Color::WHITE)],
        });
        let s = render_to_surface(&g, 100, 10).unwrap();
        for y in 0..10 {
            assert!(px(&s, 0, y)[0] <= 2);
            assert!(px(&s, 99, y)[0] >= 253);
        }
        assert_eq!(px(&s, 40, 0), px(&s, 40, 9));
    }

    #[test]
    fn test_linear_ninety_degrees_top_to_bottom() {
        let g = Gradient::Linear(LinearGradient {
            angle_deg: 90.0,
            stops: vec![Stop::new(0.0, Color::BLACK), Stop::new(1.0, Color::WHITE)],
        });
        let s = render_to_surface(&g, 10, 100).unwrap();
        assert!(px(&s, 5, 0)[0] <= 2);
        assert!(px(&s, 5, 99)[0] >= 253);
        assert_eq!(px(&s, 0, 50), px(&s, 9, 50));
    }

    #[test]
    fn test_radial_center_red_corner_darker() {
        let g = Gradient::Radial(RadialGradient {
            cx: 0.5,
            cy: 0.5,
            r: 1.0,
            stops: vec![Stop::new(0.0, Color::new(255, 0, 0)), Stop::new(1.0, Color::BLACK)],
        });
        let s = render_to_surface(&g, 100, 100).unwrap();
        let center = px(&s, 50, 50);
        let corner = px(&s, 0, 0);
        assert!(center[0] >= 250, "center={:?}", center);
        assert!(corner[0] < center[0]);
        assert_eq!(center[3], 255);
    }

    #[test]
    fn test_radial_zero_radius_paints_last_stop() {
        let g = Gradient::Radial(RadialGradient {
            cx: 0.5,
            cy: 0.5,
            r: 0.0,
            stops: vec![Stop::new(0.0, Color::WHITE), Stop::new(1.0, Color::new(0, 0, 255))],
        });
        let s = render_to_surface(&g, 10, 10).unwrap();
        assert_eq!(px(&s, 0, 0), [0, 0, 255, 255]);
        assert_eq!(px(&s, 5, 5), [0, 0, 255, 255]);
    }

    #[test]
    fn test_empty_stops_render_gray() {
        let g = Gradient::Linear(LinearGradient {
            angle_deg: 10.0,
            stops: Vec::new(),
        });
        let s = render_to_surface(&g, 4, 4).unwrap();
        assert_eq!(px(&s, 2, 2), [128, 128, 128, 255]);
    }

    #[test]
    fn test_mesh_additive_sums_overlap() {
        let blobs = vec![
            Blob::new(0.5, 0.5, 0.5, Color::new(255, 0, 0), 1.0),
            Blob::new(0.5, 0.5, 0.5, Color::new(0, 255, 0), 1.0),
        ];
        let s = render_to_surface(&plain_mesh(BlendMode::Additive, blobs), 64, 64).unwrap();
        assert_eq!(px(&s, 32, 32), [255, 255, 0, 255]);
        // Outside both blobs only the background remains.
        assert_eq!(px(&s, 0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn test_mesh_normal_is_alpha_over() {
        let blobs = vec![
            Blob::new(0.5, 0.5, 0.5, Color::new(255, 0, 0), 1.0),
            Blob::new(0.5, 0.5, 0.5, Color::new(0, 255, 0), 1.0),
        ];
        let s = render_to_surface(&plain_mesh(BlendMode::Normal, blobs), 64, 64).unwrap();
        assert_eq!(px(&s, 32, 32), [0, 255, 0, 255]);
    }

    #[test]
    fn test_mesh_soft_edge_fades() {
        let blobs = vec![Blob::new(0.5, 0.5, 0.5, Color::WHITE, 1.0)];
        let g = plain_mesh(BlendMode::Normal, blobs);
        let g = match g {
            Gradient::Mesh(m) => Gradient::Mesh(m.with_softness(1.0)),
            other => other,
        };
        let s = render_to_surface(&g, 100, 100).unwrap();
        let center = px(&s, 50, 50)[0];
        let mid = px(&s, 75, 50)[0];
        let edge = px(&s, 99, 50)[0];
        assert!(center > mid && mid > edge, "{} {} {}", center, mid, edge);
    }

    #[test]
    fn test_mesh_vignette_darkens_corners() {
        let g = Gradient::Mesh(MeshGradient {
            background: Color::new(200, 200, 200),
            blobs: Vec::new(),
            blend_mode: BlendMode::Additive,
            softness: None,
            noise: Some(0.0),
            vignette: Some(true),
        });
        let s = render_to_surface(&g, 80, 60).unwrap();
        assert!(px(&s, 40, 30)[0] >= 199);
        assert!(px(&s, 0, 0)[0] < 140);
    }

    #[test]
    fn test_vignette_runs_after_noise() {
        let g = Gradient::Mesh(MeshGradient {
            background: Color::new(128, 128, 128),
            blobs: Vec::new(),
            blend_mode: BlendMode::Normal,
            softness: None,
            noise: Some(0.2),
            vignette: Some(true),
        });
        let (w, h) = (64u32, 48u32);
        let s = render_to_surface_with_options(&g, w, h, &RenderOptions::seeded(7)).unwrap();
        let vignette = VignettePass::new(VIGNETTE_FLOOR);
        let half_diag = (w as f64 * 0.5).hypot(h as f64 * 0.5);
        let amp = 0.2 * 255.0;
        let mut max_dev = 0.0f64;
        for y in 0..h {
            for x in 0..w {
                let dx = x as f64 + 0.5 - w as f64 * 0.5;
                let dy = y as f64 + 0.5 - h as f64 * 0.5;
                let k = vignette.factor(dx.hypot(dy) / half_diag);
                // Jitter applied before darkening is scaled by k as well.
                let bound = (amp * k).ceil() + 1.0;
                for c in &px(&s, x, y)[..3] {
                    let dev = (*c as f64 - 128.0 * k).abs();
                    assert!(dev <= bound, "({x},{y}) dev={dev} bound={bound}");
                    max_dev = max_dev.max(dev);
                }
            }
        }
        assert!(max_dev > 5.0, "noise had no effect");
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let g = Gradient::default_mesh();
        let opts = RenderOptions::seeded(99);
        let a = render_to_surface_with_options(&g, 48, 32, &opts).unwrap();
        let b = render_to_surface_with_options(&g, 48, 32, &opts).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_render_overwrites_previous_contents() {
        let g = Gradient::default_linear();
        let mut s = Surface::new(16, 16).unwrap();
        s.clear(77);
        render(&mut s, &g);
        let fresh = render_to_surface(&g, 16, 16).unwrap();
        assert_eq!(s, fresh);
    }

    #[test]
    fn test_non_finite_fields_do_not_panic() {
        let g = Gradient::Mesh(MeshGradient {
            background: Color::BLACK,
            blobs: vec![Blob {
                x: f64::NAN,
                y: f64::INFINITY,
                r: -3.0,
                color: Color::WHITE,
                alpha: Some(f64::NAN),
            }],
            blend_mode: BlendMode::Normal,
            softness: Some(f64::NAN),
            noise: Some(f64::INFINITY),
            vignette: None,
        });
        render_to_surface(&g, 8, 8).unwrap();
        let g = Gradient::Linear(LinearGradient {
            angle_deg: f64::NAN,
            stops: vec![Stop::new(f64::NAN, Color::WHITE)],
        });
        render_to_surface(&g, 8, 8).unwrap();
    }

    #[test]
    fn test_preview_size() {
        assert_eq!(preview_size(320.0, 180.0, 2.0), (640, 360));
        assert_eq!(preview_size(320.0, 180.0, 8.0), (960, 540));
        assert_eq!(preview_size(320.0, 180.0, 0.5), (320, 180));
        assert_eq!(preview_size(0.0, f64::NAN, f64::NAN), (1, 1));
    }

    #[test]
    fn test_options_default() {
        let o = RenderOptions::default();
        assert_eq!(o.noise_seed, None);
        assert_eq!(o.vignette_floor, VIGNETTE_FLOOR);
        assert_eq!(RenderOptions::seeded(5).noise_seed, Some(5));
    }
}
