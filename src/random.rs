//! Random gradient generation.
//!
//! Colors are drawn in HSL: the hue is uniform on the wheel, while
//! saturation and lightness stay in a band that looks good on screen.
//! Mesh backgrounds are kept dark so additive blobs glow against them.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::color::Color;
use crate::description::{
    BlendMode, Blob, Gradient, GradientKind, LinearGradient, MeshGradient, RadialGradient, Stop,
};

pub const BLOB_COUNT: RangeInclusive<usize> = 3..=5;
pub const STOP_COUNT: RangeInclusive<usize> = 2..=4;
pub const SATURATION: RangeInclusive<f64> = 0.55..=0.9;
pub const LIGHTNESS: RangeInclusive<f64> = 0.45..=0.65;
pub const BACKGROUND_LIGHTNESS: RangeInclusive<f64> = 0.04..=0.14;
pub const BLOB_RADIUS: RangeInclusive<f64> = 0.25..=0.65;
pub const BLOB_ALPHA: RangeInclusive<f64> = 0.7..=0.95;
pub const SOFTNESS: RangeInclusive<f64> = 0.5..=0.95;
pub const NOISE: RangeInclusive<f64> = 0.0..=0.06;
pub const RADIAL_CENTER: RangeInclusive<f64> = 0.2..=0.8;
pub const RADIAL_RADIUS: RangeInclusive<f64> = 0.5..=1.0;

/// A fresh random gradient of `kind`, using the thread-local generator.
pub fn random_gradient(kind: GradientKind) -> Gradient {
    random_gradient_with(kind, &mut rand::rng())
}

/// A random gradient of `kind` drawn from `rng`.
///
/// Seeding `rng` makes the result reproducible.
pub fn random_gradient_with<R: Rng + ?Sized>(kind: GradientKind, rng: &mut R) -> Gradient {
    match kind {
        GradientKind::Mesh => Gradient::Mesh(random_mesh(rng)),
        GradientKind::Linear => Gradient::Linear(LinearGradient {
            angle_deg: rng.random_range(0.0..360.0),
            stops: random_stops(rng),
        }),
        GradientKind::Radial => Gradient::Radial(RadialGradient {
            cx: rng.random_range(RADIAL_CENTER),
            cy: rng.random_range(RADIAL_CENTER),
            r: rng.random_range(RADIAL_RADIUS),
            stops: random_stops(rng),
        }),
    }
}

/// A vivid color: any hue, mid saturation and lightness.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Color {
    Color::from_hsl(
        rng.random_range(0.0..360.0),
        rng.random_range(SATURATION),
        rng.random_range(LIGHTNESS),
    )
}

fn random_background<R: Rng + ?Sized>(rng: &mut R) -> Color {
    Color::from_hsl(
        rng.random_range(0.0..360.0),
        rng.random_range(SATURATION),
        rng.random_range(BACKGROUND_LIGHTNESS),
    )
}

fn random_mesh<R: Rng + ?Sized>(rng: &mut R) -> MeshGradient {
    let count = rng.random_range(BLOB_COUNT);
    let blobs = (0..count)
        .map(|_| Blob {
            x: rng.random_range(0.0..=1.0),
            y: rng.random_range(0.0..=1.0),
            r: rng.random_range(BLOB_RADIUS),
            color: random_color(rng),
            alpha: Some(rng.random_range(BLOB_ALPHA)),
        })
        .collect();
    MeshGradient {
        background: random_background(rng),
        blobs,
        blend_mode: if rng.random_bool(0.7) {
            BlendMode::Additive
        } else {
            BlendMode::Normal
        },
        softness: Some(rng.random_range(SOFTNESS)),
        noise: Some(rng.random_range(NOISE)),
        vignette: Some(rng.random_bool(0.8)),
    }
}

/// 2–4 stops: one at 0, one at 1, and sorted offsets in between.
fn random_stops<R: Rng + ?Sized>(rng: &mut R) -> Vec<Stop> {
    let count = rng.random_range(STOP_COUNT);
    let mut offsets: Vec<f64> = (0..count - 2).map(|_| rng.random_range(0.0..=1.0)).collect();
    offsets.sort_by(f64::total_cmp);

    let mut stops = Vec::with_capacity(count);
    stops.push(Stop::new(0.0, random_color(rng)));
    stops.extend(offsets.into_iter().map(|o| Stop::new(o, random_color(rng))));
    stops.push(Stop::new(1.0, random_color(rng)));
    stops
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_meshes_respect_ranges() {
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..100 {
            let Gradient::Mesh(m) = random_gradient_with(GradientKind::Mesh, &mut rng) else {
                panic!("expected a mesh");
            };
            assert!(!m.blobs.is_empty());
            assert!(BLOB_COUNT.contains(&m.blobs.len()));
            for b in &m.blobs {
                assert!((0.0..=1.0).contains(&b.x));
                assert!((0.0..=1.0).contains(&b.y));
                assert!(BLOB_RADIUS.contains(&b.r));
                assert!(BLOB_ALPHA.contains(&b.alpha()));
            }
            let softness = m.softness.unwrap();
            let noise = m.noise.unwrap();
            assert!(SOFTNESS.contains(&softness));
            assert!(NOISE.contains(&noise));
            let hex = m.background.to_hex();
            assert_eq!(hex.len(), 7);
            assert!(hex.starts_with('#'));
            assert_eq!(Color::from_hex(&hex).unwrap(), m.background);
            // Dark background: lightness at most 0.14.
            let max = m.background.r.max(m.background.g).max(m.background.b);
            let min = m.background.r.min(m.background.g).min(m.background.b);
            assert!((max as f64 + min as f64) / 2.0 <= 0.14 * 255.0 + 1.0);
        }
    }

    #[test]
    fn test_random_stops_are_bracketed() {
        let mut rng = StdRng::seed_from_u64(7);
        for kind in [GradientKind::Linear, GradientKind::Radial] {
            for _ in 0..50 {
                let g = random_gradient_with(kind, &mut rng);
                assert_eq!(g.kind(), kind);
                let stops = g.stops();
                assert!(STOP_COUNT.contains(&stops.len()));
                assert_eq!(stops[0].offset, 0.0);
                assert_eq!(stops[stops.len() - 1].offset, 1.0);
                for w in stops.windows(2) {
                    assert!(w[0].offset <= w[1].offset);
                }
            }
        }
    }

    #[test]
    fn test_random_linear_and_radial_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            if let Gradient::Linear(l) = random_gradient_with(GradientKind::Linear, &mut rng) {
                assert!((0.0..360.0).contains(&l.angle_deg));
            }
            if let Gradient::Radial(r) = random_gradient_with(GradientKind::Radial, &mut rng) {
                assert!(RADIAL_CENTER.contains(&r.cx));
                assert!(RADIAL_CENTER.contains(&r.cy));
                assert!(RADIAL_RADIUS.contains(&r.r));
            }
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = random_gradient_with(GradientKind::Mesh, &mut StdRng::seed_from_u64(5));
        let b = random_gradient_with(GradientKind::Mesh, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_thread_rng_produces_valid_values() {
        for kind in GradientKind::ALL {
            assert_eq!(random_gradient(kind).kind(), kind);
        }
    }
}
