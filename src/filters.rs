//! Post-processing passes applied to a finished mesh surface.
//!
//! Passes run in a fixed order (noise, then vignette) and each touches
//! only the color channels. Alpha is left as it is.

use rand::Rng;

use crate::basics::{channel_round, clamp_unit, smoothstep};
use crate::rendering_buffer::{Surface, BPP};

/// Vignette strength at the corners: the factor there is 0.65.
pub const VIGNETTE_FLOOR: f64 = 0.65;

// ============================================================================
// PostPass trait
// ============================================================================

/// An in-place whole-surface filter.
pub trait PostPass {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    fn apply(&mut self, surface: &mut Surface);
}

// ============================================================================
// NoisePass
// ============================================================================

/// Film-grain jitter: every color channel of every pixel moves by an
/// independent uniform offset in `[-amount·255, +amount·255]`, clamped.
pub struct NoisePass<R> {
    amount: f64,
    rng: R,
}

impl<R: Rng> NoisePass<R> {
    pub fn new(amount: f64, rng: R) -> Self {
        Self {
            amount: clamp_unit(amount),
            rng,
        }
    }
}

impl<R: Rng> PostPass for NoisePass<R> {
    fn name(&self) -> &'static str {
        "noise"
    }

    fn apply(&mut self, surface: &mut Surface) {
        let amp = self.amount * 255.0;
        if amp <= 0.0 {
            return;
        }
        for row in surface.rows_mut() {
            for p in row.chunks_exact_mut(BPP) {
                for c in &mut p[..3] {
                    let jitter = self.rng.random_range(-amp..=amp);
                    *c = channel_round(*c as f64 + jitter);
                }
            }
        }
    }
}

// ============================================================================
// VignettePass
// ============================================================================

/// Radial darkening: 1.0 at the center, easing monotonically down to
/// `floor` at the corners. Distance is normalized by the half-diagonal.
pub struct VignettePass {
    floor: f64,
}

impl VignettePass {
    pub fn new(floor: f64) -> Self {
        Self {
            floor: clamp_unit(floor),
        }
    }

    /// Multiplier at normalized distance `d` (0 center, 1 corner).
    #[inline]
    pub fn factor(&self, d: f64) -> f64 {
        1.0 - (1.0 - self.floor) * smoothstep(d)
    }
}

impl Default for VignettePass {
    fn default() -> Self {
        Self::new(VIGNETTE_FLOOR)
    }
}

impl PostPass for VignettePass {
    fn name(&self) -> &'static str {
        "vignette"
    }

    fn apply(&mut self, surface: &mut Surface) {
        let cx = surface.width() as f64 * 0.5;
        let cy = surface.height() as f64 * 0.5;
        let half_diag = cx.hypot(cy);
        if half_diag <= 0.0 {
            return;
        }
        for (y, row) in surface.rows_mut().enumerate() {
            let dy = y as f64 + 0.5 - cy;
            for (x, p) in row.chunks_exact_mut(BPP).enumerate() {
                let dx = x as f64 + 0.5 - cx;
                let k = self.factor(dx.hypot(dy) / half_diag);
                for c in &mut p[..3] {
                    *c = channel_round(*c as f64 * k);
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn filled(w: u32, h: u32, px: [u8; 4]) -> Surface {
        let mut s = Surface::new(w, h).unwrap();
        for row in s.rows_mut() {
            for p in row.chunks_exact_mut(BPP) {
                p.copy_from_slice(&px);
            }
        }
        s
    }

    #[test]
    fn test_noise_stays_within_amplitude() {
        let mut s = filled(32, 32, [128, 128, 128, 255]);
        let mut pass = NoisePass::new(0.05, SmallRng::seed_from_u64(7));
        pass.apply(&mut s);
        let max_dev = (0.05f64 * 255.0).ceil() as i32;
        let mut changed = false;
        for p in s.as_bytes().chunks_exact(BPP) {
            for &c in &p[..3] {
                assert!((c as i32 - 128).abs() <= max_dev, "c={}", c);
                changed |= c != 128;
            }
            assert_eq!(p[3], 255);
        }
        assert!(changed);
    }

    #[test]
    fn test_noise_clamps_at_extremes() {
        let mut s = filled(8, 8, [0, 255, 0, 255]);
        NoisePass::new(0.25, SmallRng::seed_from_u64(1)).apply(&mut s);
        // Saturated channels can only move inward; no wraparound.
        for p in s.as_bytes().chunks_exact(BPP) {
            assert!(p[0] <= 64);
            assert!(p[1] >= 191);
        }
    }

    #[test]
    fn test_noise_zero_is_identity() {
        let mut s = filled(4, 4, [10, 20, 30, 255]);
        let before = s.clone();
        NoisePass::new(0.0, SmallRng::seed_from_u64(3)).apply(&mut s);
        assert_eq!(s, before);
    }

    #[test]
    fn test_noise_is_reproducible_with_seed() {
        let mut a = filled(16, 16, [100, 100, 100, 255]);
        let mut b = a.clone();
        NoisePass::new(0.1, SmallRng::seed_from_u64(42)).apply(&mut a);
        NoisePass::new(0.1, SmallRng::seed_from_u64(42)).apply(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_vignette_factor_is_monotonic() {
        let v = VignettePass::default();
        assert_eq!(v.factor(0.0), 1.0);
        assert!((v.factor(1.0) - VIGNETTE_FLOOR).abs() < 1e-12);
        let mut prev = v.factor(0.0);
        for i in 1..=100 {
            let f = v.factor(i as f64 / 100.0);
            assert!(f <= prev);
            prev = f;
        }
    }

    #[test]
    fn test_vignette_darkens_corners_not_center() {
        let mut s = filled(101, 61, [200, 200, 200, 255]);
        VignettePass::default().apply(&mut s);
        let center = s.row(30)[50 * BPP];
        let corner = s.row(0)[0];
        assert!(center >= 199, "center={}", center);
        assert!((corner as i32 - 130).abs() <= 3, "corner={}", corner);
        assert_eq!(s.row(0)[3], 255);
        assert_eq!(VignettePass::default().name(), "vignette");
    }
}
