//! Foundation types and numeric helpers.
//!
//! Rounding helpers shared by the color, gradient and compositing layers,
//! plus the sanitizing clamps that turn arbitrary description numbers into
//! values the rasterizer can use without failing.

/// Coverage / alpha value type (0 = transparent, 255 = opaque).
pub type CoverType = u8;

pub const COVER_SHIFT: u32 = 8;
pub const COVER_SIZE: u32 = 1 << COVER_SHIFT;
pub const COVER_MASK: u32 = COVER_SIZE - 1;
pub const COVER_FULL: CoverType = COVER_MASK as CoverType;

/// Round a double to the nearest unsigned integer (round half up).
///
/// Negative inputs saturate to zero.
#[inline]
pub fn uround(v: f64) -> u32 {
    (v + 0.5) as u32
}

/// Round to the nearest integer and clamp into the 8-bit channel range.
#[inline]
pub fn channel_round(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    uround(v.clamp(0.0, 255.0)) as u8
}

/// Clamp `v` into `[lo, hi]`, substituting `fallback` for NaN and infinities.
#[inline]
pub fn clamp_finite(v: f64, lo: f64, hi: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v.clamp(lo, hi)
    } else {
        fallback
    }
}

/// Clamp into `[0, 1]`; non-finite values become 0.
#[inline]
pub fn clamp_unit(v: f64) -> f64 {
    clamp_finite(v, 0.0, 1.0, 0.0)
}

/// Hermite smoothstep on `[0, 1]`.
#[inline]
pub fn smoothstep(t: f64) -> f64 {
    let t = clamp_unit(t);
    t * t * (3.0 - 2.0 * t)
}

// ============================================================================
// Tests
// ============================================================================
