//! Gradient description: the immutable value the rasterizer reads.
//!
//! A [`Gradient`] is exactly one of a mesh of soft blobs, a linear gradient
//! or a radial gradient. The JSON form uses a `"type"` tag and camelCase
//! field names:
//!
//! ```json
//! { "type": "linear", "angleDeg": 45,
//!   "stops": [{ "offset": 0, "color": "#06b6d4" }, { "offset": 1, "color": "#7c3aed" }] }
//! ```
//!
//! Numbers are not validated here. Every accessor that the rasterizer uses
//! clamps into the documented range, so an out-of-range description still
//! renders.
//!
//! Editing goes through `with_*` / `without_*` transforms that return a new
//! value and leave `self` untouched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::basics::{clamp_finite, clamp_unit};
use crate::color::Color;
use crate::error::DescriptionError;

pub const DEFAULT_SOFTNESS: f64 = 0.75;
pub const DEFAULT_NOISE: f64 = 0.03;
pub const MAX_NOISE: f64 = 0.25;
pub const DEFAULT_VIGNETTE: bool = true;
pub const DEFAULT_BLOB_ALPHA: f64 = 0.9;

// ============================================================================
// Leaf types
// ============================================================================

/// Color stop along a linear axis or radial distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub offset: f64,
    pub color: Color,
}

impl Stop {
    pub const fn new(offset: f64, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Soft-edged colored disc composited onto a mesh gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    /// Center, fraction of surface width.
    pub x: f64,
    /// Center, fraction of surface height.
    pub y: f64,
    /// Radius, fraction of the shorter surface dimension.
    pub r: f64,
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
}

impl Blob {
    pub const fn new(x: f64, y: f64, r: f64, color: Color, alpha: f64) -> Self {
        Self {
            x,
            y,
            r,
            color,
            alpha: Some(alpha),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (clamp_unit(self.x), clamp_unit(self.y))
    }

    pub fn radius(&self) -> f64 {
        clamp_unit(self.r)
    }

    /// Alpha clamped to `[0, 1]`, default 0.9.
    pub fn alpha(&self) -> f64 {
        clamp_finite(self.alpha.unwrap_or(DEFAULT_BLOB_ALPHA), 0.0, 1.0, DEFAULT_BLOB_ALPHA)
    }
}

impl Default for Blob {
    /// The blob an editor appends.
    fn default() -> Self {
        Blob::new(0.3, 0.3, 0.35, Color::new(0x7c, 0x3a, 0xed), 0.88)
    }
}

/// How a blob combines with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// Standard alpha-over.
    #[serde(alias = "source-over")]
    Normal,
    /// Channel-wise sum, clamped. Overlaps glow.
    #[default]
    #[serde(alias = "lighter")]
    Additive,
}

/// Which of the three description variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    Mesh,
    Linear,
    Radial,
}

impl GradientKind {
    pub const ALL: [GradientKind; 3] = [GradientKind::Mesh, GradientKind::Linear, GradientKind::Radial];

    pub fn as_str(&self) -> &'static str {
        match self {
            GradientKind::Mesh => "mesh",
            GradientKind::Linear => "linear",
            GradientKind::Radial => "radial",
        }
    }
}

impl fmt::Display for GradientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradientKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mesh" => Ok(GradientKind::Mesh),
            "linear" => Ok(GradientKind::Linear),
            "radial" => Ok(GradientKind::Radial),
            other => Err(format!("unknown gradient kind {other:?} (expected mesh, linear or radial)")),
        }
    }
}

// ============================================================================
// Variants
// ============================================================================

/// Background plus an ordered stack of blobs; later blobs land on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshGradient {
    pub background: Color,
    #[serde(default)]
    pub blobs: Vec<Blob>,
    #[serde(default)]
    pub blend_mode: BlendMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub softness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vignette: Option<bool>,
}

impl MeshGradient {
    /// Fraction of each blob radius that is soft edge, `[0, 1]`, default 0.75.
    pub fn softness(&self) -> f64 {
        clamp_finite(self.softness.unwrap_or(DEFAULT_SOFTNESS), 0.0, 1.0, DEFAULT_SOFTNESS)
    }

    /// Jitter amplitude as a fraction of full scale, `[0, 0.25]`, default 0.03.
    pub fn noise(&self) -> f64 {
        clamp_finite(self.noise.unwrap_or(DEFAULT_NOISE), 0.0, MAX_NOISE, DEFAULT_NOISE)
    }

    pub fn vignette(&self) -> bool {
        self.vignette.unwrap_or(DEFAULT_VIGNETTE)
    }

    pub fn with_background(&self, background: Color) -> Self {
        Self {
            background,
            ..self.clone()
        }
    }

    pub fn with_blend_mode(&self, blend_mode: BlendMode) -> Self {
        Self {
            blend_mode,
            ..self.clone()
        }
    }

    pub fn with_softness(&self, softness: f64) -> Self {
        Self {
            softness: Some(softness),
            ..self.clone()
        }
    }

    pub fn with_noise(&self, noise: f64) -> Self {
        Self {
            noise: Some(noise),
            ..self.clone()
        }
    }

    pub fn with_vignette(&self, vignette: bool) -> Self {
        Self {
            vignette: Some(vignette),
            ..self.clone()
        }
    }

    /// Append a blob on top of the stack.
    pub fn with_blob(&self, blob: Blob) -> Self {
        let mut blobs = self.blobs.clone();
        blobs.push(blob);
        Self {
            blobs,
            ..self.clone()
        }
    }

    /// Replace the blob at `index`; out-of-range indices leave the value unchanged.
    pub fn with_blob_at(&self, index: usize, blob: Blob) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next.blobs.get_mut(index) {
            *slot = blob;
        }
        next
    }

    /// Remove the blob at `index`; out-of-range indices leave the value unchanged.
    pub fn without_blob(&self, index: usize) -> Self {
        let mut next = self.clone();
        if index < next.blobs.len() {
            next.blobs.remove(index);
        }
        next
    }
}

impl Default for MeshGradient {
    fn default() -> Self {
        Self {
            background: Color::new(0x0b, 0x10, 0x26),
            blobs: vec![
                Blob::new(0.2, 0.8, 0.6, Color::new(0x06, 0xb6, 0xd4), 0.95),
                Blob::new(0.35, 0.35, 0.45, Color::new(0x1e, 0x40, 0xaf), 0.85),
                Blob::new(0.72, 0.35, 0.45, Color::new(0x7c, 0x3a, 0xed), 0.9),
            ],
            blend_mode: BlendMode::Additive,
            softness: None,
            noise: None,
            vignette: None,
        }
    }
}

/// Directional gradient; 0° runs left to right, angles turn clockwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearGradient {
    pub angle_deg: f64,
    #[serde(default)]
    pub stops: Vec<Stop>,
}

impl LinearGradient {
    /// Angle wrapped into `[0, 360)`; non-finite angles read as 0.
    pub fn angle(&self) -> f64 {
        if self.angle_deg.is_finite() {
            self.angle_deg.rem_euclid(360.0)
        } else {
            0.0
        }
    }

    pub fn with_angle(&self, angle_deg: f64) -> Self {
        Self {
            angle_deg,
            ..self.clone()
        }
    }

    pub fn with_stop(&self, stop: Stop) -> Self {
        Self {
            stops: push_stop(&self.stops, stop),
            ..self.clone()
        }
    }

    pub fn with_stop_at(&self, index: usize, stop: Stop) -> Self {
        Self {
            stops: replace_stop(&self.stops, index, stop),
            ..self.clone()
        }
    }

    pub fn without_stop(&self, index: usize) -> Self {
        Self {
            stops: remove_stop(&self.stops, index),
            ..self.clone()
        }
    }
}

impl Default for LinearGradient {
    fn default() -> Self {
        Self {
            angle_deg: 45.0,
            stops: vec![
                Stop::new(0.0, Color::new(0x06, 0xb6, 0xd4)),
                Stop::new(1.0, Color::new(0x7c, 0x3a, 0xed)),
            ],
        }
    }
}

/// Circular gradient around a fractional center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialGradient {
    pub cx: f64,
    pub cy: f64,
    /// Radius, fraction of the shorter surface dimension.
    pub r: f64,
    #[serde(default)]
    pub stops: Vec<Stop>,
}

impl RadialGradient {
    pub fn center(&self) -> (f64, f64) {
        (clamp_unit(self.cx), clamp_unit(self.cy))
    }

    pub fn radius(&self) -> f64 {
        clamp_unit(self.r)
    }

    pub fn with_center(&self, cx: f64, cy: f64) -> Self {
        Self {
            cx,
            cy,
            ..self.clone()
        }
    }

    pub fn with_radius(&self, r: f64) -> Self {
        Self { r, ..self.clone() }
    }

    pub fn with_stop(&self, stop: Stop) -> Self {
        Self {
            stops: push_stop(&self.stops, stop),
            ..self.clone()
        }
    }

    pub fn with_stop_at(&self, index: usize, stop: Stop) -> Self {
        Self {
            stops: replace_stop(&self.stops, index, stop),
            ..self.clone()
        }
    }

    pub fn without_stop(&self, index: usize) -> Self {
        Self {
            stops: remove_stop(&self.stops, index),
            ..self.clone()
        }
    }
}

impl Default for RadialGradient {
    fn default() -> Self {
        Self {
            cx: 0.5,
            cy: 0.5,
            r: 0.7,
            stops: vec![
                Stop::new(0.0, Color::new(0x3b, 0x82, 0xf6)),
                Stop::new(1.0, Color::new(0x11, 0x18, 0x27)),
            ],
        }
    }
}

/// The stop an editor appends.
pub const NEW_STOP: Stop = Stop::new(0.5, Color::new(0x22, 0xd3, 0xee));

fn push_stop(stops: &[Stop], stop: Stop) -> Vec<Stop> {
    let mut next = stops.to_vec();
    next.push(stop);
    next
}

fn replace_stop(stops: &[Stop], index: usize, stop: Stop) -> Vec<Stop> {
    let mut next = stops.to_vec();
    if let Some(slot) = next.get_mut(index) {
        *slot = stop;
    }
    next
}

fn remove_stop(stops: &[Stop], index: usize) -> Vec<Stop> {
    let mut next = stops.to_vec();
    if index < next.len() {
        next.remove(index);
    }
    next
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        fallback
    }
}

fn finite_stops(stops: &[Stop]) -> Vec<Stop> {
    stops
        .iter()
        .map(|s| Stop::new(finite_or(s.offset, 0.0), s.color))
        .collect()
}

// ============================================================================
// Gradient
// ============================================================================

/// A complete gradient description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Gradient {
    Mesh(MeshGradient),
    Linear(LinearGradient),
    Radial(RadialGradient),
}

impl Gradient {
    pub fn default_mesh() -> Self {
        Gradient::Mesh(MeshGradient::default())
    }

    pub fn default_linear() -> Self {
        Gradient::Linear(LinearGradient::default())
    }

    pub fn default_radial() -> Self {
        Gradient::Radial(RadialGradient::default())
    }

    pub fn default_for(kind: GradientKind) -> Self {
        match kind {
            GradientKind::Mesh => Self::default_mesh(),
            GradientKind::Linear => Self::default_linear(),
            GradientKind::Radial => Self::default_radial(),
        }
    }

    pub fn kind(&self) -> GradientKind {
        match self {
            Gradient::Mesh(_) => GradientKind::Mesh,
            Gradient::Linear(_) => GradientKind::Linear,
            Gradient::Radial(_) => GradientKind::Radial,
        }
    }

    /// Keep `self` if it already is `kind`, otherwise that kind's default.
    pub fn into_kind(self, kind: GradientKind) -> Self {
        if self.kind() == kind {
            self
        } else {
            Self::default_for(kind)
        }
    }

    /// Stops of a linear or radial gradient; empty for a mesh.
    pub fn stops(&self) -> &[Stop] {
        match self {
            Gradient::Mesh(_) => &[],
            Gradient::Linear(g) => &g.stops,
            Gradient::Radial(g) => &g.stops,
        }
    }

    /// Copy with every non-finite number replaced by the value the
    /// rasterizer reads it as. JSON has no NaN or infinity, so this is the
    /// form [`to_json`](Self::to_json) writes.
    pub fn finite(&self) -> Self {
        match self {
            Gradient::Mesh(g) => Gradient::Mesh(MeshGradient {
                blobs: g
                    .blobs
                    .iter()
                    .map(|b| Blob {
                        x: finite_or(b.x, 0.0),
                        y: finite_or(b.y, 0.0),
                        r: finite_or(b.r, 0.0),
                        alpha: b.alpha.map(|a| finite_or(a, DEFAULT_BLOB_ALPHA)),
                        ..*b
                    })
                    .collect(),
                softness: g.softness.map(|v| finite_or(v, DEFAULT_SOFTNESS)),
                noise: g.noise.map(|v| finite_or(v, DEFAULT_NOISE)),
                ..g.clone()
            }),
            Gradient::Linear(g) => Gradient::Linear(LinearGradient {
                angle_deg: finite_or(g.angle_deg, 0.0),
                stops: finite_stops(&g.stops),
            }),
            Gradient::Radial(g) => Gradient::Radial(RadialGradient {
                cx: finite_or(g.cx, 0.0),
                cy: finite_or(g.cy, 0.0),
                r: finite_or(g.r, 0.0),
                stops: finite_stops(&g.stops),
            }),
        }
    }

    pub fn to_json(&self) -> Result<String, DescriptionError> {
        Ok(serde_json::to_string_pretty(&self.finite())?)
    }

    pub fn from_json(s: &str) -> Result<Self, DescriptionError> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::default_mesh()
    }
}

impl From<MeshGradient> for Gradient {
    fn from(g: MeshGradient) -> Self {
        Gradient::Mesh(g)
    }
}

impl From<LinearGradient> for Gradient {
    fn from(g: LinearGradient) -> Self {
        Gradient::Linear(g)
    }
}

impl From<RadialGradient> for Gradient {
    fn from(g: RadialGradient) -> Self {
        Gradient::Radial(g)
    }
}

// ============================================================================
// Tests
// ============================================================================
