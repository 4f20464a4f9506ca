//! High-resolution export: render at the requested size and encode.
//!
//! Export never touches the filesystem. [`export_image`] returns the
//! encoded bytes with their MIME type and extension; writing them out is
//! the caller's business. The export surface lives only for the duration
//! of the call and is dropped after encoding, whether encoding succeeded
//! or not.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::task::{Context, Poll};
use std::time::{Instant, SystemTime};

use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use serde::{Deserialize, Serialize};
use webp_animation::{Encoder, EncoderOptions, EncodingConfig, EncodingType, LossyEncodingConfig};

use crate::basics::uround;
use crate::description::Gradient;
use crate::error::ExportError;
use crate::renderer::{render_to_surface_with_options, RenderOptions};
use crate::rendering_buffer::{Surface, BPP};

/// Quality used when none is given.
pub const DEFAULT_QUALITY: f64 = 0.95;

/// Smallest quality a lossy encoder is asked for.
const MIN_QUALITY: f64 = 0.01;

// ============================================================================
// ExportFormat
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossless; quality is ignored.
    #[default]
    Png,
    Jpeg,
    WebP,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::WebP];

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::WebP => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::WebP => "webp",
        }
    }

    pub fn is_lossy(&self) -> bool {
        !matches!(self, ExportFormat::Png)
    }

    fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::WebP => "webp",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            "webp" => Ok(ExportFormat::WebP),
            other => Err(format!("unknown export format {other:?} (expected png, jpeg or webp)")),
        }
    }
}

// ============================================================================
// Options and presets
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Encoder quality in `(0, 1]`; ignored for PNG.
    pub quality: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: DEFAULT_QUALITY,
        }
    }
}

/// A named output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportPreset {
    pub label: &'static str,
    pub slug: &'static str,
    pub width: u32,
    pub height: u32,
}

pub const PRESETS: [ExportPreset; 6] = [
    ExportPreset {
        label: "HD 1080p",
        slug: "hd",
        width: 1920,
        height: 1080,
    },
    ExportPreset {
        label: "2K QHD",
        slug: "qhd",
        width: 2560,
        height: 1440,
    },
    ExportPreset {
        label: "4K UHD",
        slug: "4k",
        width: 3840,
        height: 2160,
    },
    ExportPreset {
        label: "Ultrawide",
        slug: "ultrawide",
        width: 3440,
        height: 1440,
    },
    ExportPreset {
        label: "5K",
        slug: "5k",
        width: 5120,
        height: 2880,
    },
    ExportPreset {
        label: "Square 1:1",
        slug: "square",
        width: 2048,
        height: 2048,
    },
];

/// The preset an export dialog starts on.
pub const DEFAULT_PRESET: ExportPreset = PRESETS[2];

/// Look up a preset by slug, case-insensitively.
pub fn preset(slug: &str) -> Option<ExportPreset> {
    let slug = slug.trim();
    PRESETS.iter().copied().find(|p| p.slug.eq_ignore_ascii_case(slug))
}

impl fmt::Display for ExportPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}x{})", self.label, self.width, self.height)
    }
}

// ============================================================================
// ExportedImage
// ============================================================================

/// Encoded image bytes plus what a caller needs to save them.
#[derive(Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
}

impl ExportedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    /// `gradient-{w}x{h}-{timestamp}.{ext}` for the current time.
    pub fn suggested_filename(&self) -> String {
        suggested_filename(self.width, self.height, self.format, SystemTime::now())
    }
}

impl fmt::Debug for ExportedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportedImage")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Filename for an export made at `time`.
///
/// The timestamp is RFC 3339 UTC with milliseconds, with `:` and `.`
/// replaced by `-` so it is safe on every filesystem.
pub fn suggested_filename(width: u32, height: u32, format: ExportFormat, time: SystemTime) -> String {
    let stamp = DateTime::<Utc>::from(time).format("%Y-%m-%dT%H-%M-%S-%3fZ");
    format!("gradient-{}x{}-{}.{}", width, height, stamp, format.extension())
}

// ============================================================================
// Export
// ============================================================================

/// Render `gradient` at `width × height` and encode it.
///
/// `quality` is clamped into `(0, 1]`; non-finite values read as the
/// default.
pub async fn export_image(
    gradient: &Gradient,
    width: u32,
    height: u32,
    format: ExportFormat,
    quality: f64,
) -> Result<ExportedImage, ExportError> {
    let options = ExportOptions { format, quality };
    export_image_with(gradient, width, height, &options, &RenderOptions::default()).await
}

pub async fn export_image_with(
    gradient: &Gradient,
    width: u32,
    height: u32,
    options: &ExportOptions,
    render_options: &RenderOptions,
) -> Result<ExportedImage, ExportError> {
    let start = Instant::now();
    let surface = render_to_surface_with_options(gradient, width, height, render_options)?;

    // Give a cooperative executor a turn between the render and the encode.
    YieldNow::default().await;

    let quality = clamp_quality(options.quality);
    let bytes = encode(surface, options.format, quality)?;
    log::info!(
        "exported {}x{} {} ({} bytes) in {:?}",
        width,
        height,
        options.format,
        bytes.len(),
        start.elapsed()
    );
    Ok(ExportedImage {
        bytes,
        format: options.format,
        width,
        height,
    })
}

/// [`export_image`] driven to completion on the current thread.
pub fn export_image_blocking(
    gradient: &Gradient,
    width: u32,
    height: u32,
    format: ExportFormat,
    quality: f64,
) -> Result<ExportedImage, ExportError> {
    pollster::block_on(export_image(gradient, width, height, format, quality))
}

/// Clamp into `(0, 1]`.
pub fn clamp_quality(quality: f64) -> f64 {
    if quality.is_finite() {
        quality.clamp(MIN_QUALITY, 1.0)
    } else {
        DEFAULT_QUALITY
    }
}

/// Encode and consume the surface.
fn encode(surface: Surface, format: ExportFormat, quality: f64) -> Result<Vec<u8>, ExportError> {
    let (w, h) = (surface.width(), surface.height());
    let encode_err = |message: String| ExportError::Encode { format, message };
    match format {
        ExportFormat::Png => {
            let mut out = Vec::new();
            PngEncoder::new(&mut out)
                .write_image(surface.as_bytes(), w, h, ExtendedColorType::Rgba8)
                .map_err(|e| encode_err(e.to_string()))?;
            Ok(out)
        }
        ExportFormat::Jpeg => {
            let rgb = rgba_to_rgb(&surface)?;
            drop(surface);
            let q = uround(quality * 100.0).clamp(1, 100) as u8;
            let mut out = Vec::new();
            JpegEncoder::new_with_quality(&mut out, q)
                .write_image(&rgb, w, h, ExtendedColorType::Rgb8)
                .map_err(|e| encode_err(e.to_string()))?;
            Ok(out)
        }
        ExportFormat::WebP => {
            let options = EncoderOptions {
                encoding_config: Some(EncodingConfig {
                    encoding_type: EncodingType::Lossy(LossyEncodingConfig::default()),
                    quality: (quality * 100.0) as f32,
                    method: 4,
                }),
                ..Default::default()
            };
            let mut encoder =
                Encoder::new_with_options((w, h), options).map_err(|e| encode_err(format!("{e:?}")))?;
            encoder
                .add_frame(surface.as_bytes(), 0)
                .map_err(|e| encode_err(format!("{e:?}")))?;
            let data = encoder.finalize(0).map_err(|e| encode_err(format!("{e:?}")))?;
            Ok(data.to_vec())
        }
    }
}

/// Drop the alpha channel. JPEG has none, and every rendered pixel is
/// opaque anyway.
fn rgba_to_rgb(surface: &Surface) -> Result<Vec<u8>, ExportError> {
    let (width, height) = (surface.width(), surface.height());
    let bytes = width as usize * height as usize * 3;
    let mut rgb = Vec::new();
    rgb.try_reserve_exact(bytes).map_err(|_| ExportError::Allocation {
        width,
        height,
        bytes,
    })?;
    for p in surface.as_bytes().chunks_exact(BPP) {
        rgb.extend_from_slice(&p[..3]);
    }
    Ok(rgb)
}

/// Future that is pending exactly once.
#[derive(Default)]
struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

// ============================================================================
// Tests
// ============================================================================
