//! # gradient-studio
//!
//! Gradient rendering and export engine. A gradient is described as a
//! plain value (a mesh of soft blobs, a linear ramp or a radial ramp),
//! rasterized at any size, and encoded as PNG, JPEG or WebP.
//!
//! ## Architecture
//!
//! Rendering is a short pipeline:
//!
//! 1. **Description**: [`Gradient`], the immutable input
//! 2. **Color interpolation**: stops are normalized into a
//!    [`ColorRamp`](gradient_lut::ColorRamp) and sampled into a lookup table
//! 3. **Span generation**: gradient functions map each pixel center to a
//!    ramp position or a blob opacity
//! 4. **Pixel format**: spans are copied or composited into a [`Surface`]
//! 5. **Post passes**: mesh noise and vignette
//!
//! [`export_image`] runs the pipeline at full output size and encodes the
//! result.
//!
//! ```
//! use gradient_studio::{render_to_surface, Gradient};
//!
//! let surface = render_to_surface(&Gradient::default_linear(), 320, 180).unwrap();
//! assert_eq!(surface.as_bytes().len(), 320 * 180 * 4);
//! ```

// Foundation types
pub mod basics;
pub mod color;
pub mod description;
pub mod error;

// Rasterizer
pub mod comp_op;
pub mod filters;
pub mod gradient_lut;
pub mod pixfmt_rgba;
pub mod renderer;
pub mod rendering_buffer;
pub mod span_gradient;

// Generation, export and tooling
pub mod compare;
pub mod export;
pub mod random;

pub use color::Color;
pub use description::{BlendMode, Blob, Gradient, GradientKind, LinearGradient, MeshGradient, RadialGradient, Stop};
pub use error::{ColorParseError, DescriptionError, ExportError, SurfaceError};
pub use export::{
    export_image, export_image_blocking, export_image_with, preset, suggested_filename, ExportFormat, ExportOptions,
    ExportPreset, ExportedImage, PRESETS,
};
pub use gradient_lut::color_at;
pub use random::{random_gradient, random_gradient_with};
pub use renderer::{render, render_to_surface, render_to_surface_with_options, render_with_options, RenderOptions};
pub use rendering_buffer::Surface;
