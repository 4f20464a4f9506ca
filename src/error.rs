//! Error types.
//!
//! Malformed description input never reaches these types: it is clamped or
//! defaulted where it is read. What remains are the failures a caller has
//! to act on: surface allocation, encoding, and unparseable JSON.

use thiserror::Error;

use crate::export::ExportFormat;

/// A color string that is not `#rgb` / `#rrggbb` hex.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("color string is empty")]
    Empty,
    #[error("expected 3 or 6 hex digits, got {0:?}")]
    Length(String),
    #[error("invalid hex digit in {0:?}")]
    Digit(String),
}

/// Failure to allocate a raster surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("cannot allocate {bytes} bytes for a {width}x{height} surface")]
    Allocation { width: u32, height: u32, bytes: usize },
}

/// Failure of an export request.
///
/// Allocation and encoding failures are kept apart so the caller can tell
/// "pick a smaller resolution" from "pick another format".
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid export size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("cannot allocate {bytes} bytes for a {width}x{height} export")]
    Allocation { width: u32, height: u32, bytes: usize },
    #[error("failed to encode {format} image: {message}")]
    Encode { format: ExportFormat, message: String },
}

impl From<SurfaceError> for ExportError {
    fn from(e: SurfaceError) -> Self {
        match e {
            SurfaceError::InvalidSize { width, height } => ExportError::InvalidSize { width, height },
            SurfaceError::Allocation {
                width,
                height,
                bytes,
            } => ExportError::Allocation {
                width,
                height,
                bytes,
            },
        }
    }
}

/// A gradient description that could not be read from or written to JSON.
#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("invalid gradient description: {0}")]
    Json(#[from] serde_json::Error),
}
