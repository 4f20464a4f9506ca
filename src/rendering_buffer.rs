//! Rendering buffer: an owned, row-oriented RGBA8 surface.
//!
//! A [`Surface`] is a `width × height` block of tightly packed RGBA bytes
//! (4 bytes per pixel, top row first). Allocation is fallible: a surface
//! too large for the host is reported as [`SurfaceError::Allocation`]
//! rather than aborting the process, which is what large exports rely on.

use crate::error::SurfaceError;

/// Bytes per pixel.
pub const BPP: usize = 4;

/// Owned RGBA8 pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Surface {
    /// Allocate a zeroed (transparent black) surface.
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let bytes = Self::byte_len(width, height)?;
        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|_| SurfaceError::Allocation {
                width,
                height,
                bytes,
            })?;
        data.resize(bytes, 0);
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Wrap existing RGBA bytes. Returns `None` if the length does not match.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        match Self::byte_len(width, height) {
            Ok(bytes) if bytes == data.len() => Some(Self {
                data,
                width,
                height,
            }),
            _ => None,
        }
    }

    /// Byte length of a `width × height` surface, rejecting empty and
    /// overflowing sizes.
    pub fn byte_len(width: u32, height: u32) -> Result<usize, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::InvalidSize { width, height });
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(BPP))
            .filter(|&n| n <= isize::MAX as usize)
            .ok_or(SurfaceError::Allocation {
                width,
                height,
                bytes: usize::MAX,
            })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * BPP
    }

    /// Immutable slice for row `y`.
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(
            y < self.height,
            "row {} out of bounds (height={})",
            y,
            self.height
        );
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Mutable slice for row `y`.
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(
            y < self.height,
            "row {} out of bounds (height={})",
            y,
            self.height
        );
        let stride = self.stride();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// Mutable rows, top to bottom.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        let stride = self.stride();
        self.data.chunks_exact_mut(stride)
    }

    /// Fill every byte with `value`.
    pub fn clear(&mut self, value: u8) {
        self.data.fill(value);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Box-filter downsample to `width × height`.
    ///
    /// Each destination pixel averages the source pixels whose centers fall
    /// inside its footprint. Used to compare renders made at different
    /// resolutions.
    pub fn downsample(&self, width: u32, height: u32) -> Result<Surface, SurfaceError> {
        let mut out = Surface::new(width, height)?;
        let sx = self.width as f64 / width as f64;
        let sy = self.height as f64 / height as f64;
        for y in 0..height {
            let y0 = ((y as f64 * sy) as u32).min(self.height - 1);
            let y1 = (((y + 1) as f64 * sy).ceil() as u32).clamp(y0 + 1, self.height);
            let dst = out.row_mut(y);
            for x in 0..width {
                let x0 = ((x as f64 * sx) as u32).min(self.width - 1);
                let x1 = (((x + 1) as f64 * sx).ceil() as u32).clamp(x0 + 1, self.width);
                let mut sum = [0u64; BPP];
                for sy_ in y0..y1 {
                    let src = self.row(sy_);
                    for sx_ in x0..x1 {
                        let off = sx_ as usize * BPP;
                        for (c, s) in sum.iter_mut().enumerate() {
                            *s += src[off + c] as u64;
                        }
                    }
                }
                let n = ((y1 - y0) as u64) * ((x1 - x0) as u64);
                let off = x as usize * BPP;
                for (c, s) in sum.iter().enumerate() {
                    dst[off + c] = ((s + n / 2) / n) as u8;
                }
            }
        }
        Ok(out)
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let s = Surface::new(10, 4).unwrap();
        assert_eq!(s.width(), 10);
        assert_eq!(s.height(), 4);
        assert_eq!(s.stride(), 40);
        assert_eq!(s.as_bytes().len(), 160);
        assert!(s.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zero_size_is_rejected() {
        assert_eq!(
            Surface::new(0, 10).unwrap_err(),
            SurfaceError::InvalidSize {
                width: 0,
                height: 10
            }
        );
        assert!(Surface::new(10, 0).is_err());
    }

    #[test]
    fn test_byte_len() {
        assert_eq!(Surface::byte_len(5120, 2880).unwrap(), 5120 * 2880 * 4);
        assert!(matches!(
            Surface::byte_len(u32::MAX, u32::MAX),
            Err(SurfaceError::Allocation { .. })
        ));
    }

    #[test]
    fn test_rows() {
        let mut s = Surface::new(3, 2).unwrap();
        s.row_mut(1)[0] = 7;
        assert_eq!(s.row(1)[0], 7);
        assert_eq!(s.row(0)[0], 0);
        assert_eq!(s.rows_mut().count(), 2);
    }

    #[test]
    #[should_panic]
    fn test_row_out_of_bounds() {
        let s = Surface::new(3, 2).unwrap();
        let _ = s.row(2);
    }

    #[test]
    fn test_clear() {
        let mut s = Surface::new(4, 4).unwrap();
        s.clear(255);
        assert!(s.as_bytes().iter().all(|&b| b == 255));
    }

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(Surface::from_rgba(2, 2, vec![0; 16]).is_some());
        assert!(Surface::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(Surface::from_rgba(0, 2, Vec::new()).is_none());
    }

    #[test]
    fn test_downsample_averages_blocks() {
        // 4x2 source: left half black, right half white.
        let mut s = Surface::new(4, 2).unwrap();
        for y in 0..2 {
            let row = s.row_mut(y);
            for x in 2..4 {
                row[x * BPP..x * BPP + BPP].copy_from_slice(&[255, 255, 255, 255]);
            }
        }
        let d = s.downsample(2, 1).unwrap();
        assert_eq!(&d.row(0)[0..4], &[0, 0, 0, 0]);
        assert_eq!(&d.row(0)[4..8], &[255, 255, 255, 255]);

        let one = s.downsample(1, 1).unwrap();
        assert_eq!(one.row(0)[0], 128);
    }
}
