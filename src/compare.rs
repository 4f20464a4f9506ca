//! Surface comparison.
//!
//! Measures how far two renders of the same size are apart. Used to check
//! that a description looks the same at different resolutions (render
//! both, downsample the larger, compare).

use std::fmt;

use crate::rendering_buffer::{Surface, BPP};

/// First pixel that differs between two surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffInfo {
    pub x: u32,
    pub y: u32,
    pub pixel_a: [u8; 4],
    pub pixel_b: [u8; 4],
}

/// Result of comparing two surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareResult {
    pub total_pixels: u64,
    /// Pixels that differ by at least 1 in any channel.
    pub different_pixels: u64,
    /// Largest absolute difference of any single channel.
    pub max_channel_diff: u8,
    /// Mean absolute difference over every RGB channel of every pixel.
    pub mean_channel_diff: f64,
    pub first_diff: Option<DiffInfo>,
}

impl CompareResult {
    pub fn identical(&self) -> bool {
        self.different_pixels == 0
    }
}

impl fmt::Display for CompareResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.identical() {
            return write!(f, "IDENTICAL: {} pixels match perfectly", self.total_pixels);
        }
        write!(
            f,
            "DIFFERENT: {}/{} pixels differ ({:.2}%), max_diff={}, mean_diff={:.4}",
            self.different_pixels,
            self.total_pixels,
            self.different_pixels as f64 / self.total_pixels as f64 * 100.0,
            self.max_channel_diff,
            self.mean_channel_diff,
        )?;
        if let Some(ref d) = self.first_diff {
            write!(
                f,
                "\n  First diff at ({}, {}): A={:?} B={:?}",
                d.x, d.y, d.pixel_a, d.pixel_b
            )?;
        }
        Ok(())
    }
}

/// Compare two surfaces pixel by pixel. `None` if their sizes differ.
pub fn compare_surfaces(a: &Surface, b: &Surface) -> Option<CompareResult> {
    if a.width() != b.width() || a.height() != b.height() {
        return None;
    }

    let mut different_pixels = 0u64;
    let mut max_channel_diff = 0u8;
    let mut diff_sum = 0u64;
    let mut first_diff = None;

    for y in 0..a.height() {
        let (ra, rb) = (a.row(y), b.row(y));
        for (x, (pa, pb)) in ra.chunks_exact(BPP).zip(rb.chunks_exact(BPP)).enumerate() {
            let mut pixel_differs = false;
            for c in 0..BPP {
                let diff = pa[c].abs_diff(pb[c]);
                if diff == 0 {
                    continue;
                }
                pixel_differs = true;
                max_channel_diff = max_channel_diff.max(diff);
                if c < 3 {
                    diff_sum += diff as u64;
                }
            }
            if pixel_differs {
                different_pixels += 1;
                if first_diff.is_none() {
                    first_diff = Some(DiffInfo {
                        x: x as u32,
                        y,
                        pixel_a: [pa[0], pa[1], pa[2], pa[3]],
                        pixel_b: [pb[0], pb[1], pb[2], pb[3]],
                    });
                }
            }
        }
    }

    let total_pixels = a.width() as u64 * a.height() as u64;
    Some(CompareResult {
        total_pixels,
        different_pixels,
        max_channel_diff,
        mean_channel_diff: diff_sum as f64 / (total_pixels * 3) as f64,
        first_diff,
    })
}

// ============================================================================
// Tests
// ============================================================================
