//! Nearest-palette-color voting over a pixel region.

use crate::error::AttributeError;
use crate::frame::{Frame, PixelRect};
use crate::palette::{ColorName, PALETTE, PALETTE_SIZE};

/// Distance between two colors on the 0-255 scale.
pub trait ColorMetric {
    fn distance(&self, a: [f32; 3], b: [f32; 3]) -> f32;
}

/// Plain euclidean distance in RGB space.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl ColorMetric for Euclidean {
    fn distance(&self, a: [f32; 3], b: [f32; 3]) -> f32 {
        let dr = a[0] - b[0];
        let dg = a[1] - b[1];
        let db = a[2] - b[2];
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

/// Red-mean weighted distance, closer to perceived difference than [`Euclidean`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Weighted;

impl ColorMetric for Weighted {
    fn distance(&self, a: [f32; 3], b: [f32; 3]) -> f32 {
        let r_mean = (a[0] + b[0]) / 2.0;
        let dr = a[0] - b[0];
        let dg = a[1] - b[1];
        let db = a[2] - b[2];
        let wr = 2.0 + r_mean / 256.0;
        let wb = 2.0 + (255.0 - r_mean) / 256.0;
        (wr * dr * dr + 4.0 * dg * dg + wb * db * db).sqrt()
    }
}

/// Index of the closest palette entry; ties go to the lower index.
pub fn nearest_entry(metric: &dyn ColorMetric, rgb: [f32; 3]) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (k, entry) in PALETTE.iter().enumerate() {
        let d = metric.distance(rgb, entry.rgb);
        if d < best_dist {
            best_dist = d;
            best = k;
        }
    }
    best
}

/// Saturated pixels come from overlays stamped into the frame, not from the scene.
fn is_saturated(rgb: [f32; 3]) -> bool {
    rgb.iter().any(|v| *v >= 1.0)
}

/// Per palette entry vote counts for one region.
#[derive(Debug, Clone)]
pub struct RegionVotes {
    pub counts: [u32; PALETTE_SIZE],
    pub eligible: u32,
}

impl RegionVotes {
    /// Palette index with the most votes, earliest index on ties.
    pub fn winner(&self) -> Option<usize> {
        if self.eligible == 0 {
            return None;
        }
        let mut best = 0;
        for (k, count) in self.counts.iter().enumerate() {
            if *count > self.counts[best] {
                best = k;
            }
        }
        Some(best)
    }
}

/// Vote every eligible pixel of `region` for its nearest palette entry.
pub fn tally_region(frame: &Frame, region: PixelRect, metric: &dyn ColorMetric) -> RegionVotes {
    let mut votes = RegionVotes {
        counts: [0; PALETTE_SIZE],
        eligible: 0,
    };
    let region = region.clamp_to(frame.width(), frame.height());
    for x in region.left..region.right {
        for y in region.top..region.bottom {
            let px = [frame.get(x, y, 0), frame.get(x, y, 1), frame.get(x, y, 2)];
            if is_saturated(px) {
                continue;
            }
            let rgb = [255.0 * px[0], 255.0 * px[1], 255.0 * px[2]];
            votes.counts[nearest_entry(metric, rgb)] += 1;
            votes.eligible += 1;
        }
    }
    votes
}

/// Dominant color of a region.
///
/// The winner is the single palette entry with the most votes, not the name
/// with the most votes summed over its entries, so a name spread over several
/// entries can lose to a smaller single-entry group.
pub fn classify(
    frame: &Frame,
    region: PixelRect,
    metric: &dyn ColorMetric,
) -> Result<ColorName, AttributeError> {
    let votes = tally_region(frame, region, metric);
    votes
        .winner()
        .map(|k| PALETTE[k].name)
        .ok_or(AttributeError::EmptyRegion(region))
}
