use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::DetectionError;
use crate::frame::{MaskImage, PixelRect};

/// Side length of the detector's soft segmentation mask.
pub const MASK_SIDE: usize = 14;

/// Box center and size, normalized to the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl NormalizedBox {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Pixel bounds, truncated toward zero and not clamped.
    pub fn to_pixels(&self, width: usize, height: usize) -> PixelRect {
        let (x, y, w, h) = (self.x as f64, self.y as f64, self.w as f64, self.h as f64);
        let (fw, fh) = (width as f64, height as f64);
        PixelRect::new(
            ((x - w / 2.0) * fw) as i32,
            ((x + w / 2.0) * fw) as i32,
            ((y - h / 2.0) * fh) as i32,
            ((y + h / 2.0) * fh) as i32,
        )
    }

    /// Pixel bounds clamped so that every corner lies on a frame pixel.
    pub fn to_clamped_pixels(&self, width: usize, height: usize) -> PixelRect {
        let mut rect = self.to_pixels(width, height);
        let max_x = width as i32 - 1;
        let max_y = height as i32 - 1;
        rect.left = rect.left.max(0);
        rect.right = rect.right.min(max_x);
        rect.top = rect.top.max(0);
        rect.bottom = rect.bottom.min(max_y);
        rect
    }

    /// Box footprint in whole pixels.
    pub fn footprint(&self, width: usize, height: usize) -> (usize, usize) {
        (
            (self.w * width as f32).max(0.0) as usize,
            (self.h * height as f32).max(0.0) as usize,
        )
    }
}

/// 14x14 soft mask as produced by the detector head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct SegmentationMask {
    values: Vec<f32>,
}

impl SegmentationMask {
    pub fn new(values: Vec<f32>) -> Result<Self, DetectionError> {
        let expected = MASK_SIDE * MASK_SIDE;
        if values.len() != expected {
            return Err(DetectionError::MaskSize {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// The mask as a 14x14 single channel image.
    pub fn to_image(&self) -> MaskImage {
        let side = MASK_SIDE as u32;
        MaskImage::from_raw(side, side, self.values.clone())
            .unwrap_or_else(|| MaskImage::new(side, side))
    }
}

impl TryFrom<Vec<f32>> for SegmentationMask {
    type Error = DetectionError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        SegmentationMask::new(values)
    }
}

impl From<SegmentationMask> for Vec<f32> {
    fn from(mask: SegmentationMask) -> Self {
        mask.values
    }
}

/// A single detection result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: NormalizedBox,
    /// Probability per class, indexed like the class name table.
    pub prob: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<SegmentationMask>,
}

impl Detection {
    pub fn new(bbox: NormalizedBox, prob: Vec<f32>, mask: Option<SegmentationMask>) -> Self {
        Self { bbox, prob, mask }
    }

    /// Comma separated names of every class scoring above `threshold`, or
    /// `None` when no class passes.
    pub fn label(&self, threshold: f32, class_names: &[String]) -> Option<String> {
        let mut names = Vec::new();
        for (j, p) in self.prob.iter().enumerate() {
            if *p > threshold {
                let name = class_names.get(j).map(String::as_str).unwrap_or("unknown");
                debug!("{}: {:.0}%", name, p * 100.0);
                names.push(name);
            }
        }
        if names.is_empty() {
            None
        } else {
            Some(names.join(", "))
        }
    }

    /// Whether the detection's label mentions `person_class`.
    pub fn is_class(&self, person_class: &str, threshold: f32, class_names: &[String]) -> bool {
        self.label(threshold, class_names)
            .map_or(false, |label| label.contains(person_class))
    }
}

/// Detections for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameDetections {
    /// Frame time or sequence index.
    pub timestamp: f64,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// Recorded detector output for a whole stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionFeed {
    #[serde(default)]
    pub class_names: Vec<String>,
    pub frames: Vec<FrameDetections>,
}

impl DetectionFeed {
    /// Load from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("cannot read detection feed {:?}", path))?;
        let feed: DetectionFeed = serde_json::from_str(&data)
            .with_context(|| format!("malformed detection feed {:?}", path))?;
        Ok(feed)
    }

    /// Detections of the frame at `index`, empty past the end of the feed.
    pub fn frame(&self, index: usize) -> &[Detection] {
        self.frames
            .get(index)
            .map(|f| f.detections.as_slice())
            .unwrap_or(&[])
    }
}
