//! Garment colors of a person, read from fixed proportions of the person box.

use log::warn;

use crate::color::{classify, Weighted};
use crate::detection::Detection;
use crate::frame::{Frame, PixelRect, Rgb};
use crate::palette::{bottom_color_code, top_color_code, ColorName};
use crate::visualization::{Annotator, TextLabel};

/// Outline color of the sampled regions.
pub const REGION_OUTLINE: Rgb = [0.6, 0.2, 1.0];

/// Name written for a region without a classified color.
pub const UNKNOWN_COLOR: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPart {
    Head,
    UpperBody,
    LowerBody,
}

impl BodyPart {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyPart::Head => "head",
            BodyPart::UpperBody => "upper body",
            BodyPart::LowerBody => "lower body",
        }
    }
}

/// Sampled sub-rectangles of a person box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyRegions {
    pub head: PixelRect,
    pub upper: PixelRect,
    pub lower: PixelRect,
}

/// `base + span * ratio`, truncated as a whole.
fn offset(base: i32, span: i32, ratio: f64) -> i32 {
    (base as f64 + span as f64 * ratio) as i32
}

impl BodyRegions {
    /// Split unclamped person bounds at neck, waist and ankle.
    ///
    /// Every region is inset by 30% of the box width on both sides. Vertically
    /// the head keeps the middle 60% of top..neck, the upper body 30%..80% of
    /// neck..waist and the lower body 20%..60% of waist..ankle.
    pub fn from_bounds(b: PixelRect) -> Self {
        let height = b.bottom - b.top;
        let neck = b.top + height / 8;
        let waist = b.top + height / 2;
        let ankle = b.top + height / 10 * 9;

        let span = b.right - b.left;
        let left = offset(b.left, span, 0.3);
        let right = offset(b.right, span, -0.3);

        let head = PixelRect::new(
            left,
            right,
            offset(b.top, neck - b.top, 0.2),
            offset(neck, neck - b.top, -0.2),
        );
        let upper = PixelRect::new(
            left,
            right,
            offset(neck, waist - neck, 0.3),
            offset(waist, waist - neck, -0.2),
        );
        let lower = PixelRect::new(
            left,
            right,
            offset(waist, ankle - waist, 0.2),
            offset(ankle, ankle - waist, -0.4),
        );
        Self { head, upper, lower }
    }

    pub fn parts(&self) -> [(BodyPart, PixelRect); 3] {
        [
            (BodyPart::Head, self.head),
            (BodyPart::UpperBody, self.upper),
            (BodyPart::LowerBody, self.lower),
        ]
    }
}

/// Garment colors of one person. `None` marks a region without any usable
/// pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonAttributes {
    pub head: Option<ColorName>,
    pub upper: Option<ColorName>,
    pub lower: Option<ColorName>,
}

impl PersonAttributes {
    /// Head and upper body use the top code table, lower body the bottom one.
    pub fn color_code(&self) -> [u8; 3] {
        [
            top_color_code(self.head),
            top_color_code(self.upper),
            bottom_color_code(self.lower),
        ]
    }

    pub fn empty_regions(&self) -> u32 {
        [self.head, self.upper, self.lower]
            .iter()
            .filter(|c| c.is_none())
            .count() as u32
    }
}

/// Display name of an optional color.
pub fn color_label(color: Option<ColorName>) -> &'static str {
    color.map_or(UNKNOWN_COLOR, |c| c.as_str())
}

/// Classify the head, upper and lower body of `detection` and annotate each.
///
/// Regions are handled in that order and each one is outlined right after it
/// is classified, so later regions never vote on earlier outlines.
pub fn extract(
    frame: &mut Frame,
    annotator: &mut dyn Annotator,
    detection: &Detection,
) -> PersonAttributes {
    let (w, h) = (frame.width(), frame.height());
    let bounds = detection.bbox.to_pixels(w, h);
    let footprint = detection.bbox.footprint(w, h);
    let regions = BodyRegions::from_bounds(bounds);
    let width = (h as f64 * 0.003) as i32;

    let mut colors = [None; 3];
    for (slot, (part, region)) in colors.iter_mut().zip(regions.parts()) {
        let color = match classify(frame, region, &Weighted) {
            Ok(color) => Some(color),
            Err(e) => {
                warn!("{} color falls back to {}: {}", part.as_str(), UNKNOWN_COLOR, e);
                None
            }
        };
        *slot = color;

        annotator.draw_box(frame, region, width, REGION_OUTLINE);
        annotator.draw_label(
            frame,
            TextLabel {
                row: region.top + width,
                col: region.left,
                text: color_label(color).to_string(),
                rgb: REGION_OUTLINE,
                size: h as f32 * 0.003,
            },
        );
        if let Some(mask) = &detection.mask {
            annotator.stamp_mask(frame, mask, footprint, region.left, region.top);
        }
    }

    PersonAttributes {
        head: colors[0],
        upper: colors[1],
        lower: colors[2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{NormalizedBox, SegmentationMask};
    use crate::visualization::LabelQueue;

    #[test]
    fn test_region_geometry() {
        let regions = BodyRegions::from_bounds(PixelRect::new(100, 200, 0, 400));
        // neck 50, waist 200, ankle 360
        assert_eq!(regions.head, PixelRect::new(130, 170, 10, 40));
        assert_eq!(regions.upper, PixelRect::new(130, 170, 95, 170));
        assert_eq!(regions.lower, PixelRect::new(130, 170, 232, 296));
    }

    #[test]
    fn test_ankle_uses_integer_steps() {
        // (bot - top) / 10 * 9 with height 99 gives 81, not 89
        let regions = BodyRegions::from_bounds(PixelRect::new(0, 10, 0, 99));
        let waist = 49;
        let ankle = 81;
        assert_eq!(regions.lower.top, (waist as f64 + (ankle - waist) as f64 * 0.2) as i32);
        assert_eq!(regions.lower.bottom, (ankle as f64 - (ankle - waist) as f64 * 0.4) as i32);
    }

    #[test]
    fn test_regions_truncate_whole_expression() {
        // -10 + 0.3 * 25 = -2.5 -> -2, not -10 + 7
        let regions = BodyRegions::from_bounds(PixelRect::new(-10, 15, 0, 80));
        assert_eq!(regions.head.left, -2);
        assert_eq!(regions.head.right, 7);
    }

    fn person_frame() -> Frame {
        // 100x400 frame: blue shirt rows 0..200, black trousers below
        let mut frame = Frame::filled(100, 400, [0.0, 0.0, 0.8]);
        for y in 200..400 {
            for x in 0..100 {
                for c in 0..3 {
                    frame.set(x, y, c, 0.05);
                }
            }
        }
        frame
    }

    #[test]
    fn test_extract_colors_and_codes() {
        let mut frame = person_frame();
        let det = Detection::new(NormalizedBox::new(0.5, 0.5, 1.0, 1.0), vec![0.9], None);
        let mut queue = LabelQueue::new();
        let attrs = extract(&mut frame, &mut queue, &det);

        assert_eq!(attrs.head, Some(ColorName::Blue));
        assert_eq!(attrs.upper, Some(ColorName::Blue));
        assert_eq!(attrs.lower, Some(ColorName::Black));
        assert_eq!(attrs.color_code(), [3, 3, 2]);
        assert_eq!(attrs.empty_regions(), 0);

        let texts: Vec<&str> = queue.labels().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Blue", "Blue", "Black"]);
        // label sits one border width below the region top
        let head = BodyRegions::from_bounds(det.bbox.to_pixels(100, 400)).head;
        assert_eq!(queue.labels()[0].row, head.top + 1);
        assert_eq!(queue.labels()[0].col, head.left);
    }

    #[test]
    fn test_extract_draws_outlines() {
        let mut frame = person_frame();
        let det = Detection::new(NormalizedBox::new(0.5, 0.5, 1.0, 1.0), vec![0.9], None);
        let mut queue = LabelQueue::new();
        extract(&mut frame, &mut queue, &det);
        let upper = BodyRegions::from_bounds(det.bbox.to_pixels(100, 400)).upper;
        assert_eq!(frame.get(upper.left, upper.top, 0), 0.6);
        assert_eq!(frame.get(upper.left, upper.top, 2), 1.0);
    }

    #[test]
    fn test_queued_labels_leave_frame_untouched() {
        let det = Detection::new(NormalizedBox::new(0.5, 0.5, 1.0, 1.0), vec![0.9], None);
        let mut with_labels = person_frame();
        let mut queue = LabelQueue::new();
        extract(&mut with_labels, &mut queue, &det);

        let mut without_labels = person_frame();
        extract(&mut without_labels, &mut LabelQueue::without_labels(), &det);

        // only outlines reach the frame, so a second person still votes on
        // the same pixels either way
        assert_eq!(queue.labels().len(), 3);
        assert_eq!(with_labels, without_labels);
    }

    #[test]
    fn test_saturated_region_is_unknown() {
        let mut frame = Frame::filled(100, 400, [1.0, 1.0, 1.0]);
        let det = Detection::new(NormalizedBox::new(0.5, 0.5, 1.0, 1.0), vec![0.9], None);
        let mut queue = LabelQueue::new();
        let attrs = extract(&mut frame, &mut queue, &det);

        assert_eq!(attrs.head, None);
        assert_eq!(attrs.empty_regions(), 3);
        assert_eq!(attrs.color_code(), [9, 9, 9]);
        assert_eq!(queue.labels()[0].text, UNKNOWN_COLOR);
    }

    #[test]
    fn test_mask_stamped_at_each_region() {
        let mut frame = person_frame();
        let mask = SegmentationMask::new(vec![1.0; 196]).unwrap();
        let det = Detection::new(NormalizedBox::new(0.5, 0.5, 0.5, 0.5), vec![0.9], Some(mask));
        let mut queue = LabelQueue::new();
        extract(&mut frame, &mut queue, &det);

        let regions = BodyRegions::from_bounds(det.bbox.to_pixels(100, 400));
        let (fw, _) = det.bbox.footprint(100, 400);
        // the copy starting at the lower body corner runs off the frame bottom
        let lower = regions.lower;
        let x = lower.left + fw as i32 - 1;
        assert_eq!(frame.get(x, 399, 0), 1.0);
        assert_eq!(frame.get(x, 399, 1), 0.05);
        assert_eq!(frame.get(x + 1, 399, 0), 0.05);
    }
}
