use image::imageops::{self, FilterType};

use crate::detection::SegmentationMask;
use crate::frame::{Frame, PixelRect, Rgb};
use crate::track::TrackId;

/// Track box colors, 8-bit RGB. A track uses entry `id % 5`.
pub const TRACK_COLORS: [[f32; 3]; 5] = [
    [255.0, 255.0, 0.0], // Yellow
    [0.0, 255.0, 255.0], // Cyan
    [255.0, 165.0, 0.0], // Orange
    [0.0, 100.0, 0.0],   // Dark green
    [128.0, 0.0, 128.0], // Purple
];

/// Mask values above this are stamped as foreground.
pub const MASK_THRESHOLD: f32 = 0.5;

/// Name a track is shown and logged under.
pub fn track_label(track_id: TrackId) -> String {
    format!("person_{}", track_id)
}

/// Overlay color of a track, scaled into `[0, 1)`.
pub fn track_color(track_id: TrackId) -> Rgb {
    let c = TRACK_COLORS[(track_id % TRACK_COLORS.len() as u64) as usize];
    [c[0] / 256.0, c[1] / 256.0, c[2] / 256.0]
}

/// Text to be drawn with its top-left corner at `(row, col)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub row: i32,
    pub col: i32,
    pub text: String,
    pub rgb: Rgb,
    /// Glyph height hint in pixels.
    pub size: f32,
}

/// Drawing surface for overlays.
///
/// Boxes and masks go straight into the frame. Text needs a font, so
/// implementations decide how labels are rendered.
pub trait Annotator {
    /// Outline `rect` with a border `width` pixels thick, growing inwards.
    fn draw_box(&mut self, frame: &mut Frame, rect: PixelRect, width: i32, rgb: Rgb) {
        frame.draw_box_width(rect, width, rgb);
    }

    fn draw_label(&mut self, frame: &mut Frame, label: TextLabel);

    /// Resize `mask` to `footprint`, binarize it and copy it into the first
    /// channel with its top-left corner at `(x, y)`.
    fn stamp_mask(
        &mut self,
        frame: &mut Frame,
        mask: &SegmentationMask,
        footprint: (usize, usize),
        x: i32,
        y: i32,
    ) {
        if footprint.0 == 0 || footprint.1 == 0 {
            return;
        }
        let mut stamp = imageops::resize(
            &mask.to_image(),
            footprint.0 as u32,
            footprint.1 as u32,
            FilterType::Triangle,
        );
        for value in stamp.pixels_mut() {
            value.0[0] = if value.0[0] > MASK_THRESHOLD { 1.0 } else { 0.0 };
        }
        frame.paint_mask(&stamp, x, y);
    }
}

/// Annotator that keeps labels for a later text renderer.
#[derive(Debug, Clone, Default)]
pub struct LabelQueue {
    labels: Vec<TextLabel>,
    disabled: bool,
}

impl LabelQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue that drops every label; boxes and masks are still drawn.
    pub fn without_labels() -> Self {
        Self {
            labels: Vec::new(),
            disabled: true,
        }
    }

    pub fn labels(&self) -> &[TextLabel] {
        &self.labels
    }

    /// Hand over the queued labels, leaving the queue empty.
    pub fn take(&mut self) -> Vec<TextLabel> {
        std::mem::take(&mut self.labels)
    }
}

impl Annotator for LabelQueue {
    fn draw_label(&mut self, _frame: &mut Frame, label: TextLabel) {
        if !self.disabled {
            self.labels.push(label);
        }
    }
}

/// Track overlay: a box in the track color raised above the person by ten
/// border widths, a `person_<id>` label on its top edge and the mask at the
/// box's top-left corner.
pub fn draw_track(
    annotator: &mut dyn Annotator,
    frame: &mut Frame,
    bounds: PixelRect,
    footprint: (usize, usize),
    track_id: TrackId,
    mask: Option<&SegmentationMask>,
) {
    let width = (frame.height() as f64 * 0.006) as i32;
    let rgb = track_color(track_id);
    let raised_top = bounds.top - width * 10;

    annotator.draw_box(
        frame,
        PixelRect::new(bounds.left, bounds.right, raised_top, bounds.bottom),
        width,
        rgb,
    );
    annotator.draw_label(
        frame,
        TextLabel {
            row: raised_top,
            col: bounds.left,
            text: track_label(track_id),
            rgb,
            size: frame.height() as f32 * 0.01,
        },
    );
    if let Some(mask) = mask {
        annotator.stamp_mask(frame, mask, footprint, bounds.left, bounds.top);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_track_color_cycles() {
        assert_eq!(track_color(1), track_color(6));
        assert_relative_eq!(track_color(0)[0], 255.0 / 256.0);
        assert_relative_eq!(track_color(3)[1], 100.0 / 256.0);
        // never saturated, so overlays in these colors still vote
        for id in 0..5 {
            assert!(track_color(id).iter().all(|v| *v < 1.0));
        }
    }

    #[test]
    fn test_label_queue() {
        let mut frame = Frame::new(4, 4);
        let label = TextLabel {
            row: 1,
            col: 2,
            text: "Blue".to_string(),
            rgb: [0.0, 0.0, 1.0],
            size: 1.0,
        };
        let mut queue = LabelQueue::new();
        queue.draw_label(&mut frame, label.clone());
        assert_eq!(queue.labels(), &[label.clone()]);
        assert_eq!(queue.take().len(), 1);
        assert!(queue.labels().is_empty());

        let mut silent = LabelQueue::without_labels();
        silent.draw_label(&mut frame, label);
        assert!(silent.labels().is_empty());
    }

    #[test]
    fn test_stamp_mask() {
        let mut values = vec![0.0; 196];
        // top-left quadrant set
        for y in 0..7 {
            for x in 0..7 {
                values[y * 14 + x] = 0.9;
            }
        }
        let mask = SegmentationMask::new(values).unwrap();
        let mut frame = Frame::filled(40, 40, [0.3, 0.3, 0.3]);
        let mut queue = LabelQueue::new();
        queue.stamp_mask(&mut frame, &mask, (28, 28), 5, 5);

        assert_eq!(frame.get(5, 5, 0), 1.0);
        assert_eq!(frame.get(30, 30, 0), 0.0);
        // outside the footprint and other channels untouched
        assert_relative_eq!(frame.get(34, 34, 0), 0.3);
        assert_relative_eq!(frame.get(5, 5, 1), 0.3);
    }

    #[test]
    fn test_draw_track() {
        let mut frame = Frame::new(200, 500);
        let mut queue = LabelQueue::new();
        let bounds = PixelRect::new(50, 100, 200, 400);
        draw_track(&mut queue, &mut frame, bounds, (50, 200), 2, None);

        // width 3, raised by 30 pixels
        let rgb = track_color(2);
        assert_relative_eq!(frame.get(75, 170, 0), rgb[0]);
        assert_relative_eq!(frame.get(75, 172, 1), rgb[1]);
        assert_eq!(frame.get(75, 173, 0), 0.0);
        assert_relative_eq!(frame.get(50, 400, 0), rgb[0]);

        let labels = queue.labels();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].text, "person_2");
        assert_eq!((labels[0].row, labels[0].col), (170, 50));
    }

    #[test]
    fn test_stamp_mask_empty_footprint() {
        let mask = SegmentationMask::new(vec![1.0; 196]).unwrap();
        let mut frame = Frame::filled(10, 10, [0.3, 0.3, 0.3]);
        let mut queue = LabelQueue::new();
        queue.stamp_mask(&mut frame, &mask, (0, 6), 2, 2);
        assert_eq!(frame, Frame::filled(10, 10, [0.3, 0.3, 0.3]));
    }

    #[test]
    fn test_stamp_mask_full_mask() {
        let mask = SegmentationMask::new(vec![0.8; 196]).unwrap();
        let mut frame = Frame::new(20, 20);
        let mut queue = LabelQueue::new();
        queue.stamp_mask(&mut frame, &mask, (5, 3), 4, 6);
        for y in 6..9 {
            for x in 4..9 {
                assert_eq!(frame.get(x, y, 0), 1.0);
            }
        }
        assert_eq!(frame.get(9, 6, 0), 0.0);
        assert_eq!(frame.get(4, 9, 0), 0.0);
    }
}
