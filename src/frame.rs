//! Float RGB frame used by the classifier and the overlay primitives.
//!
//! Pixel values are normalized to `[0, 1]`.

use image::{DynamicImage, ImageBuffer, Luma, Rgb as RgbPixel, Rgb32FImage, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use nalgebra::Point2;

/// RGB color in the `[0, 1]` range.
pub type Rgb = [f32; 3];

/// Single channel float image, used for segmentation masks.
pub type MaskImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Axis-aligned pixel rectangle. `right` and `bottom` are exclusive when the
/// rectangle is scanned and inclusive when it is outlined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl PixelRect {
    pub fn new(left: i32, right: i32, top: i32, bottom: i32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Signed area, negative for inverted rectangles.
    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Restrict a scan rectangle to `[0, width) x [0, height)`.
    pub fn clamp_to(&self, width: usize, height: usize) -> Self {
        let w = width as i32;
        let h = height as i32;
        Self {
            left: self.left.clamp(0, w),
            right: self.right.clamp(0, w),
            top: self.top.clamp(0, h),
            bottom: self.bottom.clamp(0, h),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: Rgb32FImage,
}

impl Frame {
    /// Black frame.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            image: Rgb32FImage::new(width as u32, height as u32),
        }
    }

    /// Frame where every pixel holds `color`.
    pub fn filled(width: usize, height: usize, color: Rgb) -> Self {
        Self {
            image: ImageBuffer::from_pixel(width as u32, height as u32, RgbPixel(color)),
        }
    }

    pub fn from_image(image: Rgb32FImage) -> Self {
        Self { image }
    }

    /// Build a frame from interleaved 8-bit RGB. Returns `None` when the
    /// buffer length does not match.
    pub fn from_rgb8(width: usize, height: usize, rgb: &[u8]) -> Option<Self> {
        let image = RgbImage::from_raw(width as u32, height as u32, rgb.to_vec())?;
        Some(Self {
            image: DynamicImage::ImageRgb8(image).into_rgb32f(),
        })
    }

    /// Interleaved 8-bit RGB.
    pub fn to_rgb8(&self) -> Vec<u8> {
        DynamicImage::ImageRgb32F(self.image.clone())
            .into_rgb8()
            .into_raw()
    }

    pub fn width(&self) -> usize {
        self.image.width() as usize
    }

    pub fn height(&self) -> usize {
        self.image.height() as usize
    }

    pub fn image(&self) -> &Rgb32FImage {
        &self.image
    }

    pub fn center(&self) -> Point2<f32> {
        Point2::new(self.width() as f32 / 2.0, self.height() as f32 / 2.0)
    }

    fn in_bounds(&self, x: i32, y: i32) -> Option<(u32, u32)> {
        if x < 0 || y < 0 || x as usize >= self.width() || y as usize >= self.height() {
            return None;
        }
        Some((x as u32, y as u32))
    }

    /// Pixel value, `0.0` outside the frame.
    pub fn get(&self, x: i32, y: i32, c: usize) -> f32 {
        self.in_bounds(x, y)
            .and_then(|(x, y)| self.image.get_pixel(x, y).0.get(c).copied())
            .unwrap_or(0.0)
    }

    /// Write one channel of a pixel; writes outside the frame are ignored.
    pub fn set(&mut self, x: i32, y: i32, c: usize, value: f32) {
        if let Some((x, y)) = self.in_bounds(x, y) {
            if let Some(v) = self.image.get_pixel_mut(x, y).0.get_mut(c) {
                *v = value;
            }
        }
    }

    /// One pixel wide outline. Corners are clamped into the frame first.
    pub fn draw_box(&mut self, rect: PixelRect, rgb: Rgb) {
        if self.width() == 0 || self.height() == 0 {
            return;
        }
        let max_x = self.width() as i32 - 1;
        let max_y = self.height() as i32 - 1;
        let x1 = rect.left.clamp(0, max_x);
        let x2 = rect.right.clamp(0, max_x);
        let y1 = rect.top.clamp(0, max_y);
        let y2 = rect.bottom.clamp(0, max_y);
        if x2 < x1 || y2 < y1 {
            return;
        }
        let outline = Rect::at(x1, y1).of_size((x2 - x1 + 1) as u32, (y2 - y1 + 1) as u32);
        draw_hollow_rect_mut(&mut self.image, outline, RgbPixel(rgb));
    }

    /// Outline `width` pixels thick, growing inwards.
    pub fn draw_box_width(&mut self, rect: PixelRect, width: i32, rgb: Rgb) {
        for i in 0..width {
            let inner =
                PixelRect::new(rect.left + i, rect.right - i, rect.top + i, rect.bottom - i);
            self.draw_box(inner, rgb);
        }
    }

    /// Copy `mask` into the first channel with its top-left corner at
    /// `(dx, dy)`, clipped to the frame.
    pub fn paint_mask(&mut self, mask: &MaskImage, dx: i32, dy: i32) {
        for (x, y, value) in mask.enumerate_pixels() {
            self.set(dx + x as i32, dy + y as i32, 0, value.0[0]);
        }
    }
}
