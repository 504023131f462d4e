//! OpenCV glue: reading frames, converting them to [`Frame`] and back, and
//! rendering queued text labels.

use anyhow::{anyhow, Context};
use log::{info, warn};
use opencv::{
    core::{Mat, Point, Scalar, Size, CV_8UC3},
    imgcodecs, imgproc,
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter},
};
use std::fs;
use std::path::{Path, PathBuf};

use crate::frame::Frame;
use crate::visualization::TextLabel;

fn is_image_path(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg" | "png" | "bmp"),
        None => false,
    }
}

/// Convert an 8-bit BGR `Mat` into a float RGB frame.
pub fn mat_to_frame(mat: &Mat) -> anyhow::Result<Frame> {
    if mat.typ() != CV_8UC3 {
        return Err(anyhow!("expected an 8-bit 3 channel image, got type {}", mat.typ()));
    }
    let owned;
    let mat = if mat.is_continuous() {
        mat
    } else {
        owned = mat.try_clone()?;
        &owned
    };
    let (width, height) = (mat.cols() as usize, mat.rows() as usize);
    let rgb: Vec<u8> = mat
        .data_bytes()?
        .chunks_exact(3)
        .flat_map(|bgr| [bgr[2], bgr[1], bgr[0]])
        .collect();
    Frame::from_rgb8(width, height, &rgb)
        .ok_or_else(|| anyhow!("image buffer does not match {}x{}", width, height))
}

/// Convert a frame back into an 8-bit BGR `Mat`.
pub fn frame_to_mat(frame: &Frame) -> anyhow::Result<Mat> {
    let size = Size::new(frame.width() as i32, frame.height() as i32);
    let mut mat = Mat::new_size_with_default(size, CV_8UC3, Scalar::all(0.0))?;
    let bytes = mat.data_bytes_mut()?;
    for (dst, rgb) in bytes.chunks_exact_mut(3).zip(frame.to_rgb8().chunks_exact(3)) {
        dst[0] = rgb[2];
        dst[1] = rgb[1];
        dst[2] = rgb[0];
    }
    Ok(mat)
}

/// Draw `text` with its top-left corner at `(x, y)`, outlined in black.
pub fn draw_text(
    mat: &mut Mat,
    text: &str,
    x: i32,
    y: i32,
    font_scale: f64,
    color: (i32, i32, i32),
) -> opencv::Result<()> {
    let color = Scalar::new(color.2 as f64, color.1 as f64, color.0 as f64, 0.0); // BGR
    let mut baseline = 0;
    let text_size =
        imgproc::get_text_size(text, imgproc::FONT_HERSHEY_SIMPLEX, font_scale, 1, &mut baseline)?;
    let text_pos = Point::new(x, y + text_size.height);

    imgproc::put_text(
        mat,
        text,
        text_pos,
        imgproc::FONT_HERSHEY_SIMPLEX,
        font_scale,
        Scalar::new(0.0, 0.0, 0.0, 0.0),
        3,
        imgproc::LINE_8,
        false,
    )?;
    imgproc::put_text(
        mat,
        text,
        text_pos,
        imgproc::FONT_HERSHEY_SIMPLEX,
        font_scale,
        color,
        1,
        imgproc::LINE_8,
        false,
    )?;
    Ok(())
}

/// Render labels queued while a frame was annotated.
pub fn draw_labels(mat: &mut Mat, labels: &[TextLabel]) -> opencv::Result<()> {
    for label in labels {
        let font_scale = (label.size as f64 / 8.0).clamp(0.3, 2.0);
        let color = (
            (label.rgb[0] * 255.0) as i32,
            (label.rgb[1] * 255.0) as i32,
            (label.rgb[2] * 255.0) as i32,
        );
        draw_text(mat, &label.text, label.col, label.row, font_scale, color)?;
    }
    Ok(())
}

/// Still image or video stream.
pub enum FrameSource {
    Image(Option<Mat>),
    Video(VideoCapture),
}

impl FrameSource {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if is_image_path(path) {
            let mat = imgcodecs::imread(&path.to_string_lossy(), imgcodecs::IMREAD_COLOR)?;
            if mat.empty() {
                return Err(anyhow!("Failed to load image: {:?}", path));
            }
            return Ok(FrameSource::Image(Some(mat)));
        }
        let cap = VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?;
        if !cap.is_opened()? {
            return Err(anyhow!("Failed to open video file: {:?}", path));
        }
        info!(
            "video {}x{}, {} frames at {:.2} fps",
            cap.get(videoio::CAP_PROP_FRAME_WIDTH)?,
            cap.get(videoio::CAP_PROP_FRAME_HEIGHT)?,
            cap.get(videoio::CAP_PROP_FRAME_COUNT)?,
            cap.get(videoio::CAP_PROP_FPS)?
        );
        Ok(FrameSource::Video(cap))
    }

    /// Frame rate of a video, `None` for images or unknown rates.
    pub fn fps(&self) -> Option<f64> {
        match self {
            FrameSource::Video(cap) => cap.get(videoio::CAP_PROP_FPS).ok().filter(|fps| *fps > 0.0),
            FrameSource::Image(_) => None,
        }
    }

    pub fn next_frame(&mut self) -> anyhow::Result<Option<Mat>> {
        match self {
            FrameSource::Image(mat) => Ok(mat.take()),
            FrameSource::Video(cap) => {
                let mut mat = Mat::default();
                if !cap.read(&mut mat)? || mat.empty() {
                    return Ok(None);
                }
                Ok(Some(mat))
            }
        }
    }
}

/// Destination of annotated frames: an mp4 file or a directory of images.
pub enum FrameSink {
    Video(VideoWriter),
    Directory(PathBuf),
}

impl FrameSink {
    pub fn create(path: &Path, fps: f64, size: Size) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        if path.extension().and_then(|e| e.to_str()) == Some("mp4") {
            let fourcc = VideoWriter::fourcc('a', 'v', 'c', '1')?;
            let writer = VideoWriter::new(&path.to_string_lossy(), fourcc, fps, size, true)?;
            if writer.is_opened()? {
                return Ok(FrameSink::Video(writer));
            }
            warn!("cannot open video writer for {:?}, writing images instead", path);
        }
        fs::create_dir_all(path)
            .with_context(|| format!("cannot create output directory {:?}", path))?;
        Ok(FrameSink::Directory(path.to_path_buf()))
    }

    pub fn write(&mut self, mat: &Mat, frame_id: usize) -> anyhow::Result<()> {
        match self {
            FrameSink::Video(writer) => writer.write(mat)?,
            FrameSink::Directory(dir) => {
                let path = dir.join(format!("frame_{:06}.jpg", frame_id));
                imgcodecs::imwrite(&path.to_string_lossy(), mat, &opencv::core::Vector::new())?;
            }
        }
        Ok(())
    }
}
