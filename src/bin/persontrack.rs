use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use persontrack::video::{draw_labels, frame_to_mat, mat_to_frame, FrameSink, FrameSource};
use persontrack::{Config, DetectionFeed, FramePipeline, LabelQueue};
use opencv::{core::Size, prelude::*};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "persontrack",
    about = "Garment colors and identities of persons from recorded detections",
    version = "0.1.0"
)]
struct Args {
    /// Path to video file or image
    #[arg(short, long, required = true)]
    input: PathBuf,

    /// Detector output for the input, as JSON
    #[arg(short, long, required = true)]
    detections: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the per-frame records, overrides the config
    #[arg(short, long)]
    records: Option<PathBuf>,

    /// Annotated output (mp4 file or directory for frames)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output frame rate when the input does not report one
    #[arg(long, default_value_t = 30.0)]
    fps: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // 1. Configuration, with command line overrides
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("cannot load config {:?}", path))?,
        None => Config::default(),
    };
    if let Some(dir) = &args.records {
        config.output.dir = dir.clone();
    }
    fs::create_dir_all(&config.output.dir)
        .with_context(|| format!("cannot create record directory {:?}", config.output.dir))?;

    // 2. Detector output, whose class table wins over the config's
    let feed = DetectionFeed::from_file(&args.detections)?;
    if !feed.class_names.is_empty() {
        config.class_names = feed.class_names.clone();
    }
    info!("{} frames of detections loaded from {:?}", feed.frames.len(), args.detections);

    // 3. Input and output streams
    let mut source = FrameSource::open(&args.input)?;
    let fps = source.fps().unwrap_or(args.fps);
    let mut sink = None;

    let draw_labels_enabled = config.draw_labels;
    let mut pipeline = FramePipeline::new(config);

    // 4. Frame loop
    let mut frame_id = 0;
    while let Some(mat) = source.next_frame()? {
        if frame_id >= feed.frames.len() {
            warn!("detection feed ends at frame {}, stopping", frame_id);
            break;
        }
        let timestamp = feed.frames[frame_id].timestamp;
        let mut frame = mat_to_frame(&mat)?;
        let mut annotator = if draw_labels_enabled {
            LabelQueue::new()
        } else {
            LabelQueue::without_labels()
        };

        match pipeline.run_frame(&mut frame, &mut annotator, feed.frame(frame_id), timestamp) {
            Ok((output, _)) => {
                if output.stats.unassigned > 0 || output.stats.dropped_over_capacity > 0 {
                    warn!("frame {}: {:?}", frame_id, output.stats);
                }
            }
            Err(e) => warn!("frame {}: {:#}", frame_id, anyhow::Error::from(e)),
        }

        if let Some(path) = &args.output {
            if sink.is_none() {
                let size = Size::new(mat.cols(), mat.rows());
                sink = Some(FrameSink::create(path, fps, size)?);
            }
            let mut annotated = frame_to_mat(&frame)?;
            draw_labels(&mut annotated, &annotator.take())?;
            if let Some(sink) = sink.as_mut() {
                sink.write(&annotated, frame_id)?;
            }
        }

        frame_id += 1;
        if frame_id % 10 == 0 {
            info!("processed {} frames", frame_id);
        }
    }

    info!("processed {} frames, {} tracks active", frame_id, pipeline.tracker().active_count());
    Ok(())
}
