pub mod attributes;
pub mod color;
pub mod config;
pub mod detection;
pub mod error;
pub mod frame;
pub mod palette;
pub mod pipeline;
pub mod record;
pub mod sorter;
pub mod track;
pub mod tracker;
#[cfg(feature = "opencv")]
pub mod video;
pub mod visualization;

// Re-export main types
pub use crate::attributes::{extract, PersonAttributes};
pub use crate::color::{classify, ColorMetric, Euclidean, Weighted};
pub use crate::config::Config;
pub use crate::detection::{Detection, DetectionFeed};
pub use crate::error::{AttributeError, PipelineError};
pub use crate::frame::Frame;
pub use crate::palette::ColorName;
pub use crate::pipeline::{FrameOutput, FramePipeline, FrameStats};
pub use crate::tracker::IdentityTracker;
pub use crate::visualization::{Annotator, LabelQueue};
