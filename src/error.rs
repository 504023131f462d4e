use std::path::PathBuf;
use thiserror::Error;

use crate::frame::PixelRect;

/// Failures of the color classification step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttributeError {
    #[error("region {0:?} contains no eligible pixels")]
    EmptyRegion(PixelRect),
}

/// Malformed detector input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error("segmentation mask must hold {expected} values, got {actual}")]
    MaskSize { expected: usize, actual: usize },
}

/// Failures that abort a single frame call.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot write frame record to {path:?}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot serialize frame record")]
    Serialize(#[from] serde_json::Error),
}
