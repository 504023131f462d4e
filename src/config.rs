use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings of the identity tracker.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Number of slots, i.e. the most persons tracked at once.
    pub capacity: usize,
    /// Unmatched frames tolerated before a slot is evicted.
    pub max_miss_count: u32,
    /// Search radius as a multiple of the larger box side.
    pub movement_factor: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            capacity: 24,
            max_miss_count: 5,
            movement_factor: 5.0,
        }
    }
}

/// Where per-frame records go.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// File stem; records are written as `<base_name>_<timestamp>.json`.
    pub base_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            base_name: "frame".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum class probability for a class to be part of a detection's label.
    pub conf_threshold: f32,
    /// Class names indexed like the detector's probability vector. Overridden
    /// by the detection feed when it carries its own table.
    pub class_names: Vec<String>,
    pub person_class: String,
    /// Draw color and track labels onto the frame.
    pub draw_labels: bool,
    pub tracker: TrackerConfig,
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            conf_threshold: 0.5,
            class_names: vec!["person".to_string()],
            person_class: "person".to_string(),
            draw_labels: true,
            tracker: TrackerConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let cfg: Config = serde_json::from_str(&data)?;
        Ok(cfg)
    }
}
