//! Per-frame person records and their JSON file output.

use num_traits::ToPrimitive;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fs;
use std::path::{Path, PathBuf};

use crate::attributes::{color_label, PersonAttributes};
use crate::error::PipelineError;
use crate::track::TrackId;
use crate::visualization::track_label;

/// Attributes of one person in one frame.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PersonRecord {
    pub head_color: String,
    pub upper_body_color: String,
    pub bottom_body_color: String,
    pub color_code: [u8; 3],
    /// Magnitude of the track's last movement, present for tracked persons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    /// Box area in pixels, present for tracked persons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip)]
    pub track_id: Option<TrackId>,
}

impl PersonRecord {
    /// Record of a person without a track.
    pub fn untracked(attributes: &PersonAttributes) -> Self {
        Self {
            head_color: color_label(attributes.head).to_string(),
            upper_body_color: color_label(attributes.upper).to_string(),
            bottom_body_color: color_label(attributes.lower).to_string(),
            color_code: attributes.color_code(),
            speed: None,
            size: None,
            track_id: None,
        }
    }

    pub fn tracked(
        attributes: &PersonAttributes,
        track_id: TrackId,
        speed: f32,
        size: i64,
    ) -> Self {
        Self {
            speed: Some(format!("{:.6}", speed)),
            size: Some(size.to_string()),
            track_id: Some(track_id),
            ..Self::untracked(attributes)
        }
    }

    /// Overlay label of the person's track.
    pub fn track_label(&self) -> Option<String> {
        self.track_id.map(track_label)
    }
}

/// All persons of a frame, keyed `person <rank>` in priority order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameRecord {
    persons: Vec<(String, PersonRecord)>,
}

impl FrameRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next person. Keys are numbered from 1.
    pub fn push(&mut self, person: PersonRecord) {
        let key = format!("person {}", self.persons.len() + 1);
        self.persons.push((key, person));
    }

    pub fn get(&self, key: &str) -> Option<&PersonRecord> {
        self.persons.iter().find(|(k, _)| k == key).map(|(_, p)| p)
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PersonRecord)> {
        self.persons.iter().map(|(k, p)| (k.as_str(), p))
    }
}

impl Serialize for FrameRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.persons.len()))?;
        for (key, person) in &self.persons {
            map.serialize_entry(key, person)?;
        }
        map.end()
    }
}

/// `<dir>/<base>_<floor(timestamp)>.json`. Timestamps that do not fit an
/// integer are written as 0.
pub fn record_path(dir: &Path, base_name: &str, timestamp: f64) -> PathBuf {
    let seconds = timestamp.floor().to_i64().unwrap_or(0);
    dir.join(format!("{}_{}.json", base_name, seconds))
}

/// Write `record` as pretty printed JSON and return the file path.
pub fn write_frame(
    record: &FrameRecord,
    dir: &Path,
    base_name: &str,
    timestamp: f64,
) -> Result<PathBuf, PipelineError> {
    let path = record_path(dir, base_name, timestamp);
    let json = serde_json::to_string_pretty(record)?;
    fs::write(&path, json).map_err(|source| PipelineError::OutputWrite {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
