use log::{debug, info, warn};
use nalgebra::Point2;
use std::path::PathBuf;

use crate::attributes::extract;
use crate::config::Config;
use crate::detection::Detection;
use crate::error::PipelineError;
use crate::frame::{Frame, PixelRect};
use crate::record::{write_frame, FrameRecord, PersonRecord};
use crate::sorter::sort_by_distance_to_center;
use crate::tracker::IdentityTracker;
use crate::visualization::{draw_track, Annotator};

/// Counters of one processed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Person detections kept for processing.
    pub persons: usize,
    pub tracked: usize,
    /// Persons no slot could be found for.
    pub unassigned: usize,
    /// Persons beyond the tracker capacity, dropped in feed order.
    pub dropped_over_capacity: usize,
    /// Body regions without a usable pixel.
    pub empty_regions: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub record: FrameRecord,
    pub stats: FrameStats,
}

/// A person detection picked for this frame.
struct Candidate<'a> {
    detection: &'a Detection,
    /// Unclamped pixel bounds.
    bounds: PixelRect,
    center: Point2<f32>,
}

/// Center of the box clamped to the frame's pixel grid.
fn clamped_center(detection: &Detection, width: usize, height: usize) -> Point2<f32> {
    let r = detection.bbox.to_clamped_pixels(width, height);
    Point2::new((r.left + r.right) as f32 / 2.0, (r.top + r.bottom) as f32 / 2.0)
}

/// Per-frame glue: person filtering, prioritisation, attribute extraction,
/// identity assignment and record output. Owns the tracker state, so one
/// pipeline serves one stream.
pub struct FramePipeline {
    config: Config,
    tracker: IdentityTracker,
}

impl FramePipeline {
    pub fn new(config: Config) -> Self {
        let tracker = IdentityTracker::new(config.tracker.clone());
        Self { config, tracker }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tracker(&self) -> &IdentityTracker {
        &self.tracker
    }

    /// Start a new stream: every track is dropped and ids restart at 1.
    pub fn reset(&mut self) {
        self.tracker.reset();
    }

    /// Person detections in feed order, at most one per tracker slot.
    fn select_persons<'a>(
        &self,
        frame: &Frame,
        detections: &'a [Detection],
        stats: &mut FrameStats,
    ) -> Vec<Candidate<'a>> {
        let capacity = self.tracker.capacity();
        let mut persons = Vec::new();
        for detection in detections {
            let config = &self.config;
            let names = &config.class_names;
            if !detection.is_class(&config.person_class, config.conf_threshold, names) {
                continue;
            }
            if persons.len() >= capacity {
                stats.dropped_over_capacity += 1;
                continue;
            }
            persons.push(Candidate {
                detection,
                bounds: detection.bbox.to_pixels(frame.width(), frame.height()),
                center: clamped_center(detection, frame.width(), frame.height()),
            });
        }
        if stats.dropped_over_capacity > 0 {
            warn!(
                "{} persons over the capacity of {} dropped",
                stats.dropped_over_capacity, capacity
            );
        }
        persons
    }

    /// Process one frame in place.
    ///
    /// Persons are handled from the frame center outwards: each one has its
    /// attributes extracted, then claims a track and gets its track overlay.
    /// Slots left unclaimed age at the end of the frame.
    pub fn process_frame(
        &mut self,
        frame: &mut Frame,
        annotator: &mut dyn Annotator,
        detections: &[Detection],
    ) -> FrameOutput {
        let mut stats = FrameStats::default();
        let persons = self.select_persons(frame, detections, &mut stats);
        stats.persons = persons.len();

        let centers: Vec<Option<Point2<f32>>> = persons.iter().map(|p| Some(p.center)).collect();
        let order = sort_by_distance_to_center(&centers, frame.center());

        let mut record = FrameRecord::new();
        for (rank, &idx) in order.iter().enumerate() {
            let person = &persons[idx];
            let attributes = extract(frame, annotator, person.detection);
            stats.empty_regions += attributes.empty_regions();

            let bounds = person.bounds;
            let max_movement = self.tracker.max_movement(bounds.width(), bounds.height());
            let Some(slot) = self.tracker.assign(person.center, max_movement) else {
                warn!("person {} at {:?} has no free track slot", rank + 1, person.center);
                stats.unassigned += 1;
                record.push(PersonRecord::untracked(&attributes));
                continue;
            };
            let Some(track) = self.tracker.slot(slot).and_then(|s| s.active()) else {
                continue;
            };
            let track_id = track.track_id;
            let tracked =
                PersonRecord::tracked(&attributes, track_id, track.speed(), bounds.area());
            if let Some(label) = tracked.track_label() {
                debug!("person {} is {}", rank + 1, label);
            }
            record.push(tracked);
            stats.tracked += 1;

            let footprint = person.detection.bbox.footprint(frame.width(), frame.height());
            let mask = person.detection.mask.as_ref();
            draw_track(annotator, frame, bounds, footprint, track_id, mask);
        }

        self.tracker.age_slots();
        debug!("{:?}, {} active tracks", stats, self.tracker.active_count());
        FrameOutput { record, stats }
    }

    /// Write a frame's record under the configured output directory.
    pub fn emit(&self, record: &FrameRecord, timestamp: f64) -> Result<PathBuf, PipelineError> {
        let output = &self.config.output;
        let path = write_frame(record, &output.dir, &output.base_name, timestamp)?;
        info!("wrote {} persons to {:?}", record.len(), path);
        Ok(path)
    }

    /// [`Self::process_frame`] followed by [`Self::emit`]. Tracker state is
    /// updated even when writing fails.
    pub fn run_frame(
        &mut self,
        frame: &mut Frame,
        annotator: &mut dyn Annotator,
        detections: &[Detection],
        timestamp: f64,
    ) -> Result<(FrameOutput, PathBuf), PipelineError> {
        let output = self.process_frame(frame, annotator, detections);
        let path = self.emit(&output.record, timestamp)?;
        Ok((output, path))
    }
}
