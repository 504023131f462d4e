use log::debug;
use nalgebra::{distance, Point2};

use crate::config::TrackerConfig;
use crate::track::{TrackId, TrackSlot};

/// Frame-to-frame identity tracker.
///
/// A fixed table of slots persists across frames. Each person of a frame is
/// handed to [`IdentityTracker::assign`] in priority order and claims the
/// closest previous center that no earlier person claimed, or opens a new
/// track in the first empty slot. [`IdentityTracker::age_slots`] closes the
/// frame.
#[derive(Debug, Clone)]
pub struct IdentityTracker {
    config: TrackerConfig,
    slots: Vec<TrackSlot>,
    /// Slots claimed during the current frame
    assigned: Vec<bool>,
    next_id: TrackId,
}

impl IdentityTracker {
    pub fn new(config: TrackerConfig) -> Self {
        let capacity = config.capacity;
        IdentityTracker {
            config,
            slots: vec![TrackSlot::Empty; capacity],
            assigned: vec![false; capacity],
            next_id: 1,
        }
    }

    /// Forget every track and restart ids at 1.
    pub fn reset(&mut self) {
        self.slots.fill(TrackSlot::Empty);
        self.assigned.fill(false);
        self.next_id = 1;
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, index: usize) -> Option<&TrackSlot> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[TrackSlot] {
        &self.slots
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }

    /// Search radius for a person box of `width` x `height` pixels.
    pub fn max_movement(&self, width: i32, height: i32) -> f32 {
        self.config.movement_factor * width.max(height) as f32
    }

    /// Closest active slot not yet claimed this frame, ties to the lowest index.
    fn nearest_unassigned(&self, center: &Point2<f32>) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (i, slot) in self.slots.iter().enumerate() {
            if self.assigned[i] {
                continue;
            }
            let Some(prev) = slot.center() else {
                continue;
            };
            let d = distance(&prev, center);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((i, d));
            }
        }
        best
    }

    /// Bind a person centered at `center` to a slot.
    ///
    /// Returns the slot index, or `None` when the person is farther than
    /// `max_movement` from every free track and no slot is empty.
    pub fn assign(&mut self, center: Point2<f32>, max_movement: f32) -> Option<usize> {
        if let Some((i, d)) = self.nearest_unassigned(&center) {
            if d <= max_movement {
                self.slots[i].observe(center);
                self.assigned[i] = true;
                return Some(i);
            }
        }

        let i = self.slots.iter().position(TrackSlot::is_empty)?;
        let track_id = self.next_id;
        self.next_id += 1;
        self.slots[i].open(track_id, center);
        self.assigned[i] = true;
        debug!("new track {} in slot {}", track_id, i);
        Some(i)
    }

    /// End the frame: unclaimed slots count a miss and may be evicted.
    pub fn age_slots(&mut self) {
        let max_miss = self.config.max_miss_count;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if self.assigned[i] {
                continue;
            }
            let track_id = slot.track_id();
            if slot.mark_missed(max_miss) {
                debug!("track {:?} evicted from slot {}", track_id, i);
            }
        }
        self.assigned.fill(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tracker(capacity: usize) -> IdentityTracker {
        IdentityTracker::new(TrackerConfig {
            capacity,
            ..TrackerConfig::default()
        })
    }

    #[test]
    fn test_new_tracker_is_empty() {
        let t = tracker(24);
        assert_eq!(t.capacity(), 24);
        assert_eq!(t.active_count(), 0);
        assert!(t.slots().iter().all(TrackSlot::is_empty));
        assert!(t.slot(24).is_none());
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut t = tracker(4);
        let a = t.assign(Point2::new(10.0, 10.0), 50.0).unwrap();
        let b = t.assign(Point2::new(500.0, 500.0), 50.0).unwrap();
        assert_eq!(t.slot(a).unwrap().track_id(), Some(1));
        assert_eq!(t.slot(b).unwrap().track_id(), Some(2));
        assert_eq!(t.active_count(), 2);
    }

    #[test]
    fn test_stable_identity() {
        let mut t = tracker(4);
        let first = t.assign(Point2::new(100.0, 100.0), 250.0).unwrap();
        t.age_slots();
        let second = t.assign(Point2::new(103.0, 104.0), 250.0).unwrap();
        t.age_slots();

        assert_eq!(first, second);
        let track = t.slot(second).unwrap().active().unwrap();
        assert_eq!(track.track_id, 1);
        assert_relative_eq!(track.speed(), 5.0);
    }

    #[test]
    fn test_far_person_opens_new_track() {
        let mut t = tracker(4);
        t.assign(Point2::new(100.0, 100.0), 10.0);
        t.age_slots();
        let i = t.assign(Point2::new(200.0, 100.0), 10.0).unwrap();
        assert_eq!(i, 1);
        assert_eq!(t.slot(i).unwrap().track_id(), Some(2));
        // the fresh track carries no movement
        assert_relative_eq!(t.slot(i).unwrap().active().unwrap().speed(), 0.0);
    }

    #[test]
    fn test_eviction_after_exceeding_miss_count() {
        let mut t = tracker(4);
        t.assign(Point2::new(100.0, 100.0), 250.0);
        t.age_slots();

        for _ in 0..5 {
            t.age_slots();
            assert_eq!(t.active_count(), 1);
        }
        assert_eq!(t.slot(0).unwrap().active().unwrap().miss_count, 5);

        t.age_slots();
        assert_eq!(t.active_count(), 0);

        // same position again gets a fresh id
        let i = t.assign(Point2::new(100.0, 100.0), 250.0).unwrap();
        assert_eq!(t.slot(i).unwrap().track_id(), Some(2));
    }

    #[test]
    fn test_rematch_resets_miss_count() {
        let mut t = tracker(4);
        t.assign(Point2::new(100.0, 100.0), 250.0);
        t.age_slots();
        for _ in 0..5 {
            t.age_slots();
        }
        let i = t.assign(Point2::new(106.0, 108.0), 250.0).unwrap();
        let track = t.slot(i).unwrap().active().unwrap();
        assert_eq!(track.track_id, 1);
        assert_eq!(track.miss_count, 0);
        assert_relative_eq!(track.speed(), 10.0);
    }

    #[test]
    fn test_contested_slot_goes_to_first_caller() {
        let mut t = tracker(4);
        t.assign(Point2::new(100.0, 100.0), 250.0);
        t.age_slots();

        let a = t.assign(Point2::new(102.0, 100.0), 250.0).unwrap();
        let b = t.assign(Point2::new(101.0, 100.0), 250.0).unwrap();
        assert_eq!(a, 0);
        assert_eq!(t.slot(a).unwrap().track_id(), Some(1));
        assert_ne!(a, b);
        assert_eq!(t.slot(b).unwrap().track_id(), Some(2));
    }

    #[test]
    fn test_tie_goes_to_lowest_slot() {
        let mut t = tracker(4);
        t.assign(Point2::new(90.0, 100.0), 5.0);
        t.assign(Point2::new(110.0, 100.0), 5.0);
        t.age_slots();
        let i = t.assign(Point2::new(100.0, 100.0), 50.0).unwrap();
        assert_eq!(i, 0);
    }

    #[test]
    fn test_capacity_exhaustion() {
        let mut t = tracker(2);
        assert!(t.assign(Point2::new(0.0, 0.0), 1.0).is_some());
        assert!(t.assign(Point2::new(100.0, 0.0), 1.0).is_some());
        assert_eq!(t.assign(Point2::new(200.0, 0.0), 1.0), None);
        assert_eq!(t.active_count(), 2);
    }

    #[test]
    fn test_determinism() {
        let frames: Vec<Vec<Point2<f32>>> = vec![
            vec![Point2::new(10.0, 10.0), Point2::new(300.0, 40.0)],
            vec![Point2::new(300.0, 44.0), Point2::new(12.0, 11.0), Point2::new(600.0, 600.0)],
            vec![],
            vec![Point2::new(14.0, 12.0)],
        ];
        let run = || {
            let mut t = tracker(3);
            let mut out = Vec::new();
            for frame in &frames {
                for c in frame {
                    out.push(t.assign(*c, 20.0));
                }
                t.age_slots();
            }
            (out, t.slots().to_vec())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_reset() {
        let mut t = tracker(2);
        t.assign(Point2::new(0.0, 0.0), 1.0);
        t.assign(Point2::new(100.0, 0.0), 1.0);
        t.reset();
        assert_eq!(t.active_count(), 0);
        let i = t.assign(Point2::new(0.0, 0.0), 1.0).unwrap();
        assert_eq!(t.slot(i).unwrap().track_id(), Some(1));
    }

    #[test]
    fn test_max_movement() {
        let t = tracker(1);
        assert_relative_eq!(t.max_movement(40, 120), 600.0);
    }
}
