use nalgebra::{Point2, Vector2};

/// Identity of a tracked person, unique within one tracker.
pub type TrackId = u64;

/// Live state of an occupied slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTrack {
    pub track_id: TrackId,
    /// Center observed on the last match.
    pub center: Point2<f32>,
    /// Displacement between the last two matched centers.
    pub last_movement: Vector2<f32>,
    /// Consecutive frames without a match.
    pub miss_count: u32,
}

impl ActiveTrack {
    fn new(track_id: TrackId, center: Point2<f32>) -> Self {
        Self {
            track_id,
            center,
            last_movement: Vector2::zeros(),
            miss_count: 0,
        }
    }

    /// Magnitude of the last movement, in pixels per frame.
    pub fn speed(&self) -> f32 {
        self.last_movement.norm()
    }
}

/// One entry of the tracker's fixed slot table.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TrackSlot {
    #[default]
    Empty,
    Active(ActiveTrack),
}

impl TrackSlot {
    pub fn is_empty(&self) -> bool {
        matches!(self, TrackSlot::Empty)
    }

    pub fn active(&self) -> Option<&ActiveTrack> {
        match self {
            TrackSlot::Active(track) => Some(track),
            TrackSlot::Empty => None,
        }
    }

    pub fn track_id(&self) -> Option<TrackId> {
        self.active().map(|t| t.track_id)
    }

    pub fn center(&self) -> Option<Point2<f32>> {
        self.active().map(|t| t.center)
    }

    /// Occupy an empty slot with a fresh track. No movement is recorded yet.
    pub(crate) fn open(&mut self, track_id: TrackId, center: Point2<f32>) {
        *self = TrackSlot::Active(ActiveTrack::new(track_id, center));
    }

    /// Record a match at `center`.
    pub(crate) fn observe(&mut self, center: Point2<f32>) {
        if let TrackSlot::Active(track) = self {
            track.last_movement = center - track.center;
            track.center = center;
            track.miss_count = 0;
        }
    }

    /// Count one unmatched frame and evict once the count exceeds `max_miss`.
    /// Returns `true` when the slot was evicted.
    pub(crate) fn mark_missed(&mut self, max_miss: u32) -> bool {
        let evict = match self {
            TrackSlot::Active(track) => {
                track.miss_count += 1;
                track.miss_count > max_miss
            }
            TrackSlot::Empty => false,
        };
        if evict {
            *self = TrackSlot::Empty;
        }
        evict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_slot_initialization() {
        let mut slot = TrackSlot::default();
        assert!(slot.is_empty());
        assert_eq!(slot.track_id(), None);

        slot.open(7, Point2::new(100.0, 50.0));
        let track = slot.active().unwrap();
        assert_eq!(track.track_id, 7);
        assert_eq!(track.miss_count, 0);
        assert_eq!(track.last_movement, Vector2::zeros());
    }

    #[test]
    fn test_slot_observe() {
        let mut slot = TrackSlot::default();
        slot.open(1, Point2::new(100.0, 100.0));
        slot.observe(Point2::new(103.0, 104.0));

        let track = slot.active().unwrap();
        assert_eq!(track.center, Point2::new(103.0, 104.0));
        assert_relative_eq!(track.last_movement.x, 3.0);
        assert_relative_eq!(track.last_movement.y, 4.0);
        assert_relative_eq!(track.speed(), 5.0);
    }

    #[test]
    fn test_observe_on_empty_slot_is_ignored() {
        let mut slot = TrackSlot::default();
        slot.observe(Point2::new(1.0, 1.0));
        assert!(slot.is_empty());
    }

    #[test]
    fn test_slot_mark_missed() {
        let max_miss = 5;
        let mut slot = TrackSlot::default();
        slot.open(1, Point2::new(10.0, 10.0));

        for i in 1..=max_miss {
            assert!(!slot.mark_missed(max_miss));
            assert_eq!(slot.active().unwrap().miss_count, i);
        }

        // One more miss evicts the slot
        assert!(slot.mark_missed(max_miss));
        assert!(slot.is_empty());
    }

    #[test]
    fn test_observe_resets_miss_count() {
        let mut slot = TrackSlot::default();
        slot.open(3, Point2::new(10.0, 10.0));
        slot.mark_missed(5);
        slot.mark_missed(5);
        slot.observe(Point2::new(12.0, 10.0));

        let track = slot.active().unwrap();
        assert_eq!(track.miss_count, 0);
        assert_relative_eq!(track.speed(), 2.0);
    }
}
