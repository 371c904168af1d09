//! Column-relative progress from a cumulative odometer.

/// Turns raw cumulative distance into distance travelled in the current column.
///
/// The baseline is either fixed at construction or *pending*; a pending
/// baseline latches the next raw reading. `reset()` makes the baseline pending
/// again, so whatever the odometer accumulates during a turn maneuver is never
/// counted against the next column.
#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    baseline: Option<f32>,
    last_y: f32,
}

impl PositionTracker {
    /// Tracker whose baseline is the first reading it sees.
    pub fn new() -> Self {
        Self::default()
    }

    /// A non-finite `raw_distance` leaves the baseline pending.
    pub fn with_baseline(raw_distance: f32) -> Self {
        Self {
            baseline: raw_distance.is_finite().then_some(raw_distance),
            last_y: 0.0,
        }
    }

    /// Current column-relative distance, never negative and never decreasing
    /// within a column.
    pub fn update(&mut self, raw_distance: f32) -> f32 {
        if !raw_distance.is_finite() {
            tracing::warn!(
                raw_distance,
                last_y = self.last_y,
                "non-finite odometer reading; holding last position"
            );
            return self.last_y;
        }
        let baseline = *self.baseline.get_or_insert(raw_distance);
        let y = raw_distance - baseline;
        if y < self.last_y {
            tracing::warn!(
                raw_distance,
                baseline,
                y,
                last_y = self.last_y,
                "odometry moved backwards; holding last position"
            );
            return self.last_y;
        }
        self.last_y = y;
        y
    }

    /// Fix a pending baseline without producing a position. Returns false if
    /// the baseline was already set or the reading is not finite.
    pub fn latch(&mut self, raw_distance: f32) -> bool {
        if self.baseline.is_some() || !raw_distance.is_finite() {
            return false;
        }
        self.baseline = Some(raw_distance);
        true
    }

    /// Re-baseline on the next reading. Idempotent.
    pub fn reset(&mut self) {
        self.baseline = None;
        self.last_y = 0.0;
    }

    pub fn baseline(&self) -> Option<f32> {
        self.baseline
    }

    pub fn last_y(&self) -> f32 {
        self.last_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_reading_becomes_baseline() {
        let mut t = PositionTracker::new();
        assert_eq!(t.update(250.0), 0.0);
        assert_eq!(t.update(300.0), 50.0);
        assert_eq!(t.baseline(), Some(250.0));
    }

    #[test]
    fn explicit_baseline_is_used() {
        let mut t = PositionTracker::with_baseline(100.0);
        assert_eq!(t.update(180.0), 80.0);
    }

    #[test]
    fn decreasing_reading_is_clamped_to_last_value() {
        let mut t = PositionTracker::with_baseline(0.0);
        assert_eq!(t.update(40.0), 40.0);
        assert_eq!(t.update(35.0), 40.0);
        assert_eq!(t.update(f32::NAN), 40.0);
        assert_eq!(t.update(41.0), 41.0);
    }

    #[test]
    fn nan_before_first_reading_does_not_poison_baseline() {
        let mut t = PositionTracker::new();
        assert_eq!(t.update(f32::NAN), 0.0);
        assert_eq!(t.baseline(), None);
        assert_eq!(t.update(100.0), 0.0);
        assert_eq!(t.update(150.0), 50.0);
        assert_eq!(t.update(f32::INFINITY), 50.0);
    }

    #[test]
    fn latch_only_fills_a_pending_baseline() {
        let mut t = PositionTracker::new();
        assert!(!t.latch(f32::NAN));
        assert!(t.latch(240.0));
        assert!(!t.latch(300.0));
        assert_eq!(t.update(250.0), 10.0);
    }

    #[test]
    fn below_baseline_never_goes_negative() {
        let mut t = PositionTracker::with_baseline(500.0);
        assert_eq!(t.update(450.0), 0.0);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut once = PositionTracker::with_baseline(0.0);
        let mut twice = PositionTracker::with_baseline(0.0);
        once.update(120.0);
        twice.update(120.0);

        once.reset();
        twice.reset();
        twice.reset();
        assert_eq!(once.baseline(), twice.baseline());

        assert_eq!(once.update(900.0), twice.update(900.0));
        assert_eq!(once.baseline(), Some(900.0));
        assert_eq!(twice.baseline(), Some(900.0));
    }
}
