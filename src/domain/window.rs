// Visible-range windows: time window -> x percentage bounds, and y/z display windows
use super::graph::Axis;
use serde::Serialize;

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A `[min, max]` percentage pair where `min <= max` always holds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentRange {
    min: f64,
    max: f64,
}

impl Default for PercentRange {
    fn default() -> Self {
        Self::FULL
    }
}

impl PercentRange {
    pub const FULL: PercentRange = PercentRange {
        min: 0.0,
        max: 100.0,
    };

    /// Built by widening to the full range first, so any pair is accepted and clamped
    pub fn new(min: f64, max: f64) -> Self {
        let mut range = Self::FULL;
        range.set_max(max);
        range.set_min(min);
        range
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// The lower bound can never pass the upper one
    pub fn set_min(&mut self, value: f64) {
        if value.is_finite() {
            self.min = round_tenth(value).clamp(0.0, self.max);
        }
    }

    /// The upper bound can never drop below the lower one
    pub fn set_max(&mut self, value: f64) {
        if value.is_finite() {
            self.max = round_tenth(value).clamp(self.min, 100.0);
        }
    }

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }
}

/// Requested absolute time window in seconds; `etime == 0` leaves the end unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TimeWindow {
    pub stime: f64,
    pub etime: f64,
}

impl TimeWindow {
    pub fn new(stime: f64, etime: f64) -> Self {
        Self { stime, etime }
    }

    /// Translate into x-axis percentage bounds relative to the largest time in view.
    ///
    /// A window that does not fit the current time range falls back to the full range
    /// instead of clipping everything away.
    pub fn percent_range(&self, highest_time: f64) -> PercentRange {
        let ordered = self.stime < self.etime || (self.stime > 0.0 && self.etime == 0.0);
        if !ordered || self.etime >= highest_time {
            return PercentRange::FULL;
        }

        let min = if self.stime > 0.0 {
            round_tenth(self.stime / highest_time * 100.0)
        } else {
            0.0
        };
        let max = if self.etime > 0.0 {
            round_tenth(self.etime / highest_time * 100.0)
        } else {
            100.0
        };

        PercentRange::new(min, max)
    }
}

/// Visible portion of every graph, shared across the registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ViewWindow {
    pub x: PercentRange,
    pub y: PercentRange,
    pub z: PercentRange,
}

impl ViewWindow {
    pub fn axis(&self, axis: Axis) -> &PercentRange {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    pub fn axis_mut(&mut self, axis: Axis) -> &mut PercentRange {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_open_ended_window() {
        let range = TimeWindow::new(5.0, 0.0).percent_range(20.0);
        assert_eq!(range.min(), 25.0);
        assert_eq!(range.max(), 100.0);
    }

    #[test]
    fn test_bounded_window_rounds_to_one_decimal() {
        let range = TimeWindow::new(1.0, 2.0).percent_range(3.0);
        assert_eq!(range.min(), 33.3);
        assert_eq!(range.max(), 66.7);
    }

    #[test]
    fn test_window_beyond_data_falls_back_to_full_range() {
        assert!(TimeWindow::new(5.0, 30.0).percent_range(20.0).is_full());
        assert!(TimeWindow::new(5.0, 20.0).percent_range(20.0).is_full());
    }

    #[test]
    fn test_inverted_or_empty_window_is_full_range() {
        assert!(TimeWindow::new(10.0, 5.0).percent_range(20.0).is_full());
        assert!(TimeWindow::new(0.0, 0.0).percent_range(20.0).is_full());
        assert!(TimeWindow::new(5.0, 0.0).percent_range(0.0).is_full());
    }

    #[test]
    fn test_end_only_window() {
        let range = TimeWindow::new(0.0, 10.0).percent_range(40.0);
        assert_eq!(range.min(), 0.0);
        assert_eq!(range.max(), 25.0);
    }

    #[test]
    fn test_cross_clamping() {
        let mut range = PercentRange::FULL;
        range.set_max(40.0);
        range.set_min(60.0);
        assert_eq!(range.min(), 40.0);

        range.set_max(10.0);
        assert_eq!(range.max(), 40.0);

        range.set_min(f64::NAN);
        assert_eq!(range.min(), 40.0);
    }

    #[test]
    fn test_view_window_axis_access() {
        let mut window = ViewWindow::default();
        window.axis_mut(Axis::Z).set_max(50.0);
        assert_eq!(window.axis(Axis::Z).max(), 50.0);
        assert!(window.axis(Axis::Y).is_full());
    }

    #[derive(Debug, Clone)]
    enum Slide {
        Min(f64),
        Max(f64),
    }

    fn slide() -> impl Strategy<Value = Slide> {
        prop_oneof![
            (-50.0f64..150.0).prop_map(Slide::Min),
            (-50.0f64..150.0).prop_map(Slide::Max),
        ]
    }

    proptest! {
        #[test]
        fn test_min_never_exceeds_max(slides in prop::collection::vec(slide(), 0..60)) {
            let mut range = PercentRange::FULL;
            for s in slides {
                match s {
                    Slide::Min(v) => range.set_min(v),
                    Slide::Max(v) => range.set_max(v),
                }
                prop_assert!(range.min() <= range.max());
                prop_assert!(range.min() >= 0.0 && range.max() <= 100.0);
            }
        }

        #[test]
        fn test_time_window_bounds_ordered(
            stime in 0.0f64..100.0,
            etime in 0.0f64..100.0,
            highest in 0.1f64..100.0,
        ) {
            let range = TimeWindow::new(stime, etime).percent_range(highest);
            prop_assert!(range.min() <= range.max());
        }
    }
}
