//! Trim window geometry.

use serde::{Deserialize, Serialize};

/// Minimum distance between trim start and end, in seconds.
pub const MIN_TRIM_GAP_SECS: f64 = 0.5;

/// A trim window within `[0, duration]`.
///
/// Invariant: `0 <= start < end <= duration` and `end - start >= 0.5s`.
/// All setters clamp rather than reject, so the invariant holds after any
/// sequence of calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimRange {
    pub start: f64,
    pub end: f64,
    duration: f64,
}

impl TrimRange {
    /// Full-length range over a source of the given duration.
    ///
    /// Durations below the minimum gap are widened to it so the invariant is
    /// representable at all.
    pub fn full(duration: f64) -> Self {
        let duration = duration.max(MIN_TRIM_GAP_SECS);
        Self {
            start: 0.0,
            end: duration,
            duration,
        }
    }

    /// Source duration this range is bounded by.
    pub fn duration_limit(&self) -> f64 {
        self.duration
    }

    /// Length of the selected window in seconds.
    pub fn selected_duration(&self) -> f64 {
        self.end - self.start
    }

    /// Move the start point, clamped to `[0, end - 0.5]`.
    pub fn set_start(&mut self, start: f64) {
        self.start = start.clamp(0.0, self.end - MIN_TRIM_GAP_SECS);
    }

    /// Move the end point, clamped to `[start + 0.5, duration]`.
    pub fn set_end(&mut self, end: f64) {
        self.end = end.clamp(self.start + MIN_TRIM_GAP_SECS, self.duration);
    }

    /// Clamp a playback position into the selected window.
    pub fn clamp_time(&self, time: f64) -> f64 {
        time.clamp(self.start, self.end)
    }

    /// True if the position lies inside the selected window.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_range() {
        let range = TrimRange::full(10.0);
        assert_eq!(range.start, 0.0);
        assert_eq!(range.end, 10.0);
        assert_eq!(range.selected_duration(), 10.0);
    }

    #[test]
    fn test_start_clamps_to_preserve_gap() {
        let mut range = TrimRange::full(10.0);
        range.set_end(5.0);
        range.set_start(4.9);
        assert!((range.start - 4.5).abs() < 1e-9);
        assert!(range.selected_duration() >= MIN_TRIM_GAP_SECS);
    }

    #[test]
    fn test_end_clamps_to_duration_and_gap() {
        let mut range = TrimRange::full(10.0);
        range.set_start(2.0);
        range.set_end(20.0);
        assert_eq!(range.end, 10.0);
        range.set_end(2.1);
        assert!((range.end - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_time_into_window() {
        let mut range = TrimRange::full(10.0);
        range.set_start(2.0);
        range.set_end(8.0);
        assert_eq!(range.clamp_time(0.0), 2.0);
        assert_eq!(range.clamp_time(9.5), 8.0);
        assert_eq!(range.clamp_time(5.0), 5.0);
    }

    #[test]
    fn test_tiny_duration_widened() {
        let range = TrimRange::full(0.1);
        assert!(range.selected_duration() >= MIN_TRIM_GAP_SECS);
    }
}
