//! Interactive editing session for one clip.
//!
//! Tracks the trim window, the crop overlay and the playhead for a single
//! source clip. All position-changing operations clamp into the trim window,
//! so the playhead can never leave the selected range regardless of the call
//! sequence.

use trimix_models::{format_timecode, CropRect, TrimRange, DEFAULT_CROP_ASPECT};

/// Seconds moved by one step button press.
pub const STEP_SECS: f64 = 1.0;

/// Which editing tool is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Trim,
    Crop,
}

/// Editing state for a single clip.
///
/// The crop rectangle is overlay feedback only: it is kept up to date while
/// the user adjusts it but the export path never reads it.
#[derive(Debug, Clone)]
pub struct EditSession {
    source_url: String,
    duration: f64,
    video_width: f64,
    video_height: f64,
    mode: EditMode,
    trim: TrimRange,
    crop: CropRect,
    current_time: f64,
    playing: bool,
}

impl EditSession {
    /// Open a clip for editing: full range selected, playhead at the start,
    /// a centered 9:16 crop, trim mode active.
    pub fn open(
        source_url: impl Into<String>,
        duration: f64,
        video_width: f64,
        video_height: f64,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            duration,
            video_width,
            video_height,
            mode: EditMode::Trim,
            trim: TrimRange::full(duration),
            crop: CropRect::fitted(video_width, video_height, DEFAULT_CROP_ASPECT),
            current_time: 0.0,
            playing: false,
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: EditMode) {
        self.mode = mode;
    }

    pub fn trim(&self) -> TrimRange {
        self.trim
    }

    pub fn crop(&self) -> CropRect {
        self.crop
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Playhead position as `MM:SS.mmm` for display.
    pub fn position_label(&self) -> String {
        format_timecode(self.current_time)
    }

    /// Move the trim start. The playhead is pulled back inside the window if
    /// the new start passed it.
    pub fn set_trim_start(&mut self, start: f64) {
        self.trim.set_start(start);
        self.current_time = self.trim.clamp_time(self.current_time);
    }

    /// Move the trim end. The playhead is pulled back inside the window if
    /// the new end passed it.
    pub fn set_trim_end(&mut self, end: f64) {
        self.trim.set_end(end);
        self.current_time = self.trim.clamp_time(self.current_time);
    }

    /// Jump the playhead, clamped into the trim window.
    pub fn seek(&mut self, time: f64) {
        self.current_time = self.trim.clamp_time(time);
    }

    /// Step the playhead forward by one second.
    pub fn step_forward(&mut self) {
        self.seek(self.current_time + STEP_SECS);
    }

    /// Step the playhead back by one second.
    pub fn step_back(&mut self) {
        self.seek(self.current_time - STEP_SECS);
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle_play(&mut self) {
        self.playing = !self.playing;
    }

    /// Advance playback by `dt` seconds. Reaching the trim end clamps the
    /// playhead there and pauses.
    pub fn tick(&mut self, dt: f64) {
        if !self.playing {
            return;
        }
        let advanced = self.current_time + dt;
        if advanced >= self.trim.end {
            self.current_time = self.trim.end;
            self.playing = false;
        } else {
            self.current_time = self.trim.clamp_time(advanced);
        }
    }

    /// Recompute the crop overlay for a new target aspect, centered in the
    /// source frame.
    pub fn set_crop_aspect(&mut self, aspect_ratio: f64) {
        self.crop = CropRect::fitted(self.video_width, self.video_height, aspect_ratio);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trimix_models::MIN_TRIM_GAP_SECS;

    fn session() -> EditSession {
        EditSession::open("/clips/a.mp4", 10.0, 1920.0, 1080.0)
    }

    #[test]
    fn test_opens_with_full_range_and_default_crop() {
        let s = session();
        assert_eq!(s.mode(), EditMode::Trim);
        assert_eq!(s.trim().start, 0.0);
        assert_eq!(s.trim().end, 10.0);
        assert_eq!(s.current_time(), 0.0);
        assert!(!s.is_playing());
        assert!((s.crop().aspect_ratio - DEFAULT_CROP_ASPECT).abs() < 1e-9);
        assert!(s.crop().is_valid(1920.0, 1080.0));
    }

    #[test]
    fn test_seek_clamps_into_trim_window() {
        let mut s = session();
        s.set_trim_start(2.0);
        s.set_trim_end(8.0);

        s.seek(0.5);
        assert_eq!(s.current_time(), 2.0);
        s.seek(9.9);
        assert_eq!(s.current_time(), 8.0);
        s.seek(5.0);
        assert_eq!(s.current_time(), 5.0);
    }

    #[test]
    fn test_trim_start_preserves_minimum_gap() {
        let mut s = session();
        s.set_trim_end(5.0);
        s.set_trim_start(4.9);
        assert!((s.trim().start - 4.5).abs() < 1e-9);
        assert!(s.trim().selected_duration() >= MIN_TRIM_GAP_SECS);
    }

    #[test]
    fn test_moving_trim_start_pulls_playhead_along() {
        let mut s = session();
        s.seek(1.0);
        s.set_trim_start(3.0);
        assert_eq!(s.current_time(), 3.0);
    }

    #[test]
    fn test_step_clamps_at_boundaries() {
        let mut s = session();
        s.set_trim_start(2.0);
        s.set_trim_end(8.0);

        s.seek(2.0);
        s.step_back();
        assert_eq!(s.current_time(), 2.0);

        s.seek(7.5);
        s.step_forward();
        assert_eq!(s.current_time(), 8.0);
    }

    #[test]
    fn test_playback_pauses_at_trim_end() {
        let mut s = session();
        s.set_trim_end(3.0);
        s.seek(2.9);
        s.play();

        s.tick(0.05);
        assert!(s.is_playing());

        s.tick(0.1);
        assert_eq!(s.current_time(), 3.0);
        assert!(!s.is_playing());

        // Ticks while paused are inert
        s.tick(1.0);
        assert_eq!(s.current_time(), 3.0);
    }

    #[test]
    fn test_crop_aspect_recomputes_fitted_rect() {
        let mut s = session();
        s.set_crop_aspect(1.0);
        let crop = s.crop();
        assert!((crop.width - 1080.0).abs() < 1e-6);
        assert!((crop.height - 1080.0).abs() < 1e-6);
        assert!(crop.is_valid(1920.0, 1080.0));
    }

    #[test]
    fn test_position_label() {
        let mut s = session();
        s.seek(7.25);
        assert_eq!(s.position_label(), "00:07.250");
    }
}
