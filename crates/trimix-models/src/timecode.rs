//! Timecode formatting for the editor UI.

/// Format seconds as `MM:SS.mmm`.
///
/// # Examples
/// ```
/// use trimix_models::format_timecode;
/// assert_eq!(format_timecode(65.25), "01:05.250");
/// assert_eq!(format_timecode(0.0), "00:00.000");
/// ```
pub fn format_timecode(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0).floor() as u64;
    let whole_seconds = (seconds % 60.0).floor() as u64;
    let millis = ((seconds % 1.0) * 1000.0).floor() as u64;
    format!("{:02}:{:02}.{:03}", minutes, whole_seconds, millis)
}
