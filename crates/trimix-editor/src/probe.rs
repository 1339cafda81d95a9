//! FFprobe clip information.

use std::path::Path;
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::error::{EditorError, EditorResult};

/// Basic facts about a local clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipInfo {
    /// Duration in seconds.
    pub duration: f64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
}

/// Probe a local clip for duration and dimensions.
pub async fn probe_clip(path: impl AsRef<Path>) -> EditorResult<ClipInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(EditorError::FileNotFound(path.to_path_buf()));
    }
    which::which("ffprobe").map_err(|_| EditorError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .await?;

    if !output.status.success() {
        return Err(EditorError::FfprobeFailed {
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            code: output.status.code(),
        });
    }

    let info = parse_probe_output(&output.stdout)?;
    debug!(path = %path.display(), duration = info.duration, "Probed clip");
    Ok(info)
}

fn parse_probe_output(bytes: &[u8]) -> EditorResult<ClipInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(bytes)
        .map_err(|e| EditorError::frame_source(format!("Bad ffprobe output: {}", e)))?;

    let duration = probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| EditorError::frame_source("FFprobe reported no duration"))?;

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| EditorError::frame_source("No video stream found"))?;

    Ok(ClipInfo {
        duration,
        width: video.width.unwrap_or(0),
        height: video.height.unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_output() {
        let json = br#"{
            "format": {"duration": "12.480000"},
            "streams": [
                {"codec_type": "audio"},
                {"codec_type": "video", "width": 1920, "height": 1080}
            ]
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert!((info.duration - 12.48).abs() < 1e-9);
        assert_eq!(info.width, 1920);
        assert_eq!(info.height, 1080);
    }

    #[test]
    fn test_missing_duration_is_an_error() {
        let json = br#"{"format": {}, "streams": [{"codec_type": "video"}]}"#;
        let err = parse_probe_output(json).unwrap_err();
        assert!(matches!(err, EditorError::FrameSource(_)));
    }

    #[test]
    fn test_no_video_stream_is_an_error() {
        let json = br#"{"format": {"duration": "3.0"}, "streams": [{"codec_type": "audio"}]}"#;
        let err = parse_probe_output(json).unwrap_err();
        assert!(matches!(err, EditorError::FrameSource(_)));
    }
}
