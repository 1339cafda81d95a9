//! FFmpeg-CLI backed frame source and encoder.
//!
//! Gives the export walk a native backend: frames are pulled out of the
//! source clip one PNG at a time, staged in a scratch directory, then
//! assembled into a WebM in a single encode pass when the sink finishes.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::debug;

use crate::error::{EditorError, EditorResult};
use crate::export::{Frame, FrameSource, RecordingSink, EXPORT_FPS};

/// Builder for one FFmpeg invocation.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: PathBuf,
    input_args: Vec<String>,
    output_args: Vec<String>,
    overwrite: bool,
    log_level: String,
}

impl FfmpegCommand {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add an argument before `-i`.
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add an argument after `-i`.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Seek position applied to the input (fast seek).
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format!("{:.3}", seconds))
    }

    /// Input frame rate (for image-sequence inputs).
    pub fn framerate(self, fps: f64) -> Self {
        self.input_arg("-framerate").input_arg(format!("{}", fps))
    }

    /// Emit a single frame.
    pub fn single_frame(self) -> Self {
        self.output_arg("-vframes").output_arg("1")
    }

    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    pub fn pixel_format(self, format: impl Into<String>) -> Self {
        self.output_arg("-pix_fmt").output_arg(format)
    }

    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }
        args.push("-v".to_string());
        args.push(self.log_level.clone());

        args.extend(self.input_args.clone());
        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());
        args.extend(self.output_args.clone());
        args.push(self.output.to_string_lossy().to_string());

        args
    }

    /// Run the command to completion.
    pub async fn run(&self) -> EditorResult<()> {
        which::which("ffmpeg").map_err(|_| EditorError::FfmpegNotFound)?;

        let args = self.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let output = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(EditorError::FfmpegFailed {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                code: output.status.code(),
            })
        }
    }
}

/// Frame source that extracts PNGs from a local clip with FFmpeg.
pub struct FfmpegFrameSource {
    input: PathBuf,
    scratch: TempDir,
    position: f64,
    extracted: u64,
}

impl FfmpegFrameSource {
    pub fn new(input: impl AsRef<Path>) -> EditorResult<Self> {
        Ok(Self {
            input: input.as_ref().to_path_buf(),
            scratch: tempfile::tempdir()?,
            position: 0.0,
            extracted: 0,
        })
    }
}

#[async_trait]
impl FrameSource for FfmpegFrameSource {
    async fn seek(&mut self, time: f64) -> EditorResult<()> {
        self.position = time;
        Ok(())
    }

    async fn capture_frame(&mut self) -> EditorResult<Frame> {
        let out = self
            .scratch
            .path()
            .join(format!("capture-{:06}.png", self.extracted));

        FfmpegCommand::new(&self.input, &out)
            .seek(self.position)
            .single_frame()
            .run()
            .await?;

        let data = tokio::fs::read(&out).await?;
        let frame = Frame {
            index: self.extracted,
            data,
        };
        self.extracted += 1;
        Ok(frame)
    }
}

/// Encoder that stages frames as an image sequence, then assembles a WebM in
/// one FFmpeg pass on finish.
pub struct FfmpegRecordingSink {
    scratch: Option<TempDir>,
    frames_written: u64,
}

impl FfmpegRecordingSink {
    pub fn new() -> Self {
        Self {
            scratch: None,
            frames_written: 0,
        }
    }

    fn scratch(&self) -> EditorResult<&TempDir> {
        self.scratch
            .as_ref()
            .ok_or_else(|| EditorError::encoder("sink not started"))
    }
}

impl Default for FfmpegRecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordingSink for FfmpegRecordingSink {
    async fn start(&mut self) -> EditorResult<()> {
        self.scratch = Some(tempfile::tempdir()?);
        self.frames_written = 0;
        Ok(())
    }

    async fn write_frame(&mut self, frame: Frame) -> EditorResult<()> {
        let path = self
            .scratch()?
            .path()
            .join(format!("frame-{:06}.png", self.frames_written));
        tokio::fs::write(path, &frame.data).await?;
        self.frames_written += 1;
        Ok(())
    }

    async fn finish(&mut self) -> EditorResult<Vec<u8>> {
        let scratch = self.scratch()?;
        if self.frames_written == 0 {
            return Err(EditorError::encoder("no frames written"));
        }

        let pattern = scratch.path().join("frame-%06d.png");
        let out = scratch.path().join("out.webm");

        FfmpegCommand::new(&pattern, &out)
            .framerate(EXPORT_FPS)
            .video_codec("libvpx-vp9")
            .pixel_format("yuv420p")
            .run()
            .await?;

        let bytes = tokio::fs::read(&out).await?;
        // Scratch frames go with the temp dir
        self.scratch = None;
        Ok(bytes)
    }
}
