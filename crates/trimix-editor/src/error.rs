//! Editor error types.

use std::path::PathBuf;

use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Export cancelled")]
    Cancelled,

    #[error("An export is already in progress")]
    ExportInProgress,

    #[error("Frame source error: {0}")]
    FrameSource(String),

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFmpeg failed (exit code {code:?}): {message}")]
    FfmpegFailed {
        message: String,
        code: Option<i32>,
    },

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFprobe failed (exit code {code:?}): {message}")]
    FfprobeFailed {
        message: String,
        code: Option<i32>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditorError {
    pub fn frame_source(message: impl Into<String>) -> Self {
        Self::FrameSource(message.into())
    }

    pub fn encoder(message: impl Into<String>) -> Self {
        Self::Encoder(message.into())
    }
}
