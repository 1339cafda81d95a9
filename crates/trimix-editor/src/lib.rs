//! Clip editor: interactive trim/crop sessions and the re-encode engine.

pub mod error;
pub mod export;
pub mod ffmpeg;
pub mod probe;
pub mod session;

pub use error::{EditorError, EditorResult};
pub use export::{
    CancelHandle, ExportSession, ExportedFile, Frame, FrameSource, RecordingSink, EXPORT_FPS,
    PROGRESS_CEILING,
};
pub use ffmpeg::{FfmpegCommand, FfmpegFrameSource, FfmpegRecordingSink};
pub use probe::{probe_clip, ClipInfo};
pub use session::{EditMode, EditSession, STEP_SECS};
