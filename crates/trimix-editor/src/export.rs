//! Frame-by-frame re-encode of the selected trim window.
//!
//! The export walks the selection at a fixed 30fps: seek to a frame
//! timestamp, wait for the source to land there, capture the frame, hand it
//! to the encoder, advance one frame interval. The encoder and the source
//! both sit behind traits so the same session logic drives an in-memory fake
//! in tests and the FFmpeg CLI in the binary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use trimix_models::TrimRange;

use crate::error::{EditorError, EditorResult};

/// Fixed capture rate of the export walk.
pub const EXPORT_FPS: f64 = 30.0;

/// Displayed progress is pinned here until the encoder has assembled the
/// final file.
pub const PROGRESS_CEILING: u8 = 95;

/// One captured frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: u64,
    pub data: Vec<u8>,
}

/// A finished export ready to hand to a media sink.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Seekable source of visual frames.
#[async_trait]
pub trait FrameSource: Send {
    /// Position the source at `time` and wait until the frame there is
    /// available.
    async fn seek(&mut self, time: f64) -> EditorResult<()>;

    /// Capture the frame at the current position.
    async fn capture_frame(&mut self) -> EditorResult<Frame>;
}

/// Incremental encoder the captured frames stream into.
#[async_trait]
pub trait RecordingSink: Send {
    async fn start(&mut self) -> EditorResult<()>;

    async fn write_frame(&mut self, frame: Frame) -> EditorResult<()>;

    /// Stop encoding and assemble the final container bytes.
    async fn finish(&mut self) -> EditorResult<Vec<u8>>;
}

/// Cancels a running export between frames.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives one export at a time; restartable after completion, failure or
/// cancellation.
pub struct ExportSession {
    cancel: Arc<AtomicBool>,
    exporting: AtomicBool,
}

impl Default for ExportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportSession {
    pub fn new() -> Self {
        Self {
            cancel: Arc::new(AtomicBool::new(false)),
            exporting: AtomicBool::new(false),
        }
    }

    /// Handle for cancelling the current (or next) run from another task.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancel))
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::SeqCst)
    }

    /// Re-encode the selected window.
    ///
    /// Captures exactly `ceil(selected_duration * 30)` frames. `on_progress`
    /// receives whole percentages capped at [`PROGRESS_CEILING`] during the
    /// walk and 100 once the file exists. Any error (or a cancel between
    /// frames) aborts the run; partial encoder output is discarded with it.
    pub async fn run<S, K, F>(
        &self,
        range: TrimRange,
        source: &mut S,
        sink: &mut K,
        mut on_progress: F,
    ) -> EditorResult<ExportedFile>
    where
        S: FrameSource + ?Sized,
        K: RecordingSink + ?Sized,
        F: FnMut(u8),
    {
        if self
            .exporting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(EditorError::ExportInProgress);
        }
        self.cancel.store(false, Ordering::SeqCst);

        let result = self.walk(range, source, sink, &mut on_progress).await;
        self.exporting.store(false, Ordering::SeqCst);

        match &result {
            Ok(file) => {
                info!(
                    file = %file.file_name,
                    size = file.bytes.len(),
                    "Export complete"
                );
            }
            Err(e) => warn!("Export aborted: {}", e),
        }
        result
    }

    async fn walk<S, K, F>(
        &self,
        range: TrimRange,
        source: &mut S,
        sink: &mut K,
        on_progress: &mut F,
    ) -> EditorResult<ExportedFile>
    where
        S: FrameSource + ?Sized,
        K: RecordingSink + ?Sized,
        F: FnMut(u8),
    {
        let total_frames = (range.selected_duration() * EXPORT_FPS).ceil() as u64;
        let frame_interval = 1.0 / EXPORT_FPS;

        sink.start().await?;
        source.seek(range.start).await?;

        for index in 0..total_frames {
            if self.cancel.load(Ordering::SeqCst) {
                return Err(EditorError::Cancelled);
            }

            let frame = source.capture_frame().await?;
            sink.write_frame(Frame { index, ..frame }).await?;

            let percent = ((index + 1) as f64 / total_frames as f64) * 100.0;
            on_progress((percent as u8).min(PROGRESS_CEILING));

            if index + 1 < total_frames {
                source
                    .seek(range.start + (index + 1) as f64 * frame_interval)
                    .await?;
            }
        }

        let bytes = sink.finish().await?;
        let file_name = format!(
            "trimmed-video-{}.webm",
            chrono::Utc::now().timestamp_millis()
        );
        on_progress(100);

        Ok(ExportedFile { file_name, bytes })
    }
}
