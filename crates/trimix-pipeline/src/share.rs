//! Browser-facing collaborator seams for the share side-action.
//!
//! Triggering a file download and opening an external platform are side
//! effects of the hosting environment, not core logic. They sit behind
//! traits so the orchestrator stays testable and so a different host (native
//! shell, test harness) can supply its own implementations.

use std::path::PathBuf;

use tracing::info;

/// Where downloaded clip files land.
pub trait MediaSink: Send + Sync {
    /// Save a finished download under the given file name.
    fn save(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<()>;
}

/// Outcome of asking the host to open an external platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformWindow {
    /// The platform context opened.
    Opened,
    /// The host refused (popup blocker or equivalent). Recoverable; the
    /// download itself already succeeded.
    Blocked,
}

/// Opens third-party platform URLs in a new browser context.
pub trait PlatformGateway: Send + Sync {
    fn open(&self, url: &str) -> PlatformWindow;
}

/// Filesystem-backed media sink.
pub struct FsMediaSink {
    dir: PathBuf,
}

impl FsMediaSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl MediaSink for FsMediaSink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes)?;
        info!(path = %path.display(), size = bytes.len(), "Saved clip");
        Ok(())
    }
}
