//! Pipeline orchestration for the Trimix client.
//!
//! This crate owns the shared `PipelineState` record and drives the
//! multi-stage backend pipeline to completion:
//!
//! - [`StateStore`] holds the single state object, applies functional
//!   updates, and persists a blob-stripped record after every mutation.
//! - [`Orchestrator`] is the stage machine: it submits the source video,
//!   runs the transcription and clip-status poll loops (with their opposed
//!   fault policies), and exposes the social-share side-action.
//! - [`ProgressEstimator`] projects a display percentage across stage
//!   boundaries while waiting for real completion signals.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod share;
pub mod store;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use orchestrator::Orchestrator;
pub use progress::ProgressEstimator;
pub use share::{FsMediaSink, MediaSink, PlatformGateway, PlatformWindow};
pub use store::{StateStore, STATE_FILE_NAME};
