//! Shared data models for the Trimix pipeline client.
//!
//! This crate provides Serde-serializable types for:
//! - The end-to-end pipeline state record and its stage machine
//! - Backend wire schemas (job start, transcript status, clip status)
//! - Editor geometry (trim ranges and crop rectangles)
//! - Social platform handoff targets

pub mod crop;
pub mod share;
pub mod state;
pub mod timecode;
pub mod trim;
pub mod wire;

// Re-export common types
pub use crop::{CropRect, DEFAULT_CROP_ASPECT};
pub use share::SharePlatform;
pub use state::{PipelineStage, PipelineState, TRANSCRIPT_ID};
pub use timecode::format_timecode;
pub use trim::{TrimRange, MIN_TRIM_GAP_SECS};
pub use wire::{
    GeneratedVideosResponse, GenerationStatus, StartJobRequest, StartJobResponse,
    TranscriptStatusResponse,
};
