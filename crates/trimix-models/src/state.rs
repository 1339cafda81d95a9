//! Pipeline state record and stage machine.
//!
//! One `PipelineState` describes the lifecycle of a single submitted job
//! (source URL -> transcription -> scripts -> generated clips). It is owned
//! by the state store, mutated only through functional updates, and persisted
//! after every mutation with the binary payloads stripped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed identifier the backend uses to locate the current job's transcript.
pub const TRANSCRIPT_ID: &str = "combined";

/// Lifecycle stage of the end-to-end pipeline.
///
/// Ordered by pipeline position, so later stages compare greater.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// No job submitted.
    #[default]
    Idle,
    /// Job-creation request in flight.
    Submitting,
    /// Waiting for the transcription poll loop.
    Transcribing,
    /// Transcript text available.
    TranscriptReady,
    /// Script-generation request in flight.
    ScriptGenerating,
    /// Script payload available.
    ScriptReady,
    /// Waiting for the clip-status poll loop.
    VideoGenerating,
    /// All clips generated.
    Completed,
    /// A stage failed terminally.
    Errored,
}

impl PipelineStage {
    /// Get string representation of the stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Submitting => "submitting",
            PipelineStage::Transcribing => "transcribing",
            PipelineStage::TranscriptReady => "transcript_ready",
            PipelineStage::ScriptGenerating => "script_generating",
            PipelineStage::ScriptReady => "script_ready",
            PipelineStage::VideoGenerating => "video_generating",
            PipelineStage::Completed => "completed",
            PipelineStage::Errored => "errored",
        }
    }

    /// Check if this is a terminal stage (no more transitions expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Completed | PipelineStage::Errored)
    }

    /// The stage that follows this one on the happy path, if any.
    pub fn next(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Idle => Some(PipelineStage::Submitting),
            PipelineStage::Submitting => Some(PipelineStage::Transcribing),
            PipelineStage::Transcribing => Some(PipelineStage::TranscriptReady),
            PipelineStage::TranscriptReady => Some(PipelineStage::ScriptGenerating),
            PipelineStage::ScriptGenerating => Some(PipelineStage::ScriptReady),
            PipelineStage::ScriptReady => Some(PipelineStage::VideoGenerating),
            PipelineStage::VideoGenerating => Some(PipelineStage::Completed),
            PipelineStage::Completed | PipelineStage::Errored => None,
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared state for one end-to-end job.
///
/// The two blob fields are held in memory only. They are marked
/// `#[serde(skip)]` so the persisted record never contains them and any
/// rehydrated record comes back with both set to `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    /// User-supplied source video URL.
    pub video_url: String,
    /// Job-creation request in flight.
    pub loading: bool,
    /// Transcription stage in flight.
    pub transcription_loading: bool,
    /// Script-generation stage in flight.
    pub script_loading: bool,
    /// Clip-generation stage in flight.
    pub video_generation_loading: bool,
    /// Last human-readable status or error string.
    pub response_message: String,
    /// Full transcript text once available.
    pub transcription: String,
    /// Raw transcript payload; never persisted.
    #[serde(skip)]
    pub transcription_blob: Option<Vec<u8>>,
    /// Raw script payload; never persisted.
    #[serde(skip)]
    pub script_blob: Option<Vec<u8>>,
    /// Relative URLs of generated clips; only ever appended to within one job.
    pub generated_videos: Vec<String>,
    /// Per-clip "currently downloading" flags, index-aligned with
    /// `generated_videos`.
    pub downloading_states: Vec<bool>,
    /// Guards against concurrent duplicate generation requests.
    pub polling_started: bool,
    /// True when no stage is in flight; gates the submit form.
    pub processing_complete: bool,
    /// When this record was last persisted.
    #[serde(default)]
    pub persisted_at: Option<DateTime<Utc>>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            video_url: String::new(),
            loading: false,
            transcription_loading: false,
            script_loading: false,
            video_generation_loading: false,
            response_message: String::new(),
            transcription: String::new(),
            transcription_blob: None,
            script_blob: None,
            generated_videos: Vec::new(),
            downloading_states: Vec::new(),
            polling_started: false,
            processing_complete: true,
            persisted_at: None,
        }
    }
}

impl PipelineState {
    /// Derive the current stage from the loading flags and payloads.
    pub fn stage(&self) -> PipelineStage {
        if self.loading {
            return PipelineStage::Submitting;
        }
        if self.transcription_loading {
            return PipelineStage::Transcribing;
        }
        if self.script_loading {
            return PipelineStage::ScriptGenerating;
        }
        if self.video_generation_loading {
            return PipelineStage::VideoGenerating;
        }
        if self.processing_complete && !self.generated_videos.is_empty() {
            return PipelineStage::Completed;
        }
        if !self.transcription.is_empty() {
            if self.script_blob.is_some() {
                return PipelineStage::ScriptReady;
            }
            return PipelineStage::TranscriptReady;
        }
        PipelineStage::Idle
    }

    /// True while any stage is in flight.
    pub fn is_busy(&self) -> bool {
        self.loading
            || self.transcription_loading
            || self.script_loading
            || self.video_generation_loading
    }

    /// Resize `downloading_states` to match `generated_videos`, preserving
    /// the flags of indices that already exist. New entries default to
    /// not-downloading.
    pub fn sync_downloading_states(&mut self) {
        self.downloading_states.resize(self.generated_videos.len(), false);
    }

    /// Replace the clip list with a longer one from the status endpoint.
    ///
    /// The list only ever grows within one job; a shorter or equal list is
    /// ignored. Existing per-index downloading flags survive the growth.
    pub fn extend_generated_videos(&mut self, paths: Vec<String>) -> bool {
        if paths.len() <= self.generated_videos.len() {
            return false;
        }
        self.generated_videos = paths;
        self.sync_downloading_states();
        true
    }

    /// Copy of this state with the blob fields nulled out, ready to persist.
    pub fn persistable(&self) -> Self {
        Self {
            transcription_blob: None,
            script_blob: None,
            persisted_at: Some(Utc::now()),
            ..self.clone()
        }
    }
}
