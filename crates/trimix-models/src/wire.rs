//! Backend wire schemas.
//!
//! Request and response shapes for the REST surface the client consumes.
//! The backend itself is an opaque collaborator; these types only pin down
//! the JSON contracts.

use serde::{Deserialize, Serialize};

/// Body for `POST /videos/` (start job).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartJobRequest {
    /// User-supplied source video URL.
    pub source_url: String,
    /// Display title recorded with the job.
    pub title: String,
}

/// Response from `POST /videos/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartJobResponse {
    pub message: String,
}

/// JSON envelope returned by `GET /transcription-status/` while the
/// transcript is still pending. A finished transcript arrives as a raw
/// `text/plain` body instead, distinguished by content type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptStatusResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_id: Option<String>,
}

impl TranscriptStatusResponse {
    /// True while the backend is still transcribing.
    pub fn is_pending(&self) -> bool {
        self.status == "pending"
    }
}

/// Backend-reported clip generation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    #[default]
    NotStarted,
    Processing,
    Completed,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::NotStarted => "not_started",
            GenerationStatus::Processing => "processing",
            GenerationStatus::Completed => "completed",
        }
    }

    /// Only an explicit `completed` stops the status poll loop.
    pub fn is_completed(&self) -> bool {
        matches!(self, GenerationStatus::Completed)
    }
}

impl std::fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Response from `GET /generate-videos/status/` (and the optional body of
/// `POST /generate-videos/`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneratedVideosResponse {
    /// Relative URLs of the clips generated so far.
    #[serde(default)]
    pub video_paths: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GenerationStatus>,
}
