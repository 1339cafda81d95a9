//! Social platform handoff targets.

use serde::{Deserialize, Serialize};

/// External platform a generated clip can be pushed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharePlatform {
    Instagram,
    Facebook,
    Youtube,
}

impl SharePlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            SharePlatform::Instagram => "instagram",
            SharePlatform::Facebook => "facebook",
            SharePlatform::Youtube => "youtube",
        }
    }

    /// User-facing platform name.
    pub fn display_name(&self) -> &'static str {
        match self {
            SharePlatform::Instagram => "Instagram",
            SharePlatform::Facebook => "Facebook",
            SharePlatform::Youtube => "YouTube",
        }
    }

    /// Browser destination opened after the clip download starts.
    pub fn destination_url(&self) -> &'static str {
        match self {
            SharePlatform::Instagram => "https://www.instagram.com/",
            SharePlatform::Facebook => "https://www.facebook.com/",
            SharePlatform::Youtube => "https://studio.youtube.com/channel/UC/videos/upload",
        }
    }

    /// Local file name for the downloaded clip (1-based index, matching the
    /// on-screen clip numbering).
    pub fn download_file_name(&self, index: usize) -> String {
        format!("{}-video-{}.mp4", self.as_str(), index + 1)
    }
}

impl std::fmt::Display for SharePlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
