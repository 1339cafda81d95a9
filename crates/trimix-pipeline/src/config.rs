//! Pipeline configuration.

use std::time::Duration;

/// Orchestrator timing configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Cadence of both poll loops.
    pub poll_interval: Duration,
    /// Pause between saving a shared clip and opening the platform.
    pub share_open_delay: Duration,
    /// How long the per-clip downloading flag stays set after a share.
    pub share_reset_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            share_open_delay: Duration::from_millis(1500),
            share_reset_delay: Duration::from_secs(3),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            poll_interval: Duration::from_secs(
                std::env::var("TRIMIX_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            ..defaults
        }
    }
}
