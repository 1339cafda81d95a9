//! Client-side progress projection.
//!
//! Maps the discrete pipeline stage onto a continuous 0-100 display
//! percentage. While a stage is in flight the percentage interpolates
//! linearly from the stage's entry milestone toward its ceiling over a fixed
//! maximum stage duration; if the real completion signal never arrives the
//! displayed stage is promoted on timeout. The projection is advisory only:
//! it has no handle on the pipeline state and can never mark the job
//! complete.

use std::time::{Duration, Instant};

use trimix_models::PipelineStage;

/// Upper bound on how long one stage is expected to take.
pub const MAX_STAGE_DURATION: Duration = Duration::from_secs(7 * 60);

/// Time-based progress projector for the displayed percentage.
#[derive(Debug, Clone)]
pub struct ProgressEstimator {
    stage: PipelineStage,
    stage_entered: Instant,
}

impl ProgressEstimator {
    /// Start a fresh projection at Idle.
    pub fn new(now: Instant) -> Self {
        Self {
            stage: PipelineStage::Idle,
            stage_entered: now,
        }
    }

    /// Stage currently being displayed. May run ahead of the real pipeline
    /// after a timeout promotion.
    pub fn displayed_stage(&self) -> PipelineStage {
        self.stage
    }

    /// Reset to 0/Idle for a new submission.
    pub fn reset(&mut self, now: Instant) {
        self.stage = PipelineStage::Idle;
        self.stage_entered = now;
    }

    /// Apply a real stage transition. The projection is monotone: a signal
    /// for a stage at or behind the displayed one is ignored.
    pub fn advance_to(&mut self, stage: PipelineStage, now: Instant) {
        if stage > self.stage {
            self.stage = stage;
            self.stage_entered = now;
        }
    }

    /// Percentage milestones a stage spans: (entry, ceiling).
    fn milestones(stage: PipelineStage) -> (f64, f64) {
        match stage {
            PipelineStage::Idle => (0.0, 0.0),
            PipelineStage::Submitting => (0.0, 15.0),
            PipelineStage::Transcribing => (15.0, 65.0),
            PipelineStage::TranscriptReady => (65.0, 65.0),
            PipelineStage::ScriptGenerating => (65.0, 75.0),
            PipelineStage::ScriptReady => (75.0, 75.0),
            PipelineStage::VideoGenerating => (75.0, 100.0),
            PipelineStage::Completed => (100.0, 100.0),
            PipelineStage::Errored => (0.0, 0.0),
        }
    }

    /// Current display percentage, promoting the displayed stage first if
    /// the maximum stage duration has elapsed without a real signal.
    pub fn percent_at(&mut self, now: Instant) -> f64 {
        self.promote_on_timeout(now);

        let (entry, ceiling) = Self::milestones(self.stage);
        let elapsed = now.saturating_duration_since(self.stage_entered);
        let fraction =
            (elapsed.as_secs_f64() / MAX_STAGE_DURATION.as_secs_f64()).clamp(0.0, 1.0);
        entry + fraction * (ceiling - entry)
    }

    /// Promote the displayed stage when its time budget runs out.
    ///
    /// A timeout promotion is a fallback for the display only, not a
    /// completion signal; the Idle and terminal stages never promote.
    fn promote_on_timeout(&mut self, now: Instant) {
        while self.stage != PipelineStage::Idle
            && !self.stage.is_terminal()
            && now.saturating_duration_since(self.stage_entered) >= MAX_STAGE_DURATION
        {
            let Some(next) = self.stage.next() else {
                break;
            };
            self.stage = next;
            self.stage_entered += MAX_STAGE_DURATION;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let start = Instant::now();
        let mut estimator = ProgressEstimator::new(start);
        assert_eq!(estimator.percent_at(start), 0.0);
        assert_eq!(estimator.displayed_stage(), PipelineStage::Idle);
    }

    #[test]
    fn test_interpolates_within_stage() {
        let start = Instant::now();
        let mut estimator = ProgressEstimator::new(start);
        estimator.advance_to(PipelineStage::Transcribing, start);

        // Halfway through the stage budget: halfway between 15 and 65
        let halfway = start + MAX_STAGE_DURATION / 2;
        let percent = estimator.percent_at(halfway);
        assert!((percent - 40.0).abs() < 0.5, "got {}", percent);
    }

    #[test]
    fn test_caps_at_ceiling_until_real_signal() {
        let start = Instant::now();
        let mut estimator = ProgressEstimator::new(start);
        estimator.advance_to(PipelineStage::Transcribing, start);

        // Just before the budget elapses the percentage is pinned under 65
        let almost = start + MAX_STAGE_DURATION - Duration::from_secs(1);
        assert!(estimator.percent_at(almost) < 65.0);

        estimator.advance_to(PipelineStage::TranscriptReady, almost);
        assert!((estimator.percent_at(almost) - 65.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_timeout_promotes_displayed_stage_only() {
        let start = Instant::now();
        let mut estimator = ProgressEstimator::new(start);
        estimator.advance_to(PipelineStage::Transcribing, start);

        let late = start + MAX_STAGE_DURATION + Duration::from_secs(10);
        let percent = estimator.percent_at(late);
        assert_eq!(estimator.displayed_stage(), PipelineStage::TranscriptReady);
        assert!((65.0..=66.0).contains(&percent), "got {}", percent);
    }

    #[test]
    fn test_idle_never_promotes() {
        let start = Instant::now();
        let mut estimator = ProgressEstimator::new(start);
        let late = start + MAX_STAGE_DURATION * 3;
        assert_eq!(estimator.percent_at(late), 0.0);
        assert_eq!(estimator.displayed_stage(), PipelineStage::Idle);
    }

    #[test]
    fn test_stale_signal_ignored() {
        let start = Instant::now();
        let mut estimator = ProgressEstimator::new(start);
        estimator.advance_to(PipelineStage::VideoGenerating, start);
        estimator.advance_to(PipelineStage::Transcribing, start);
        assert_eq!(estimator.displayed_stage(), PipelineStage::VideoGenerating);
    }

    #[test]
    fn test_reset_restarts_projection() {
        let start = Instant::now();
        let mut estimator = ProgressEstimator::new(start);
        estimator.advance_to(PipelineStage::Completed, start);
        assert_eq!(estimator.percent_at(start), 100.0);

        let later = start + Duration::from_secs(30);
        estimator.reset(later);
        assert_eq!(estimator.percent_at(later), 0.0);
        assert_eq!(estimator.displayed_stage(), PipelineStage::Idle);
    }
}
