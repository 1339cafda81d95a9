//! The processing orchestrator.
//!
//! Drives one job through the backend pipeline:
//! submit -> poll transcription -> generate scripts -> generate clips ->
//! poll clip status, plus the download-and-open social share side-action.
//!
//! The two poll loops carry deliberately opposed fault policies. The
//! transcription loop is fail-fast: any transport error ends the stage
//! terminally. The clip-status loop is fail-soft: errors are logged and
//! polling continues until the backend reports `completed`.
//!
//! Every spawned loop captures the job epoch current at spawn time and
//! re-checks it before applying any result, so a response that arrives after
//! a new submission (or a reset) mutates nothing. At most one timer per
//! stage is live: spawning a loop replaces and aborts its predecessor.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use trimix_api_client::{ApiClient, ApiError};
use trimix_models::{
    GeneratedVideosResponse, SharePlatform, StartJobRequest, StartJobResponse,
    TranscriptStatusResponse, PipelineState, TRANSCRIPT_ID,
};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::share::{MediaSink, PlatformGateway, PlatformWindow};
use crate::store::StateStore;

const VIDEOS_PATH: &str = "/videos/";
const TRANSCRIPTION_STATUS_PATH: &str = "/transcription-status/";
const GENERATE_SCRIPTS_PATH: &str = "/generate-scripts/";
const GENERATE_VIDEOS_PATH: &str = "/generate-videos/";
const VIDEO_STATUS_PATH: &str = "/generate-videos/status/";

/// Title recorded with every submitted job.
const DEFAULT_JOB_TITLE: &str = "Video Title";

const MSG_GENERIC_ERROR: &str = "An error occurred.";
const MSG_SCRIPTS_OK: &str = "Scripts generated successfully.";
const MSG_SCRIPTS_ERROR: &str = "Error generating scripts.";
const MSG_GENERATION_STARTING: &str = "Starting video generation...";
const MSG_GENERATION_STARTED: &str =
    "Video generation started. Check status endpoint for updates.";
const MSG_GENERATION_START_ERROR: &str = "Error starting video generation.";
const MSG_CHECKING_STATUS: &str = "Checking video generation status...";
const MSG_VIDEOS_COMPLETED: &str = "All videos generated successfully!";
const MSG_VIDEOS_WAITING: &str = "Generating videos, please wait...";
const MSG_SHARE_DOWNLOAD_ERROR: &str = "Error downloading the video. Please try again.";

/// The core stage machine for one end-to-end job.
pub struct Orchestrator {
    api: Arc<ApiClient>,
    store: Arc<StateStore>,
    config: PipelineConfig,
    media_sink: Arc<dyn MediaSink>,
    gateway: Arc<dyn PlatformGateway>,
    /// Monotonically increasing job epoch; bumped on every new submission
    /// and reset so stale poll results can be recognized and dropped.
    epoch: Arc<AtomicU64>,
    transcription_poll: Mutex<Option<JoinHandle<()>>>,
    video_poll: Mutex<Option<JoinHandle<()>>>,
}

impl Orchestrator {
    pub fn new(
        api: Arc<ApiClient>,
        store: Arc<StateStore>,
        config: PipelineConfig,
        media_sink: Arc<dyn MediaSink>,
        gateway: Arc<dyn PlatformGateway>,
    ) -> Self {
        Self {
            api,
            store,
            config,
            media_sink,
            gateway,
            epoch: Arc::new(AtomicU64::new(0)),
            transcription_poll: Mutex::new(None),
            video_poll: Mutex::new(None),
        }
    }

    /// Current job epoch.
    pub fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Snapshot of the shared state.
    pub fn snapshot(&self) -> PipelineState {
        self.store.snapshot()
    }

    /// Submit the source video and start the transcription poll loop.
    ///
    /// Begins a new job: the epoch is bumped, any poll loop from a previous
    /// submission is cancelled, and the state record is restored to defaults
    /// before anything else happens. Clip lists, transcripts and guard flags
    /// belong to exactly one job and never carry over into the next.
    pub async fn process_video(&self, url: &str) -> PipelineState {
        if url.trim().is_empty() {
            warn!("Ignoring submission with empty URL");
            return self.store.snapshot();
        }

        self.begin_new_job();
        info!(%url, "Submitting video");

        self.store.update(|s| {
            s.video_url = url.to_string();
            s.processing_complete = false;
            s.loading = true;
        });

        let request = StartJobRequest {
            source_url: url.to_string(),
            title: DEFAULT_JOB_TITLE.to_string(),
        };

        match self
            .api
            .post_json::<_, StartJobResponse>(VIDEOS_PATH, &request)
            .await
        {
            Ok(response) => {
                let snapshot = self.store.update(|s| {
                    s.response_message = response.message;
                    s.transcription_loading = true;
                    s.loading = false;
                });
                self.spawn_transcription_poll();
                snapshot
            }
            Err(e) => {
                error!("Job submission failed: {}", e);
                self.store.update(|s| {
                    s.response_message = e.detail().unwrap_or(MSG_GENERIC_ERROR).to_string();
                    s.processing_complete = true;
                    s.loading = false;
                })
            }
        }
    }

    /// Request script generation for the current transcript.
    ///
    /// Skipped entirely while clip generation is polling, to guard against
    /// concurrent duplicate generation requests.
    pub async fn generate_scripts(&self) -> PipelineState {
        // Guard and flag flip happen under one lock so concurrent callers
        // cannot both pass.
        let mut blocked = false;
        let snapshot = self.store.update(|s| {
            if s.polling_started {
                blocked = true;
            } else {
                s.script_loading = true;
            }
        });
        if blocked {
            debug!("Clip generation already in flight; skipping script request");
            return snapshot;
        }

        let body = serde_json::json!({ "transcript_id": TRANSCRIPT_ID });
        match self.api.post_raw(GENERATE_SCRIPTS_PATH, &body).await {
            Ok(raw) if raw.is_text() => self.store.update(|s| {
                s.script_blob = Some(raw.into_bytes());
                s.response_message = MSG_SCRIPTS_OK.to_string();
                s.script_loading = false;
            }),
            Ok(raw) => {
                let e = ApiError::UnexpectedContentType(raw.content_type().to_string());
                warn!("Script generation failed: {}", e);
                self.store.update(|s| {
                    s.response_message = MSG_SCRIPTS_ERROR.to_string();
                    s.processing_complete = true;
                    s.script_loading = false;
                })
            }
            Err(e) => {
                error!("Script generation failed: {}", e);
                self.store.update(|s| {
                    s.response_message = e.detail().unwrap_or(MSG_SCRIPTS_ERROR).to_string();
                    s.processing_complete = true;
                    s.script_loading = false;
                })
            }
        }
    }

    /// Kick off clip generation and start the status poll loop.
    ///
    /// A no-op while a generation is already polling (`polling_started`):
    /// no duplicate request is issued.
    pub async fn generate_videos(&self) -> PipelineState {
        // Observe-and-flip under one lock: exactly one caller wins the
        // polling_started guard, everyone else gets a no-op.
        let mut blocked = false;
        self.store.update(|s| {
            if s.polling_started {
                blocked = true;
            } else {
                s.video_generation_loading = true;
                s.polling_started = true;
                s.response_message = MSG_GENERATION_STARTING.to_string();
            }
        });
        if blocked {
            debug!("Clip generation already polling; ignoring duplicate start");
            return self.store.snapshot();
        }

        let body = serde_json::json!({ "transcript_id": TRANSCRIPT_ID });
        match self
            .api
            .post_json::<_, GeneratedVideosResponse>(GENERATE_VIDEOS_PATH, &body)
            .await
        {
            Ok(response) => {
                // The immediate response is advisory only; polling decides
                // when generation is actually done.
                let snapshot = self.store.update(|s| {
                    s.response_message = response
                        .message
                        .unwrap_or_else(|| MSG_GENERATION_STARTED.to_string());
                });
                self.spawn_video_poll();
                snapshot
            }
            Err(e) => {
                error!("Failed to start clip generation: {}", e);
                self.store.update(|s| {
                    s.response_message = MSG_GENERATION_START_ERROR.to_string();
                    s.video_generation_loading = false;
                    s.polling_started = false;
                    s.processing_complete = true;
                })
            }
        }
    }

    /// Download a generated clip, hand it to the media sink, then open the
    /// target platform. A blocked platform window is recoverable: the
    /// download already succeeded and only the status message changes.
    pub async fn share_video(
        &self,
        index: usize,
        platform: SharePlatform,
    ) -> PipelineResult<PipelineState> {
        let snapshot = self.store.snapshot();
        let Some(relative) = snapshot.generated_videos.get(index).cloned() else {
            return Err(PipelineError::ClipIndexOutOfRange(index));
        };

        self.store.update(|s| {
            if let Some(flag) = s.downloading_states.get_mut(index) {
                *flag = true;
            }
        });

        let fetched: PipelineResult<()> = async {
            let url = self.api.resolve_media_url(&relative)?;
            let bytes = self.api.download(&url).await?;
            self.media_sink
                .save(&platform.download_file_name(index), &bytes)?;
            Ok(())
        }
        .await;

        match fetched {
            Ok(()) => {
                info!(%platform, index, "Clip saved; opening platform");
                time::sleep(self.config.share_open_delay).await;
                if self.gateway.open(platform.destination_url()) == PlatformWindow::Blocked {
                    warn!(%platform, "Platform window was blocked");
                    self.store.update(|s| {
                        s.response_message = blocked_message(platform);
                    });
                }
            }
            Err(e) => {
                error!(%platform, index, "Error downloading clip: {}", e);
                self.store.update(|s| {
                    s.response_message = MSG_SHARE_DOWNLOAD_ERROR.to_string();
                });
            }
        }

        time::sleep(self.config.share_reset_delay).await;
        Ok(self.store.update(|s| {
            if let Some(flag) = s.downloading_states.get_mut(index) {
                *flag = false;
            }
        }))
    }

    /// Save the in-memory transcript payload through the media sink.
    /// No-op (returns false) when no transcript has arrived yet.
    pub fn download_transcription(&self) -> PipelineResult<bool> {
        match self.store.snapshot().transcription_blob {
            Some(bytes) => {
                self.media_sink.save("transcription.txt", &bytes)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Save the in-memory script payload through the media sink.
    pub fn download_scripts(&self) -> PipelineResult<bool> {
        match self.store.snapshot().script_blob {
            Some(bytes) => {
                self.media_sink.save("scripts.txt", &bytes)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Cancel any active poll loops (UI-unmount contract).
    pub fn cancel_polling(&self) {
        abort_slot(&self.transcription_poll);
        abort_slot(&self.video_poll);
    }

    /// Full user-initiated reset: cancel polling, invalidate in-flight
    /// responses, restore defaults, drop the persisted record.
    pub fn reset(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.cancel_polling();
        self.store.reset();
    }

    /// True while the transcription poll loop is live.
    pub fn transcription_poll_active(&self) -> bool {
        slot_active(&self.transcription_poll)
    }

    /// True while the clip-status poll loop is live.
    pub fn video_poll_active(&self) -> bool {
        slot_active(&self.video_poll)
    }

    /// Wait for the transcription poll loop to finish.
    pub async fn join_transcription_poll(&self) {
        let handle = self.transcription_poll.lock().expect("poll lock").take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Wait for the clip-status poll loop to finish.
    pub async fn join_video_poll(&self) {
        let handle = self.video_poll.lock().expect("poll lock").take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    fn begin_new_job(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.cancel_polling();
        // Fresh record for the new job; this also rewrites the persisted
        // copy, so a stale polling_started guard can't survive a restart.
        self.store.update(|s| *s = PipelineState::default());
    }

    /// Transcription poll loop: fail-fast.
    ///
    /// A JSON envelope with `status == "pending"` keeps the loop running; a
    /// raw text body is the finished transcript; any transport error or
    /// unexpected content type ends the stage terminally.
    fn spawn_transcription_poll(&self) {
        let api = Arc::clone(&self.api);
        let store = Arc::clone(&self.store);
        let epoch = Arc::clone(&self.epoch);
        let my_epoch = epoch.load(Ordering::SeqCst);
        let period = self.config.poll_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if epoch.load(Ordering::SeqCst) != my_epoch {
                    break;
                }

                match api.get_raw(TRANSCRIPTION_STATUS_PATH).await {
                    Ok(raw) if raw.is_json() => match raw.json::<TranscriptStatusResponse>() {
                        Ok(envelope) if envelope.is_pending() => {
                            debug!("Transcription pending...");
                        }
                        Ok(envelope) => {
                            debug!(status = %envelope.status, "Ignoring transcript envelope");
                        }
                        Err(e) => {
                            error!("Bad transcript envelope: {}", e);
                            if epoch.load(Ordering::SeqCst) == my_epoch {
                                store.update(|s| s.processing_complete = true);
                            }
                            break;
                        }
                    },
                    Ok(raw) if raw.is_text() => {
                        if epoch.load(Ordering::SeqCst) != my_epoch {
                            break;
                        }
                        let text = raw.text();
                        let bytes = raw.into_bytes();
                        info!(chars = text.len(), "Transcript ready");
                        store.update(move |s| {
                            s.transcription = text;
                            s.transcription_blob = Some(bytes);
                            s.transcription_loading = false;
                        });
                        break;
                    }
                    Ok(raw) => {
                        let e = ApiError::UnexpectedContentType(raw.content_type().to_string());
                        error!("Transcription poll failed: {}", e);
                        if epoch.load(Ordering::SeqCst) == my_epoch {
                            store.update(|s| s.processing_complete = true);
                        }
                        break;
                    }
                    Err(e) => {
                        error!("Transcription poll failed: {}", e);
                        if epoch.load(Ordering::SeqCst) == my_epoch {
                            store.update(|s| s.processing_complete = true);
                        }
                        break;
                    }
                }
            }
        });

        replace_slot(&self.transcription_poll, handle);
    }

    /// Clip-status poll loop: fail-soft.
    ///
    /// Transport errors are logged and polling continues; only an explicit
    /// `completed` status (or a stale epoch) stops the loop.
    fn spawn_video_poll(&self) {
        let api = Arc::clone(&self.api);
        let store = Arc::clone(&self.store);
        let epoch = Arc::clone(&self.epoch);
        let my_epoch = epoch.load(Ordering::SeqCst);
        let period = self.config.poll_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if epoch.load(Ordering::SeqCst) != my_epoch {
                    break;
                }

                debug!("Polling for video status...");
                match api
                    .get_json::<GeneratedVideosResponse>(
                        VIDEO_STATUS_PATH,
                        &[("transcript_id", TRANSCRIPT_ID)],
                    )
                    .await
                {
                    Ok(response) => {
                        if epoch.load(Ordering::SeqCst) != my_epoch {
                            break;
                        }

                        let completed =
                            response.status.is_some_and(|s| s.is_completed());
                        let path_count = response.video_paths.len();
                        let paths = response.video_paths;

                        store.update(move |s| {
                            s.extend_generated_videos(paths);
                            s.video_generation_loading = !completed;
                            s.response_message = if completed {
                                MSG_VIDEOS_COMPLETED.to_string()
                            } else if path_count > 0 {
                                format!(
                                    "Received {} videos so far. Still checking for more...",
                                    path_count
                                )
                            } else {
                                MSG_VIDEOS_WAITING.to_string()
                            };
                            if completed {
                                s.polling_started = false;
                                s.processing_complete = true;
                            }
                        });

                        if completed {
                            info!(clips = path_count, "Clip generation completed");
                            break;
                        }
                    }
                    Err(e) => {
                        // Fail-soft: the backend may simply be busy.
                        warn!("Error polling for video status: {}", e);
                        if epoch.load(Ordering::SeqCst) == my_epoch {
                            store.update(|s| {
                                s.response_message = MSG_CHECKING_STATUS.to_string();
                            });
                        }
                    }
                }
            }
        });

        replace_slot(&self.video_poll, handle);
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.cancel_polling();
    }
}

fn blocked_message(platform: SharePlatform) -> String {
    format!(
        "Couldn't open {} automatically. Downloaded video successfully. Please manually upload to {}.",
        platform.display_name(),
        platform.display_name()
    )
}

fn replace_slot(slot: &Mutex<Option<JoinHandle<()>>>, handle: JoinHandle<()>) {
    // At most one live timer per stage: a replaced loop is aborted.
    let mut guard = slot.lock().expect("poll lock");
    if let Some(old) = guard.replace(handle) {
        old.abort();
    }
}

fn abort_slot(slot: &Mutex<Option<JoinHandle<()>>>) {
    if let Some(handle) = slot.lock().expect("poll lock").take() {
        handle.abort();
    }
}

fn slot_active(slot: &Mutex<Option<JoinHandle<()>>>) -> bool {
    slot.lock()
        .expect("poll lock")
        .as_ref()
        .is_some_and(|h| !h.is_finished())
}
