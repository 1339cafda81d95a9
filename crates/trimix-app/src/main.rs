//! Pipeline client binary.
//!
//! `trimix <video-url>` submits one source video and drives the backend
//! pipeline to completion (transcription, scripts, clips) while logging
//! estimated progress, saving the transcript and script payloads as it goes.
//!
//! `trimix edit <clip> <start-secs> <end-secs>` re-encodes the selected
//! window of a local clip into a WebM via FFmpeg.

mod gateway;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trimix_api_client::ApiClient;
use trimix_editor::{probe_clip, ExportSession, FfmpegFrameSource, FfmpegRecordingSink};
use trimix_models::{PipelineStage, TrimRange};
use trimix_pipeline::{
    FsMediaSink, MediaSink, Orchestrator, PipelineConfig, ProgressEstimator, StateStore,
};

use gateway::BrowserGateway;

const USAGE: &str = "usage: trimix <video-url> | trimix edit <clip> <start-secs> <end-secs>";

struct AppConfig {
    /// Directory holding the persisted dashboard record.
    state_dir: PathBuf,
    /// Directory downloaded payloads are saved to.
    downloads_dir: PathBuf,
}

impl AppConfig {
    fn from_env() -> Self {
        Self {
            state_dir: std::env::var("TRIMIX_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            downloads_dir: std::env::var("TRIMIX_DOWNLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("downloads")),
        }
    }
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::from_default_env().add_directive("trimix=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    if let Err(e) = run().await {
        error!("Fatal: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let app_config = AppConfig::from_env();
    let sink = FsMediaSink::new(app_config.downloads_dir.clone());

    match args.first().map(String::as_str) {
        Some("edit") => {
            if args.len() != 4 {
                bail!("{USAGE}");
            }
            let start: f64 = args[2].parse().context("Invalid start time")?;
            let end: f64 = args[3].parse().context("Invalid end time")?;
            run_edit(&args[1], start, end, &sink).await
        }
        Some(url) => run_pipeline(url, &app_config, sink).await,
        None => bail!("{USAGE}"),
    }
}

async fn run_pipeline(
    url: &str,
    app_config: &AppConfig,
    sink: FsMediaSink,
) -> anyhow::Result<()> {
    let api = Arc::new(ApiClient::from_env().context("Failed to build API client")?);
    let store = Arc::new(StateStore::load_or_default(&app_config.state_dir));

    let orchestrator = Orchestrator::new(
        api,
        Arc::clone(&store),
        PipelineConfig::from_env(),
        Arc::new(sink),
        Arc::new(BrowserGateway),
    );

    let mut estimator = ProgressEstimator::new(Instant::now());

    info!(%url, "Submitting video");
    advance(&mut estimator, PipelineStage::Submitting);
    let state = orchestrator.process_video(url).await;
    info!(message = %state.response_message, "Submission response");

    if !state.transcription_loading {
        bail!("Submission failed: {}", state.response_message);
    }

    advance(&mut estimator, PipelineStage::Transcribing);
    orchestrator.join_transcription_poll().await;

    let state = orchestrator.snapshot();
    if state.transcription.is_empty() {
        bail!("Transcription did not complete: {}", state.response_message);
    }
    advance(&mut estimator, PipelineStage::TranscriptReady);
    if orchestrator.download_transcription()? {
        info!("Transcript saved");
    }

    advance(&mut estimator, PipelineStage::ScriptGenerating);
    let state = orchestrator.generate_scripts().await;
    info!(message = %state.response_message, "Script response");
    if state.script_blob.is_none() {
        bail!("Script generation failed: {}", state.response_message);
    }
    advance(&mut estimator, PipelineStage::ScriptReady);
    if orchestrator.download_scripts()? {
        info!("Scripts saved");
    }

    advance(&mut estimator, PipelineStage::VideoGenerating);
    orchestrator.generate_videos().await;
    orchestrator.join_video_poll().await;

    let state = orchestrator.snapshot();
    if !state.processing_complete || state.generated_videos.is_empty() {
        bail!(
            "Clip generation did not complete: {}",
            state.response_message
        );
    }
    advance(&mut estimator, PipelineStage::Completed);

    info!(
        clips = state.generated_videos.len(),
        message = %state.response_message,
        "Pipeline complete"
    );
    for (i, path) in state.generated_videos.iter().enumerate() {
        info!(clip = i + 1, %path, "Generated clip");
    }

    Ok(())
}

async fn run_edit(input: &str, start: f64, end: f64, sink: &FsMediaSink) -> anyhow::Result<()> {
    if end <= start {
        bail!("End time must be after start time");
    }

    // User-supplied times are clamped against the clip's real length
    let info = probe_clip(input).await?;
    info!(duration = info.duration, width = info.width, height = info.height, "Probed clip");

    let mut range = TrimRange::full(info.duration);
    range.set_end(end);
    range.set_start(start);

    let session = ExportSession::new();
    let mut source = FfmpegFrameSource::new(input)?;
    let mut encoder = FfmpegRecordingSink::new();

    let mut last_decile = 0;
    let file = session
        .run(range, &mut source, &mut encoder, |p| {
            if p / 10 != last_decile {
                last_decile = p / 10;
                info!(percent = p, "Export progress");
            }
        })
        .await?;

    sink.save(&file.file_name, &file.bytes)?;
    info!(file = %file.file_name, size = file.bytes.len(), "Trimmed clip saved");
    Ok(())
}

fn advance(estimator: &mut ProgressEstimator, stage: PipelineStage) {
    let now = Instant::now();
    estimator.advance_to(stage, now);
    info!(stage = %stage, percent = estimator.percent_at(now), "Progress");
}
