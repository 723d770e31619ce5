//! Run a session against a synthetic viewer.

use std::path::PathBuf;

use anyhow::Context;

use focustrain_common::clock::FrameClock;
use focustrain_common::config::AppConfig;
use focustrain_gaze_model::landmarks::LandmarkSource;
use focustrain_gaze_model::trace::TraceHeader;
use focustrain_tracking_core::GazeTracker;

use crate::session::{emit_summary, SessionDriver};
use crate::simulation::{BouncingTarget, SyntheticViewer, ViewerParams};
use crate::trace_recorder::TraceRecorder;

pub struct SimulateOptions {
    pub duration_secs: f64,
    pub seed: u64,
    pub viewer: ViewerParams,
    pub record: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

pub fn run(config: AppConfig, options: SimulateOptions) -> anyhow::Result<()> {
    let fps = config.frame_rate_hz;
    let tracker = GazeTracker::new(config, FrameClock::fixed(fps)).context("Invalid configuration")?;
    let layout = *tracker.layout();

    let mut viewer = SyntheticViewer::new(layout, options.viewer, options.seed.wrapping_add(1));
    let mut driver = SessionDriver::new(tracker, BouncingTarget::new(layout, options.seed));

    let mut recorder = match options.record {
        Some(path) => Some(
            TraceRecorder::create(path.clone(), &TraceHeader::new(fps, layout))
                .with_context(|| format!("Failed to create trace {}", path.display()))?,
        ),
        None => None,
    };

    let total_frames = (options.duration_secs.max(0.0) * fps as f64).round() as u64;
    tracing::info!(
        frames = total_frames,
        seed = options.seed,
        noise = options.viewer.noise,
        dropout = options.viewer.dropout,
        "Starting simulated session"
    );

    for _ in 0..total_frames {
        viewer.look_at(driver.gaze_target());
        let face = viewer.get_eye_landmarks();
        driver.step(face.as_ref(), None);

        if let Some(recorder) = recorder.as_mut() {
            recorder.record(driver.tracker().now_ns(), face.as_ref())?;
        }
    }

    if let Some(recorder) = recorder {
        let path = recorder.path().to_path_buf();
        let recorded = recorder.finish()?;
        tracing::info!(
            path = %path.display(),
            frames = recorded.frames,
            span_secs = recorded.span_secs,
            "Trace recorded"
        );
    }

    let summary = driver.summary();
    tracing::info!(
        score = summary.stats.score,
        successes = summary.stats.successful_focuses,
        lost = summary.stats.lost_focuses,
        "Session finished"
    );
    emit_summary(&summary, options.output.as_deref())
}
