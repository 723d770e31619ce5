//! Replay a recorded landmark trace through a fresh tracker.

use std::path::PathBuf;

use anyhow::Context;

use focustrain_common::clock::FrameClock;
use focustrain_common::config::{AppConfig, ScreenConfig};
use focustrain_gaze_model::trace::LoadedTrace;
use focustrain_tracking_core::GazeTracker;

use crate::session::{emit_summary, SessionDriver};
use crate::simulation::BouncingTarget;

pub fn run(
    mut config: AppConfig,
    path: PathBuf,
    seed: u64,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let trace =
        LoadedTrace::load(&path).map_err(|e| anyhow::anyhow!("Failed to load trace: {e}"))?;

    // The trace decides timing and screen geometry; tuning comes from config.
    config.frame_rate_hz = trace.header.frame_rate_hz;
    config.screen = ScreenConfig {
        width: trace.header.screen.width.round() as u32,
        height: trace.header.screen.height.round() as u32,
        edge_margin_x: trace.header.screen.edge_margin_x,
        edge_margin_y: trace.header.screen.edge_margin_y,
    };

    let fps = config.frame_rate_hz;
    let tracker = GazeTracker::new(config, FrameClock::fixed(fps))
        .context("Trace header is incompatible with the configuration")?;
    let layout = *tracker.layout();
    let mut driver = SessionDriver::new(tracker, BouncingTarget::new(layout, seed));

    tracing::info!(
        path = %trace.path.display(),
        frames = trace.frames.len(),
        duration_secs = trace.duration_secs(),
        recorded_at = %trace.header.epoch_wall,
        "Replaying trace"
    );

    for frame in &trace.frames {
        driver.step(frame.landmarks.as_ref(), Some(frame.timestamp_ns));
    }

    let summary = driver.summary();
    if !summary.calibrated {
        tracing::warn!(
            captured = summary.calibration.captured_count(),
            "Trace ended before calibration completed"
        );
    }
    emit_summary(&summary, output.as_deref())
}
