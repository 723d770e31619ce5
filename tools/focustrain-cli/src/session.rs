//! Drives a tracker and a moving target through a session.

use std::path::Path;

use serde::Serialize;

use focustrain_common::clock::{ns_to_secs, TimestampNs};
use focustrain_gaze_model::calibration::CalibrationProfile;
use focustrain_gaze_model::focus::FocusEvent;
use focustrain_gaze_model::geometry::Point2D;
use focustrain_gaze_model::landmarks::FaceLandmarks;
use focustrain_tracking_core::{GazeTracker, SessionStats};

use crate::simulation::BouncingTarget;

/// A success or loss, with where the gaze and target were.
#[derive(Debug, Clone, Serialize)]
pub struct FocusEventRecord {
    pub timestamp_ns: TimestampNs,
    pub event: FocusEvent,
    pub gaze: Option<Point2D>,
    pub target: Point2D,
    /// Gaze-to-target distance in pixels, when a gaze was available.
    pub distance: Option<f64>,
    pub score: u32,
}

/// End-of-session report printed by `simulate` and `replay`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub frames: u64,
    pub duration_secs: f64,
    pub calibrated: bool,
    pub calibration: CalibrationProfile,
    pub stats: SessionStats,
    pub average_focus_duration: Option<f64>,
    pub events: Vec<FocusEventRecord>,
}

/// Game loop minus rendering: one `step` per camera frame.
pub struct SessionDriver {
    tracker: GazeTracker,
    target: BouncingTarget,
    threshold: f64,
    events: Vec<FocusEventRecord>,
}

impl SessionDriver {
    pub fn new(tracker: GazeTracker, target: BouncingTarget) -> Self {
        let threshold = tracker.config().focus.threshold_px;
        Self {
            tracker,
            target,
            threshold,
            events: Vec::new(),
        }
    }

    /// Process one frame. `timestamp_ns` overrides the tracker's clock.
    ///
    /// The target only moves once calibration is complete.
    pub fn step(
        &mut self,
        face: Option<&FaceLandmarks>,
        timestamp_ns: Option<TimestampNs>,
    ) -> FocusEvent {
        match timestamp_ns {
            Some(ts) => self.tracker.feed_landmarks_at(face, ts),
            None => self.tracker.feed_landmarks(face),
        };

        if self.tracker.is_calibrating() {
            return FocusEvent::None;
        }

        self.target.advance();
        let target = self.target.position();
        let event = self.tracker.update_focus(target, self.threshold);

        if event != FocusEvent::None {
            let gaze = self.tracker.current_gaze();
            self.events.push(FocusEventRecord {
                timestamp_ns: self.tracker.now_ns(),
                event,
                gaze,
                target,
                distance: gaze.map(|g| g.distance_to(&target)),
                score: self.tracker.stats().score,
            });
        }
        if event.is_success() {
            self.target.relocate();
            tracing::debug!(
                x = self.target.position().x,
                y = self.target.position().y,
                "Target relocated"
            );
        }
        event
    }

    /// Where the user is supposed to look right now.
    pub fn gaze_target(&self) -> Point2D {
        match self.tracker.calibration_progress().current_anchor {
            Some(anchor) => self.tracker.layout().anchor_position(anchor),
            None => self.target.position(),
        }
    }

    pub fn tracker(&self) -> &GazeTracker {
        &self.tracker
    }

    pub fn summary(&self) -> SessionSummary {
        let stats = self.tracker.stats().clone();
        SessionSummary {
            frames: stats.frames,
            duration_secs: ns_to_secs(self.tracker.now_ns()),
            calibrated: !self.tracker.is_calibrating(),
            calibration: self.tracker.calibration_profile().clone(),
            average_focus_duration: stats.average_focus_duration(),
            stats,
            events: self.events.clone(),
        }
    }
}

/// Print the summary as pretty JSON, or write it to `output`.
pub fn emit_summary(summary: &SessionSummary, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!(path = %path.display(), "Summary written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use focustrain_common::clock::FrameClock;
    use focustrain_common::config::AppConfig;
    use focustrain_gaze_model::landmarks::LandmarkSource;

    use crate::simulation::{SyntheticViewer, ViewerParams};

    fn driver(seed: u64) -> SessionDriver {
        let tracker = GazeTracker::new(AppConfig::default(), FrameClock::fixed(30)).unwrap();
        let target = BouncingTarget::new(*tracker.layout(), seed);
        SessionDriver::new(tracker, target)
    }

    fn simulate(frames: usize, seed: u64) -> (SessionDriver, Vec<(TimestampNs, Option<FaceLandmarks>)>) {
        let mut driver = driver(seed);
        let mut viewer = SyntheticViewer::new(*driver.tracker().layout(), ViewerParams::default(), seed);
        let mut recorded = Vec::with_capacity(frames);
        for _ in 0..frames {
            viewer.look_at(driver.gaze_target());
            let face = viewer.get_eye_landmarks();
            driver.step(face.as_ref(), None);
            recorded.push((driver.tracker().now_ns(), face));
        }
        (driver, recorded)
    }

    #[test]
    fn test_simulated_session_calibrates_and_scores() {
        let (driver, _) = simulate(30 * 60, 5);
        let summary = driver.summary();
        assert!(summary.calibrated);
        assert!(summary.stats.successful_focuses > 0);
        assert_eq!(summary.stats.score, 5 * summary.stats.successful_focuses);
        assert_eq!(summary.frames, 30 * 60);
        assert!(summary
            .events
            .iter()
            .any(|record| record.event.is_success()));
    }

    #[test]
    fn test_replay_reproduces_simulation() {
        let (simulated, recorded) = simulate(30 * 30, 9);

        let mut replayed = driver(9);
        for (ts, face) in &recorded {
            replayed.step(face.as_ref(), Some(*ts));
        }

        let a = simulated.summary();
        let b = replayed.summary();
        assert_eq!(a.stats, b.stats);
        assert_eq!(a.calibration, b.calibration);
        assert_eq!(a.duration_secs, b.duration_secs);
    }

    #[test]
    fn test_calibration_directs_gaze_to_anchors() {
        let driver = driver(1);
        assert_eq!(driver.gaze_target(), Point2D::new(640.0, 360.0));
    }
}
