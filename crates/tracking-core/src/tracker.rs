//! Per-frame tracking façade.
//!
//! `GazeTracker` owns every piece of mutable tracking state and is driven
//! by exactly one feed call per camera frame, optionally followed by one
//! `update_focus` call. Until calibration completes, samples go to the
//! calibration controller; afterwards they are mapped and smoothed.

use focustrain_common::clock::{FrameClock, TimestampNs};
use focustrain_common::config::AppConfig;
use focustrain_common::error::FocusTrainResult;
use focustrain_gaze_model::calibration::CalibrationProfile;
use focustrain_gaze_model::focus::{FocusEvent, FocusPhase};
use focustrain_gaze_model::geometry::{Point2D, ScreenLayout};
use focustrain_gaze_model::landmarks::{FaceLandmarks, IrisSample};

use crate::calibration::{CalibrationController, CalibrationProgress, CalibrationStep};
use crate::filter::TemporalFilter;
use crate::focus::{FocusState, FocusStateMachine};
use crate::iris::{normalize_iris, SampleRejection};
use crate::mapper::GazeMapper;
use crate::stats::SessionStats;

/// What a feed call did with the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameUpdate {
    /// The frame went to the calibration procedure.
    Calibration(CalibrationStep),
    /// The frame was mapped; `None` when no usable sample was available.
    Gaze(Option<Point2D>),
}

/// Complete gaze-tracking pipeline for one session.
#[derive(Debug, Clone)]
pub struct GazeTracker {
    config: AppConfig,
    layout: ScreenLayout,
    clock: FrameClock,
    now: TimestampNs,
    calibration: CalibrationController,
    mapper: GazeMapper,
    filter: TemporalFilter,
    focus: FocusStateMachine,
    stats: SessionStats,
    current_gaze: Option<Point2D>,
    last_rejection: Option<SampleRejection>,
}

impl GazeTracker {
    /// Create a tracker after validating the configuration.
    pub fn new(config: AppConfig, clock: FrameClock) -> FocusTrainResult<Self> {
        config.validate()?;
        Ok(Self::build(config, clock))
    }

    /// Default configuration on a fixed clock at the default frame rate.
    pub fn with_defaults() -> Self {
        let config = AppConfig::default();
        let clock = FrameClock::fixed(config.frame_rate_hz);
        Self::build(config, clock)
    }

    fn build(config: AppConfig, clock: FrameClock) -> Self {
        let layout = ScreenLayout::from(&config.screen);
        let frame_interval = config.frame_interval_secs();
        Self {
            calibration: CalibrationController::new(
                config.calibration.clone(),
                layout,
                frame_interval,
            ),
            mapper: GazeMapper::new(config.mapping.clone()),
            filter: TemporalFilter::new(config.filter.clone(), layout),
            focus: FocusStateMachine::new(config.focus.clone(), frame_interval),
            stats: SessionStats::default(),
            current_gaze: None,
            last_rejection: None,
            now: 0,
            layout,
            clock,
            config,
        }
    }

    /// Feed one frame of detector output, stamped by the tracker's clock.
    pub fn feed_landmarks(&mut self, face: Option<&FaceLandmarks>) -> FrameUpdate {
        let now = self.clock.tick();
        self.feed_landmarks_at(face, now)
    }

    /// Feed one frame of detector output with an external timestamp.
    pub fn feed_landmarks_at(
        &mut self,
        face: Option<&FaceLandmarks>,
        timestamp_ns: TimestampNs,
    ) -> FrameUpdate {
        let sample = match normalize_iris(face, &self.config.iris) {
            Ok(sample) => {
                self.last_rejection = None;
                Some(sample)
            }
            Err(rejection) => {
                tracing::trace!(?rejection, "No usable iris sample");
                self.last_rejection = Some(rejection);
                None
            }
        };
        self.process(sample, timestamp_ns)
    }

    /// Feed one already-normalized sample, stamped by the tracker's clock.
    pub fn feed_iris_sample(&mut self, sample: Option<IrisSample>) -> FrameUpdate {
        let now = self.clock.tick();
        self.feed_iris_sample_at(sample, now)
    }

    /// Feed one already-normalized sample with an external timestamp.
    pub fn feed_iris_sample_at(
        &mut self,
        sample: Option<IrisSample>,
        timestamp_ns: TimestampNs,
    ) -> FrameUpdate {
        self.last_rejection = None;
        self.process(sample, timestamp_ns)
    }

    fn process(&mut self, sample: Option<IrisSample>, timestamp_ns: TimestampNs) -> FrameUpdate {
        self.now = timestamp_ns.max(self.now);
        self.stats.record_frame(sample.is_some());

        if !self.calibration.is_complete() {
            self.current_gaze = None;
            let step = self.calibration.feed(sample);
            if step == CalibrationStep::Completed {
                self.stats.calibrations_completed += 1;
            }
            return FrameUpdate::Calibration(step);
        }

        self.current_gaze = sample.and_then(|sample| {
            match self.mapper.map(self.calibration.profile(), sample) {
                Ok(raw) => Some(self.filter.push(raw)),
                Err(e) => {
                    tracing::warn!(error = %e, "Gaze mapping failed");
                    None
                }
            }
        });
        FrameUpdate::Gaze(self.current_gaze)
    }

    /// Run the focus state machine for the current frame.
    ///
    /// Without a gaze this frame (calibrating or no sample) the focus
    /// machine takes its tracking-loss path.
    pub fn update_focus(&mut self, target: Point2D, threshold: f64) -> FocusEvent {
        let event = self
            .focus
            .update(self.current_gaze, target, threshold, self.now);
        self.stats.record_event(event, self.config.focus.point_reward);
        event
    }

    /// Discard the calibration and all gaze history. Session stats survive.
    pub fn request_recalibration(&mut self) {
        tracing::info!(
            captured = self.calibration.profile().captured_count(),
            "Recalibration requested"
        );
        self.calibration.reset();
        self.filter.reset();
        self.focus.reset();
        self.current_gaze = None;
    }

    pub fn is_calibrating(&self) -> bool {
        !self.calibration.is_complete()
    }

    pub fn calibration_progress(&self) -> CalibrationProgress {
        self.calibration.progress()
    }

    pub fn calibration_profile(&self) -> &CalibrationProfile {
        self.calibration.profile()
    }

    /// Smoothed gaze for the current frame.
    pub fn current_gaze(&self) -> Option<Point2D> {
        self.current_gaze
    }

    /// Why the last landmark frame produced no sample, if it didn't.
    pub fn last_rejection(&self) -> Option<SampleRejection> {
        self.last_rejection
    }

    pub fn focus_state(&self) -> &FocusState {
        self.focus.state()
    }

    pub fn focus_phase(&self) -> FocusPhase {
        self.focus.phase()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Timestamp of the most recent frame.
    pub fn now_ns(&self) -> TimestampNs {
        self.now
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn layout(&self) -> &ScreenLayout {
        &self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibrated() -> GazeTracker {
        let mut tracker = GazeTracker::with_defaults();
        let anchors = [
            IrisSample::new(0.5, 0.5),
            IrisSample::new(0.35, 0.5),
            IrisSample::new(0.65, 0.5),
            IrisSample::new(0.5, 0.35),
            IrisSample::new(0.5, 0.65),
        ];
        for sample in anchors {
            for _ in 0..60 {
                tracker.feed_iris_sample(Some(sample));
            }
        }
        tracker
    }

    #[test]
    fn test_gaze_unavailable_while_calibrating() {
        let mut tracker = GazeTracker::with_defaults();
        assert!(tracker.is_calibrating());
        let update = tracker.feed_iris_sample(Some(IrisSample::new(0.5, 0.5)));
        assert_eq!(update, FrameUpdate::Calibration(CalibrationStep::Holding));
        assert_eq!(tracker.current_gaze(), None);
    }

    #[test]
    fn test_calibration_completes_after_five_holds() {
        let tracker = calibrated();
        assert!(!tracker.is_calibrating());
        assert_eq!(tracker.stats().calibrations_completed, 1);
        assert_eq!(tracker.calibration_progress().current_anchor, None);
        assert_eq!(tracker.stats().frames, 300);
    }

    #[test]
    fn test_gaze_follows_sample_after_calibration() {
        let mut tracker = calibrated();
        for _ in 0..300 {
            tracker.feed_iris_sample(Some(IrisSample::new(0.35, 0.5)));
        }
        let gaze = tracker.current_gaze().unwrap();
        assert!(gaze.distance_to(&Point2D::new(200.0, 360.0)) < 1e-3);
    }

    #[test]
    fn test_missing_sample_clears_current_gaze() {
        let mut tracker = calibrated();
        tracker.feed_iris_sample(Some(IrisSample::new(0.5, 0.5)));
        assert!(tracker.current_gaze().is_some());
        assert_eq!(tracker.feed_iris_sample(None), FrameUpdate::Gaze(None));
        assert_eq!(tracker.current_gaze(), None);
    }

    #[test]
    fn test_missing_face_records_rejection() {
        let mut tracker = GazeTracker::with_defaults();
        tracker.feed_landmarks(None);
        assert_eq!(
            tracker.last_rejection(),
            Some(SampleRejection::DetectionAbsent)
        );
        assert_eq!(tracker.stats().frames_without_sample, 1);
    }

    #[test]
    fn test_focus_success_scores_points() {
        let mut tracker = calibrated();
        let target = Point2D::new(640.0, 360.0);
        let mut successes = 0;
        for _ in 0..31 {
            tracker.feed_iris_sample(Some(IrisSample::new(0.5, 0.5)));
            if tracker.update_focus(target, 100.0).is_success() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(tracker.stats().score, 5);
        assert_eq!(tracker.focus_phase(), FocusPhase::Idle);
    }

    #[test]
    fn test_recalibration_clears_state_but_keeps_stats() {
        let mut tracker = calibrated();
        let target = Point2D::new(640.0, 360.0);
        for _ in 0..31 {
            tracker.feed_iris_sample(Some(IrisSample::new(0.5, 0.5)));
            tracker.update_focus(target, 100.0);
        }
        tracker.feed_iris_sample(Some(IrisSample::new(0.5, 0.5)));
        tracker.update_focus(target, 100.0);
        assert!(tracker.focus_state().is_focused);

        tracker.request_recalibration();
        assert!(tracker.is_calibrating());
        assert_eq!(tracker.calibration_profile().captured_count(), 0);
        assert_eq!(tracker.current_gaze(), None);
        assert_eq!(tracker.focus_state(), &FocusState::default());
        assert_eq!(tracker.stats().score, 5);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = AppConfig::default();
        config.frame_rate_hz = 0;
        assert!(GazeTracker::new(config, FrameClock::fixed(30)).is_err());
    }

    #[test]
    fn test_external_timestamps_never_go_backwards() {
        let mut tracker = GazeTracker::with_defaults();
        tracker.feed_iris_sample_at(None, 1_000);
        tracker.feed_iris_sample_at(None, 500);
        assert_eq!(tracker.now_ns(), 1_000);
    }
}
