//! Guided five-point calibration.
//!
//! # Algorithm
//!
//! For the anchor being captured, once per frame:
//!
//! 1. **No sample:** decay the hold timer by the lost penalty and wait.
//! 2. **Sample:** push it into the stability history.
//! 3. **Stability:** per-axis range over the last `stability_window`
//!    samples must stay within `stability_threshold`. An unstable frame
//!    decays the hold timer instead of zeroing it, so brief jitter costs
//!    little progress.
//! 4. **Hold:** a stable frame adds one frame interval to the hold timer.
//!    Once it reaches `hold_time_secs`, the mean of the stability window
//!    becomes the anchor's iris position and the next anchor starts fresh.
//!
//! Anchors are captured in the fixed order center, left, right, top,
//! bottom; the controller offers no way to target a specific anchor.

use focustrain_common::config::{CalibrationConfig, CALIBRATION_HISTORY_CAPACITY};
use focustrain_gaze_model::calibration::{AnchorPoint, CalibrationProfile};
use focustrain_gaze_model::geometry::ScreenLayout;
use focustrain_gaze_model::landmarks::IrisSample;

use crate::ring::RingBuffer;

/// Slack for comparing accumulated frame intervals against the hold time.
const HOLD_TOLERANCE_SECS: f64 = 1e-9;

/// What a calibration frame did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationStep {
    /// No usable sample; hold timer decayed.
    Waiting,
    /// Sample too far from its neighbours; hold timer decayed.
    Unstable,
    /// Stable sample; hold timer advanced.
    Holding,
    /// An anchor was captured and the next one is pending.
    Captured(AnchorPoint),
    /// The last anchor was captured; the profile is complete.
    Completed,
    /// The profile was already complete; nothing changed.
    AlreadyComplete,
}

/// Calibration progress for UI feedback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationProgress {
    /// Anchor being captured, `None` once complete.
    pub current_anchor: Option<AnchorPoint>,
    /// Hold timer as a fraction of the required hold time, in `[0, 1]`.
    pub hold_fraction: f64,
    /// Number of anchors captured so far.
    pub captured: usize,
}

/// Drives a `CalibrationProfile` from per-frame iris samples.
#[derive(Debug, Clone)]
pub struct CalibrationController {
    config: CalibrationConfig,
    frame_interval_secs: f64,
    profile: CalibrationProfile,
    history: RingBuffer<IrisSample, CALIBRATION_HISTORY_CAPACITY>,
    hold_secs: f64,
}

impl CalibrationController {
    pub fn new(config: CalibrationConfig, layout: ScreenLayout, frame_interval_secs: f64) -> Self {
        Self {
            config,
            frame_interval_secs,
            profile: CalibrationProfile::new(layout),
            history: RingBuffer::new(),
            hold_secs: 0.0,
        }
    }

    /// Process one frame.
    pub fn feed(&mut self, sample: Option<IrisSample>) -> CalibrationStep {
        if self.profile.is_complete() {
            return CalibrationStep::AlreadyComplete;
        }

        let Some(sample) = sample else {
            self.decay(self.config.lost_penalty_secs);
            return CalibrationStep::Waiting;
        };

        self.history.push(sample);

        if !self.is_stable() {
            self.decay(self.config.unstable_penalty_secs);
            return CalibrationStep::Unstable;
        }

        self.hold_secs += self.frame_interval_secs;
        if self.hold_secs + HOLD_TOLERANCE_SECS < self.config.hold_time_secs {
            return CalibrationStep::Holding;
        }

        let Some(mean) = IrisSample::mean(self.history.recent(self.config.stability_window))
        else {
            return CalibrationStep::Holding;
        };
        let Some(anchor) = self.profile.capture_next(mean) else {
            return CalibrationStep::AlreadyComplete;
        };

        self.history.clear();
        self.hold_secs = 0.0;

        tracing::info!(
            anchor = %anchor,
            iris_x = mean.x,
            iris_y = mean.y,
            captured = self.profile.captured_count(),
            "Calibration anchor captured"
        );

        if self.profile.is_complete() {
            tracing::info!("Calibration complete");
            CalibrationStep::Completed
        } else {
            CalibrationStep::Captured(anchor)
        }
    }

    /// Whether the recent samples are steady enough to accumulate hold time.
    ///
    /// A history shorter than the window counts as stable.
    pub fn is_stable(&self) -> bool {
        let window = self.config.stability_window;
        if self.history.len() < window {
            return true;
        }
        let (min_x, max_x, min_y, max_y) = self.history.recent(window).fold(
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(lo_x, hi_x, lo_y, hi_y), s| (lo_x.min(s.x), hi_x.max(s.x), lo_y.min(s.y), hi_y.max(s.y)),
        );
        max_x - min_x <= self.config.stability_threshold
            && max_y - min_y <= self.config.stability_threshold
    }

    /// Start over from the center anchor.
    pub fn reset(&mut self) {
        self.profile.clear();
        self.history.clear();
        self.hold_secs = 0.0;
    }

    pub fn is_complete(&self) -> bool {
        self.profile.is_complete()
    }

    pub fn profile(&self) -> &CalibrationProfile {
        &self.profile
    }

    pub fn hold_secs(&self) -> f64 {
        self.hold_secs
    }

    pub fn progress(&self) -> CalibrationProgress {
        CalibrationProgress {
            current_anchor: self.profile.next_anchor(),
            hold_fraction: (self.hold_secs / self.config.hold_time_secs).clamp(0.0, 1.0),
            captured: self.profile.captured_count(),
        }
    }

    fn decay(&mut self, penalty_secs: f64) {
        self.hold_secs = (self.hold_secs - penalty_secs).max(0.0);
    }
}
