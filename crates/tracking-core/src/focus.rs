//! Focus detection with a loss-grace window.
//!
//! Smoothed gaze still jitters around the threshold, so leaving the target
//! does not end a focus streak immediately. The streak survives for
//! `loss_tolerance_secs`, during which the accumulated duration decays.
//! Only a sustained departure (or sustained tracking loss) resets it.

use focustrain_common::clock::{elapsed_secs, TimestampNs};
use focustrain_common::config::FocusConfig;
use focustrain_gaze_model::focus::{FocusEvent, FocusPhase};
use focustrain_gaze_model::geometry::Point2D;

/// Mutable focus state, zeroed on success and on sustained loss.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FocusState {
    pub is_focused: bool,
    pub focus_start: Option<TimestampNs>,
    /// Seconds of continuous focus so far.
    pub accumulated_duration: f64,
    /// When the current interruption began.
    pub loss_start: Option<TimestampNs>,
}

impl FocusState {
    pub fn phase(&self) -> FocusPhase {
        match (self.is_focused, self.loss_start) {
            (false, _) => FocusPhase::Idle,
            (true, None) => FocusPhase::Focused,
            (true, Some(_)) => FocusPhase::FocusedGrace,
        }
    }
}

/// Per-frame focus state machine.
#[derive(Debug, Clone)]
pub struct FocusStateMachine {
    config: FocusConfig,
    frame_interval_secs: f64,
    state: FocusState,
}

impl FocusStateMachine {
    pub fn new(config: FocusConfig, frame_interval_secs: f64) -> Self {
        Self {
            config,
            frame_interval_secs,
            state: FocusState::default(),
        }
    }

    /// Advance one frame.
    ///
    /// `gaze` is `None` when tracking is invalid this frame. `threshold` is
    /// the largest gaze-to-target distance (pixels) counted as focused.
    pub fn update(
        &mut self,
        gaze: Option<Point2D>,
        target: Point2D,
        threshold: f64,
        now: TimestampNs,
    ) -> FocusEvent {
        let Some(gaze) = gaze else {
            self.on_tracking_invalid(now);
            return FocusEvent::None;
        };

        if gaze.distance_to(&target) < threshold {
            self.on_inside(now)
        } else {
            self.on_outside(now)
        }
    }

    pub fn state(&self) -> &FocusState {
        &self.state
    }

    pub fn phase(&self) -> FocusPhase {
        self.state.phase()
    }

    pub fn reset(&mut self) {
        self.state = FocusState::default();
    }

    /// Grace timer runs, accumulated duration is left alone.
    fn on_tracking_invalid(&mut self, now: TimestampNs) {
        if self.state.is_focused && self.state.loss_start.is_none() {
            self.state.loss_start = Some(now);
        }
        if let Some(loss_start) = self.state.loss_start {
            if elapsed_secs(loss_start, now) > self.config.loss_tolerance_secs {
                tracing::debug!(
                    accumulated = self.state.accumulated_duration,
                    "Focus reset after tracking loss"
                );
                self.reset();
            }
        }
    }

    fn on_inside(&mut self, now: TimestampNs) -> FocusEvent {
        self.state.loss_start = None;

        let Some(start) = self.state.focus_start.filter(|_| self.state.is_focused) else {
            self.state.is_focused = true;
            self.state.focus_start = Some(now);
            self.state.accumulated_duration = 0.0;
            return FocusEvent::None;
        };

        self.state.accumulated_duration = elapsed_secs(start, now);
        if self.state.accumulated_duration >= self.config.required_secs {
            let duration = self.state.accumulated_duration;
            tracing::info!(duration, "Focus success");
            self.reset();
            return FocusEvent::Success { duration };
        }
        FocusEvent::None
    }

    fn on_outside(&mut self, now: TimestampNs) -> FocusEvent {
        if !self.state.is_focused {
            return FocusEvent::None;
        }

        let Some(loss_start) = self.state.loss_start else {
            self.state.loss_start = Some(now);
            return FocusEvent::None;
        };

        if elapsed_secs(loss_start, now) > self.config.loss_tolerance_secs {
            let accumulated = self.state.accumulated_duration;
            self.reset();
            if accumulated > self.config.lost_notice_min_secs {
                tracing::info!(accumulated, "Focus lost");
                return FocusEvent::Lost { accumulated };
            }
            return FocusEvent::None;
        }

        let decay = self.config.decay_rate_per_sec * self.frame_interval_secs;
        self.state.accumulated_duration = (self.state.accumulated_duration - decay).max(0.0);
        FocusEvent::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focustrain_common::clock::FrameClock;

    const FPS: u32 = 30;

    struct Harness {
        machine: FocusStateMachine,
        clock: FrameClock,
        target: Point2D,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                machine: FocusStateMachine::new(FocusConfig::default(), 1.0 / FPS as f64),
                clock: FrameClock::fixed(FPS),
                target: Point2D::new(640.0, 360.0),
            }
        }

        fn frame(&mut self, gaze: Option<Point2D>) -> FocusEvent {
            let now = self.clock.tick();
            self.machine.update(gaze, self.target, 100.0, now)
        }

        fn on_target(&mut self) -> FocusEvent {
            self.frame(Some(Point2D::new(660.0, 370.0)))
        }

        fn off_target(&mut self) -> FocusEvent {
            self.frame(Some(Point2D::new(900.0, 360.0)))
        }
    }

    #[test]
    fn test_exactly_one_success_after_required_time() {
        let mut h = Harness::new();
        // One frame to enter focus plus one second of frames.
        let events: Vec<_> = (0..=FPS).map(|_| h.on_target()).collect();
        let successes: Vec<_> = events.iter().filter(|e| e.is_success()).collect();
        assert_eq!(successes.len(), 1);
        assert!(events.last().unwrap().is_success());
        assert_eq!(h.machine.phase(), FocusPhase::Idle);
        assert_eq!(h.machine.state(), &FocusState::default());
    }

    #[test]
    fn test_success_reports_duration() {
        let mut h = Harness::new();
        let event = (0..=FPS).map(|_| h.on_target()).last().unwrap();
        match event {
            FocusEvent::Success { duration } => assert!((duration - 1.0).abs() < 1e-9),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn test_short_departure_only_decays() {
        let mut h = Harness::new();
        for _ in 0..16 {
            h.on_target();
        }
        let before = h.machine.state().accumulated_duration;
        assert!((before - 0.5).abs() < 1e-9);

        // First frame outside starts the grace timer.
        h.off_target();
        assert_eq!(h.machine.phase(), FocusPhase::FocusedGrace);
        for _ in 0..10 {
            assert_eq!(h.off_target(), FocusEvent::None);
        }
        let after = h.machine.state().accumulated_duration;
        assert!(after > 0.0);
        assert!(after < before);
        assert!((after - (before - 10.0 * 0.3 / 30.0)).abs() < 1e-9);
        assert!(h.machine.state().is_focused);
    }

    #[test]
    fn test_sustained_departure_emits_lost_and_resets() {
        let mut h = Harness::new();
        for _ in 0..25 {
            h.on_target();
        }
        let mut events = vec![];
        for _ in 0..20 {
            events.push(h.off_target());
        }
        let lost: Vec<_> = events.iter().filter(|e| e.is_lost()).collect();
        assert_eq!(lost.len(), 1);
        assert_eq!(h.machine.state(), &FocusState::default());
    }

    #[test]
    fn test_short_streak_is_reset_silently() {
        let mut h = Harness::new();
        for _ in 0..5 {
            h.on_target();
        }
        let events: Vec<_> = (0..20).map(|_| h.off_target()).collect();
        assert!(events.iter().all(|e| *e == FocusEvent::None));
        assert_eq!(h.machine.phase(), FocusPhase::Idle);
    }

    #[test]
    fn test_tracking_loss_does_not_decay() {
        let mut h = Harness::new();
        for _ in 0..16 {
            h.on_target();
        }
        let before = h.machine.state().accumulated_duration;
        for _ in 0..10 {
            assert_eq!(h.frame(None), FocusEvent::None);
        }
        assert_eq!(h.machine.state().accumulated_duration, before);
        assert_eq!(h.machine.phase(), FocusPhase::FocusedGrace);
    }

    #[test]
    fn test_sustained_tracking_loss_resets_without_event() {
        let mut h = Harness::new();
        for _ in 0..25 {
            h.on_target();
        }
        let events: Vec<_> = (0..20).map(|_| h.frame(None)).collect();
        assert!(events.iter().all(|e| *e == FocusEvent::None));
        assert_eq!(h.machine.state(), &FocusState::default());
    }

    #[test]
    fn test_returning_to_target_clears_grace() {
        let mut h = Harness::new();
        for _ in 0..10 {
            h.on_target();
        }
        h.off_target();
        h.off_target();
        h.on_target();
        assert_eq!(h.machine.phase(), FocusPhase::Focused);
        assert!(h.machine.state().loss_start.is_none());
    }

    #[test]
    fn test_idle_outside_does_nothing() {
        let mut h = Harness::new();
        for _ in 0..50 {
            assert_eq!(h.off_target(), FocusEvent::None);
        }
        assert_eq!(h.machine.state(), &FocusState::default());
    }
}
