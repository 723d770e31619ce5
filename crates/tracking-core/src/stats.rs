//! Session scoring and counters.

use std::collections::VecDeque;

use serde::Serialize;

use focustrain_gaze_model::focus::FocusEvent;

/// Number of successful focus durations retained.
pub const MAX_RECORDED_DURATIONS: usize = 100;

/// Running totals for one training session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub score: u32,
    pub successful_focuses: u32,
    /// Focus streaks long enough to report that were lost.
    pub lost_focuses: u32,
    /// Durations of the most recent successes (seconds).
    pub focus_durations: VecDeque<f64>,
    pub frames: u64,
    /// Frames where no usable iris sample was available.
    pub frames_without_sample: u64,
    pub calibrations_completed: u32,
}

impl SessionStats {
    pub fn record_event(&mut self, event: FocusEvent, point_reward: u32) {
        match event {
            FocusEvent::Success { duration } => {
                self.score = self.score.saturating_add(point_reward);
                self.successful_focuses += 1;
                if self.focus_durations.len() == MAX_RECORDED_DURATIONS {
                    self.focus_durations.pop_front();
                }
                self.focus_durations.push_back(duration);
            }
            FocusEvent::Lost { .. } => self.lost_focuses += 1,
            FocusEvent::None => {}
        }
    }

    pub fn record_frame(&mut self, had_sample: bool) {
        self.frames += 1;
        if !had_sample {
            self.frames_without_sample += 1;
        }
    }

    /// Mean of the retained success durations, `None` before the first one.
    pub fn average_focus_duration(&self) -> Option<f64> {
        if self.focus_durations.is_empty() {
            return None;
        }
        Some(self.focus_durations.iter().sum::<f64>() / self.focus_durations.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_adds_reward() {
        let mut stats = SessionStats::default();
        stats.record_event(FocusEvent::Success { duration: 1.0 }, 5);
        stats.record_event(FocusEvent::Success { duration: 1.2 }, 5);
        stats.record_event(FocusEvent::Lost { accumulated: 0.4 }, 5);
        stats.record_event(FocusEvent::None, 5);
        assert_eq!(stats.score, 10);
        assert_eq!(stats.successful_focuses, 2);
        assert_eq!(stats.lost_focuses, 1);
        assert!((stats.average_focus_duration().unwrap() - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_durations_are_bounded() {
        let mut stats = SessionStats::default();
        for i in 0..150 {
            stats.record_event(FocusEvent::Success { duration: i as f64 }, 5);
        }
        assert_eq!(stats.focus_durations.len(), MAX_RECORDED_DURATIONS);
        assert_eq!(stats.focus_durations.front(), Some(&50.0));
        assert_eq!(stats.successful_focuses, 150);
    }

    #[test]
    fn test_frame_counters() {
        let mut stats = SessionStats::default();
        stats.record_frame(true);
        stats.record_frame(false);
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.frames_without_sample, 1);
        assert_eq!(stats.average_focus_duration(), None);
    }
}
