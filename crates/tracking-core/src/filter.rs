//! Temporal smoothing of raw gaze estimates.
//!
//! Three stages per frame:
//!
//! 1. Linearly weighted average over the recent raw estimates (newest
//!    weighted highest), once enough samples are present.
//! 2. Per-axis jump limit relative to the previous smoothed point.
//! 3. Exponential smoothing toward the limited candidate.
//!
//! The result is kept a safety margin away from the screen edges.

use focustrain_common::config::{FilterConfig, GAZE_HISTORY_CAPACITY};
use focustrain_gaze_model::geometry::{Point2D, ScreenLayout};

use crate::ring::RingBuffer;

/// Weight of the oldest sample relative to the newest.
const OLDEST_WEIGHT: f64 = 0.5;

/// Gaze smoother with a fixed-capacity history.
#[derive(Debug, Clone)]
pub struct TemporalFilter {
    config: FilterConfig,
    layout: ScreenLayout,
    history: RingBuffer<Point2D, GAZE_HISTORY_CAPACITY>,
    /// Reference point for the jump limit and the EMA.
    previous: Point2D,
    smoothed: Option<Point2D>,
}

impl TemporalFilter {
    pub fn new(config: FilterConfig, layout: ScreenLayout) -> Self {
        Self {
            config,
            layout,
            history: RingBuffer::new(),
            previous: layout.center(),
            smoothed: None,
        }
    }

    /// Feed one raw estimate and return the new smoothed gaze.
    pub fn push(&mut self, raw: Point2D) -> Point2D {
        self.history.push(raw);

        let candidate = if self.history.len() >= self.config.min_samples_for_average {
            self.weighted_average().unwrap_or(raw)
        } else {
            raw
        };

        let max_jump = self.config.max_jump_px;
        let limited = Point2D::new(
            self.previous.x + (candidate.x - self.previous.x).clamp(-max_jump, max_jump),
            self.previous.y + (candidate.y - self.previous.y).clamp(-max_jump, max_jump),
        );

        let alpha = self.config.smoothing_factor;
        let eased = Point2D::new(
            self.previous.x + (limited.x - self.previous.x) * alpha,
            self.previous.y + (limited.y - self.previous.y) * alpha,
        );

        let smoothed = self
            .layout
            .clamp_inside(eased, self.config.safety_margin_px);
        self.previous = smoothed;
        self.smoothed = Some(smoothed);
        smoothed
    }

    /// Latest smoothed gaze, `None` until the first estimate or after reset.
    pub fn current(&self) -> Option<Point2D> {
        self.smoothed
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Drop the history and restart from the screen center.
    pub fn reset(&mut self) {
        self.history.clear();
        self.previous = self.layout.center();
        self.smoothed = None;
    }

    /// History average with weights rising linearly from oldest to newest.
    fn weighted_average(&self) -> Option<Point2D> {
        let n = self.history.len();
        if n == 0 {
            return None;
        }
        let step = if n > 1 {
            (1.0 - OLDEST_WEIGHT) / (n - 1) as f64
        } else {
            0.0
        };
        let (total, sum_x, sum_y) = self.history.iter().enumerate().fold(
            (0.0, 0.0, 0.0),
            |(total, sx, sy), (i, p)| {
                let w = OLDEST_WEIGHT + step * i as f64;
                (total + w, sx + w * p.x, sy + w * p.y)
            },
        );
        Some(Point2D::new(sum_x / total, sum_y / total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> TemporalFilter {
        TemporalFilter::new(FilterConfig::default(), ScreenLayout::default())
    }

    #[test]
    fn test_starts_from_screen_center() {
        let mut f = filter();
        assert_eq!(f.current(), None);
        let out = f.push(Point2D::new(700.0, 360.0));
        // One EMA step from the center.
        assert!((out.x - (640.0 + 60.0 * 0.22)).abs() < 1e-9);
        assert!((out.y - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_input_converges() {
        let mut f = filter();
        let target = Point2D::new(900.0, 200.0);
        let mut out = Point2D::default();
        for _ in 0..200 {
            out = f.push(target);
        }
        assert!(out.distance_to(&target) < 1e-3);
    }

    #[test]
    fn test_outlier_effect_bounded_by_jump_limit() {
        let mut f = filter();
        let steady = Point2D::new(640.0, 360.0);
        for _ in 0..50 {
            f.push(steady);
        }
        let before = f.current().unwrap();
        let after = f.push(Point2D::new(5000.0, -5000.0));
        let config = FilterConfig::default();
        let bound = config.max_jump_px * config.smoothing_factor + 1e-9;
        assert!((after.x - before.x).abs() <= bound);
        assert!((after.y - before.y).abs() <= bound);
    }

    #[test]
    fn test_output_respects_safety_margin() {
        let mut f = filter();
        for _ in 0..200 {
            f.push(Point2D::new(-400.0, 2000.0));
        }
        let out = f.current().unwrap();
        assert!((out.x - 50.0).abs() < 1e-9);
        assert!((out.y - 670.0).abs() < 1e-9);
    }

    #[test]
    fn test_weights_favor_newest() {
        let mut f = filter();
        f.push(Point2D::new(0.0, 0.0));
        f.push(Point2D::new(0.0, 0.0));
        f.push(Point2D::new(300.0, 300.0));
        // Weights 0.5, 0.75, 1.0 over 2.25.
        let avg = f.weighted_average().unwrap();
        assert!((avg.x - 300.0 / 2.25).abs() < 1e-9);
    }

    #[test]
    fn test_reset() {
        let mut f = filter();
        f.push(Point2D::new(100.0, 100.0));
        f.reset();
        assert_eq!(f.current(), None);
        assert_eq!(f.history_len(), 0);
        let out = f.push(Point2D::new(640.0, 360.0));
        assert_eq!(out, Point2D::new(640.0, 360.0));
    }
}
