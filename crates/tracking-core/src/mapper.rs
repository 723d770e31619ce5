//! Iris-space to screen-space mapping.
//!
//! Each axis is mapped piecewise-linearly through the center anchor: a
//! negative offset is scaled by the center-to-left (or center-to-top)
//! distance, a positive one by the center-to-right (or center-to-bottom)
//! distance. A normalized offset of ±1 lands on the edge anchor.

use focustrain_common::config::MappingConfig;
use focustrain_common::error::{FocusTrainError, FocusTrainResult};
use focustrain_gaze_model::calibration::{AnchorPoint, CalibrationProfile};
use focustrain_gaze_model::geometry::Point2D;
use focustrain_gaze_model::landmarks::IrisSample;

/// Maps live iris samples onto the screen using a complete profile.
#[derive(Debug, Clone)]
pub struct GazeMapper {
    config: MappingConfig,
}

impl GazeMapper {
    pub fn new(config: MappingConfig) -> Self {
        Self { config }
    }

    /// Raw gaze estimate for one sample.
    ///
    /// Fails with `CalibrationIncomplete` unless all five anchors are
    /// captured.
    pub fn map(&self, profile: &CalibrationProfile, sample: IrisSample) -> FocusTrainResult<Point2D> {
        let iris = |point| {
            profile
                .iris(point)
                .ok_or_else(|| FocusTrainError::calibration_incomplete(profile.captured_count()))
        };
        if !profile.is_complete() {
            return Err(FocusTrainError::calibration_incomplete(
                profile.captured_count(),
            ));
        }

        let center = iris(AnchorPoint::Center)?;
        let left = iris(AnchorPoint::Left)?;
        let right = iris(AnchorPoint::Right)?;
        let top = iris(AnchorPoint::Top)?;
        let bottom = iris(AnchorPoint::Bottom)?;

        let dx = sample.x - center.x;
        let dy = sample.y - center.y;

        let range_x = if dx < 0.0 {
            (center.x - left.x).abs()
        } else {
            (right.x - center.x).abs()
        };
        let range_y = if dy < 0.0 {
            (center.y - top.y).abs()
        } else {
            (bottom.y - center.y).abs()
        };

        let norm_x = self.normalize(dx, range_x, self.config.gain_x);
        let norm_y = self.normalize(dy, range_y, self.config.gain_y);

        let layout = profile.layout();
        let screen_center = layout.center();
        Ok(Point2D::new(
            screen_center.x + norm_x * layout.reach_x(),
            screen_center.y + norm_y * layout.reach_y(),
        ))
    }

    /// Offset in calibrated half-ranges, bounded before and after gain.
    fn normalize(&self, offset: f64, range: f64, gain: f64) -> f64 {
        let range = if range < self.config.min_axis_range {
            tracing::trace!(range, "Degenerate calibration range, using floor");
            self.config.degenerate_range_floor
        } else {
            range
        };
        let limit = self.config.max_normalized_offset;
        let norm = (offset / range).clamp(-limit, limit);
        (norm * gain).clamp(-limit, limit)
    }
}

impl Default for GazeMapper {
    fn default() -> Self {
        Self::new(MappingConfig::default())
    }
}
