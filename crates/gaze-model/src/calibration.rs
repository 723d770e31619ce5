//! Calibration anchors and the five-point calibration profile.
//!
//! A profile is filled strictly in `AnchorPoint::ORDER`. Center comes
//! first because both axes are measured relative to it. The only way to
//! fill an anchor is `capture_next`, so a profile is always empty,
//! partially filled, or complete with all five anchors set.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point2D, ScreenLayout};
use crate::landmarks::IrisSample;

/// One of the five calibration reference points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorPoint {
    Center,
    Left,
    Right,
    Top,
    Bottom,
}

impl AnchorPoint {
    /// Capture order.
    pub const ORDER: [AnchorPoint; 5] = [
        AnchorPoint::Center,
        AnchorPoint::Left,
        AnchorPoint::Right,
        AnchorPoint::Top,
        AnchorPoint::Bottom,
    ];

    /// Position in the capture order.
    pub fn index(self) -> usize {
        match self {
            AnchorPoint::Center => 0,
            AnchorPoint::Left => 1,
            AnchorPoint::Right => 2,
            AnchorPoint::Top => 3,
            AnchorPoint::Bottom => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AnchorPoint::Center => "center",
            AnchorPoint::Left => "left",
            AnchorPoint::Right => "right",
            AnchorPoint::Top => "top",
            AnchorPoint::Bottom => "bottom",
        }
    }
}

impl std::fmt::Display for AnchorPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A calibration anchor: fixed screen target plus the iris position
/// recorded while the user looked at it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationAnchor {
    pub point: AnchorPoint,
    pub screen: Point2D,
    iris: Option<IrisSample>,
}

impl CalibrationAnchor {
    /// Recorded iris position, if captured.
    pub fn iris(&self) -> Option<IrisSample> {
        self.iris
    }

    pub fn is_captured(&self) -> bool {
        self.iris.is_some()
    }
}

/// The five anchors of one calibration session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationProfile {
    layout: ScreenLayout,
    anchors: [CalibrationAnchor; 5],
    captured: usize,
    complete: bool,
}

impl CalibrationProfile {
    /// Empty profile with anchor targets placed on `layout`.
    pub fn new(layout: ScreenLayout) -> Self {
        let anchors = AnchorPoint::ORDER.map(|point| CalibrationAnchor {
            point,
            screen: layout.anchor_position(point),
            iris: None,
        });
        Self {
            layout,
            anchors,
            captured: 0,
            complete: false,
        }
    }

    /// Complete profile from iris positions given in `AnchorPoint::ORDER`.
    pub fn from_captures(layout: ScreenLayout, iris: [IrisSample; 5]) -> Self {
        let mut profile = Self::new(layout);
        for sample in iris {
            profile.capture_next(sample);
        }
        profile
    }

    /// Record `sample` for the next uncaptured anchor.
    ///
    /// Returns the anchor that was filled, or `None` if the profile was
    /// already complete.
    pub fn capture_next(&mut self, sample: IrisSample) -> Option<AnchorPoint> {
        let anchor = self.anchors.get_mut(self.captured)?;
        anchor.iris = Some(sample);
        let point = anchor.point;
        self.captured += 1;
        self.complete = self.captured == self.anchors.len();
        Some(point)
    }

    /// Drop all captured iris positions.
    pub fn clear(&mut self) {
        for anchor in &mut self.anchors {
            anchor.iris = None;
        }
        self.captured = 0;
        self.complete = false;
    }

    /// Anchor awaiting capture, `None` once complete.
    pub fn next_anchor(&self) -> Option<AnchorPoint> {
        self.anchors.get(self.captured).map(|a| a.point)
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn captured_count(&self) -> usize {
        self.captured
    }

    pub fn anchor(&self, point: AnchorPoint) -> &CalibrationAnchor {
        &self.anchors[point.index()]
    }

    pub fn anchors(&self) -> &[CalibrationAnchor; 5] {
        &self.anchors
    }

    /// Recorded iris position for `point`, if captured.
    pub fn iris(&self, point: AnchorPoint) -> Option<IrisSample> {
        self.anchor(point).iris
    }

    pub fn layout(&self) -> &ScreenLayout {
        &self.layout
    }
}
