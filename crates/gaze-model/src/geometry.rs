//! Screen-space geometry.
//!
//! Screen coordinates are in pixels with `(0, 0)` at the top-left corner.

use serde::{Deserialize, Serialize};

use focustrain_common::config::ScreenConfig;

use crate::calibration::AnchorPoint;

/// A point in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Screen size plus the inset at which edge anchors are placed.
///
/// The edge margins double as the mapping extent: a normalized offset of
/// ±1 lands exactly on the corresponding edge anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenLayout {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Left/right anchor distance from the screen edge.
    pub edge_margin_x: f64,
    /// Top/bottom anchor distance from the screen edge.
    pub edge_margin_y: f64,
}

impl ScreenLayout {
    pub fn new(width: f64, height: f64, edge_margin_x: f64, edge_margin_y: f64) -> Self {
        Self {
            width,
            height,
            edge_margin_x,
            edge_margin_y,
        }
    }

    /// Screen center.
    pub fn center(&self) -> Point2D {
        Point2D::new(self.width / 2.0, self.height / 2.0)
    }

    /// Horizontal pixel span covered by a normalized offset of 1.
    pub fn reach_x(&self) -> f64 {
        self.width / 2.0 - self.edge_margin_x
    }

    /// Vertical pixel span covered by a normalized offset of 1.
    pub fn reach_y(&self) -> f64 {
        self.height / 2.0 - self.edge_margin_y
    }

    /// Screen position of a calibration anchor.
    pub fn anchor_position(&self, anchor: AnchorPoint) -> Point2D {
        let c = self.center();
        match anchor {
            AnchorPoint::Center => c,
            AnchorPoint::Left => Point2D::new(c.x - self.reach_x(), c.y),
            AnchorPoint::Right => Point2D::new(c.x + self.reach_x(), c.y),
            AnchorPoint::Top => Point2D::new(c.x, c.y - self.reach_y()),
            AnchorPoint::Bottom => Point2D::new(c.x, c.y + self.reach_y()),
        }
    }

    /// Clamp a point so it stays at least `margin` pixels inside the screen.
    pub fn clamp_inside(&self, point: Point2D, margin: f64) -> Point2D {
        let max_x = (self.width - margin).max(margin);
        let max_y = (self.height - margin).max(margin);
        Point2D::new(point.x.clamp(margin, max_x), point.y.clamp(margin, max_y))
    }

    /// Check whether a point lies on the screen.
    pub fn contains(&self, point: Point2D) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

impl From<&ScreenConfig> for ScreenLayout {
    fn from(config: &ScreenConfig) -> Self {
        Self::new(
            config.width as f64,
            config.height as f64,
            config.edge_margin_x,
            config.edge_margin_y,
        )
    }
}

impl Default for ScreenLayout {
    fn default() -> Self {
        Self::from(&ScreenConfig::default())
    }
}
