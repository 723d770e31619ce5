//! Synthetic viewer and moving target for camera-free sessions.

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use focustrain_gaze_model::geometry::{Point2D, ScreenLayout};
use focustrain_gaze_model::landmarks::{EyeLandmarks, FaceLandmarks, ImagePoint, LandmarkSource};

/// Target radius in pixels; the target bounces when its edge hits a wall.
pub const TARGET_RADIUS: f64 = 45.0;

/// Per-axis speeds (pixels per frame) a target can be given.
pub const TARGET_SPEEDS: [f64; 6] = [-5.0, -4.0, -3.0, 3.0, 4.0, 5.0];

/// Extra distance from the walls when a target is relocated.
pub const RELOCATION_MARGIN: f64 = 150.0;

const EYE_WIDTH: f64 = 0.06;
const EYE_HEIGHT: f64 = 0.02;
const CLOSED_EYE_HEIGHT: f64 = 0.001;
const EYE_LEVEL: f64 = 0.45;
const LEFT_EYE_X: f64 = 0.42;
const RIGHT_EYE_X: f64 = 0.58;

/// A target moving at constant speed and bouncing off the screen edges.
#[derive(Debug, Clone)]
pub struct BouncingTarget {
    layout: ScreenLayout,
    position: Point2D,
    velocity: Point2D,
    rng: StdRng,
}

impl BouncingTarget {
    /// Target at the screen center with a random velocity.
    pub fn new(layout: ScreenLayout, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let velocity = random_velocity(&mut rng);
        Self {
            position: layout.center(),
            layout,
            velocity,
            rng,
        }
    }

    /// Move one frame.
    pub fn advance(&mut self) {
        let max_x = self.layout.width - TARGET_RADIUS;
        let max_y = self.layout.height - TARGET_RADIUS;

        self.position.x += self.velocity.x;
        self.position.y += self.velocity.y;

        if self.position.x <= TARGET_RADIUS || self.position.x >= max_x {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y <= TARGET_RADIUS || self.position.y >= max_y {
            self.velocity.y = -self.velocity.y;
        }
        self.position.x = self.position.x.clamp(TARGET_RADIUS, max_x.max(TARGET_RADIUS));
        self.position.y = self.position.y.clamp(TARGET_RADIUS, max_y.max(TARGET_RADIUS));
    }

    /// Jump to a random spot away from the edges with a new velocity.
    pub fn relocate(&mut self) {
        let inset = TARGET_RADIUS + RELOCATION_MARGIN;
        let center = self.layout.center();
        let x = random_between(&mut self.rng, inset, self.layout.width - inset, center.x);
        let y = random_between(&mut self.rng, inset, self.layout.height - inset, center.y);
        self.position = Point2D::new(x, y);
        self.velocity = random_velocity(&mut self.rng);
    }

    pub fn position(&self) -> Point2D {
        self.position
    }

    pub fn velocity(&self) -> Point2D {
        self.velocity
    }
}

fn random_velocity(rng: &mut StdRng) -> Point2D {
    let vx = TARGET_SPEEDS.choose(rng).copied().unwrap_or(TARGET_SPEEDS[0]);
    let vy = TARGET_SPEEDS.choose(rng).copied().unwrap_or(TARGET_SPEEDS[0]);
    Point2D::new(vx, vy)
}

/// Whole-pixel value in `[lo, hi]`, or `fallback` when the range is empty.
fn random_between(rng: &mut StdRng, lo: f64, hi: f64, fallback: f64) -> f64 {
    if lo > hi {
        return fallback;
    }
    rng.random_range(lo..=hi).round()
}

/// Behaviour of the simulated viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerParams {
    /// Pupil travel (fraction of the eye box) for a gaze at an edge anchor.
    pub eye_range: f64,
    /// Uniform jitter added to the pupil fraction on each axis.
    pub noise: f64,
    /// Probability that no face is detected in a frame.
    pub dropout: f64,
    /// Probability that the eyes are closed in a frame.
    pub blink: f64,
}

impl Default for ViewerParams {
    fn default() -> Self {
        Self {
            eye_range: 0.15,
            noise: 0.004,
            dropout: 0.02,
            blink: 0.01,
        }
    }
}

/// Landmark source imitating a person looking at a point on the screen.
///
/// The pupil moves linearly with the gaze: looking at an edge anchor
/// shifts it by `eye_range` from the middle of the eye box.
#[derive(Debug, Clone)]
pub struct SyntheticViewer {
    layout: ScreenLayout,
    params: ViewerParams,
    gaze: Point2D,
    rng: StdRng,
}

impl SyntheticViewer {
    pub fn new(layout: ScreenLayout, params: ViewerParams, seed: u64) -> Self {
        let params = ViewerParams {
            noise: params.noise.max(0.0),
            dropout: params.dropout.clamp(0.0, 1.0),
            blink: params.blink.clamp(0.0, 1.0),
            ..params
        };
        Self {
            gaze: layout.center(),
            layout,
            params,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Point the viewer's eyes at a screen position.
    pub fn look_at(&mut self, point: Point2D) {
        self.gaze = point;
    }

    /// Noise-free pupil fraction for the current gaze.
    pub fn pupil_fraction(&self) -> (f64, f64) {
        let center = self.layout.center();
        let reach_x = self.layout.reach_x().max(1.0);
        let reach_y = self.layout.reach_y().max(1.0);
        (
            0.5 + (self.gaze.x - center.x) / reach_x * self.params.eye_range,
            0.5 + (self.gaze.y - center.y) / reach_y * self.params.eye_range,
        )
    }

    fn jitter(&mut self) -> f64 {
        if self.params.noise > 0.0 {
            self.rng.random_range(-self.params.noise..=self.params.noise)
        } else {
            0.0
        }
    }
}

impl LandmarkSource for SyntheticViewer {
    fn get_eye_landmarks(&mut self) -> Option<FaceLandmarks> {
        if self.rng.random_bool(self.params.dropout) {
            return None;
        }
        let (fx, fy) = self.pupil_fraction();
        let fx = fx + self.jitter();
        let fy = fy + self.jitter();
        let height = if self.rng.random_bool(self.params.blink) {
            CLOSED_EYE_HEIGHT
        } else {
            EYE_HEIGHT
        };
        Some(FaceLandmarks {
            left_eye: synthetic_eye(LEFT_EYE_X, height, fx, fy, true),
            right_eye: synthetic_eye(RIGHT_EYE_X, height, fx, fy, false),
        })
    }
}

/// Eye box centered at `cx` with the pupil at fraction `(fx, fy)`.
///
/// A mirrored eye has its inner corner on the image-right side, as the
/// subject's left eye does in a camera image.
fn synthetic_eye(cx: f64, height: f64, fx: f64, fy: f64, mirrored: bool) -> EyeLandmarks {
    let left = cx - EYE_WIDTH / 2.0;
    let right = cx + EYE_WIDTH / 2.0;
    let (inner, outer) = if mirrored { (right, left) } else { (left, right) };
    let top = EYE_LEVEL - height / 2.0;
    EyeLandmarks {
        inner_corner: ImagePoint::new(inner, EYE_LEVEL),
        outer_corner: ImagePoint::new(outer, EYE_LEVEL),
        upper_lid: ImagePoint::new(cx, top),
        lower_lid: ImagePoint::new(cx, top + height),
        pupil_center: ImagePoint::new(left + fx * EYE_WIDTH, top + fy * height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focustrain_common::config::IrisConfig;
    use focustrain_gaze_model::calibration::AnchorPoint;
    use focustrain_tracking_core::normalize_iris;

    fn quiet() -> ViewerParams {
        ViewerParams {
            noise: 0.0,
            dropout: 0.0,
            blink: 0.0,
            ..ViewerParams::default()
        }
    }

    #[test]
    fn test_viewer_pupil_tracks_gaze() {
        let layout = ScreenLayout::default();
        let mut viewer = SyntheticViewer::new(layout, quiet(), 7);
        viewer.look_at(layout.anchor_position(AnchorPoint::Left));
        let face = viewer.get_eye_landmarks().unwrap();
        let sample = normalize_iris(Some(&face), &IrisConfig::default()).unwrap();
        assert!((sample.x - 0.35).abs() < 1e-9);
        assert!((sample.y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_full_dropout_yields_no_face() {
        let params = ViewerParams {
            dropout: 1.0,
            ..quiet()
        };
        let mut viewer = SyntheticViewer::new(ScreenLayout::default(), params, 1);
        assert!(viewer.get_eye_landmarks().is_none());
    }

    #[test]
    fn test_blink_is_rejected_by_normalizer() {
        let params = ViewerParams {
            blink: 1.0,
            ..quiet()
        };
        let mut viewer = SyntheticViewer::new(ScreenLayout::default(), params, 1);
        let face = viewer.get_eye_landmarks().unwrap();
        assert!(normalize_iris(Some(&face), &IrisConfig::default()).is_err());
    }

    #[test]
    fn test_target_stays_on_screen() {
        let layout = ScreenLayout::default();
        let mut target = BouncingTarget::new(layout, 3);
        for frame in 0..5000 {
            target.advance();
            if frame % 700 == 0 {
                target.relocate();
            }
            let p = target.position();
            assert!(p.x >= TARGET_RADIUS && p.x <= layout.width - TARGET_RADIUS);
            assert!(p.y >= TARGET_RADIUS && p.y <= layout.height - TARGET_RADIUS);
        }
    }

    #[test]
    fn test_relocation_respects_margin() {
        let layout = ScreenLayout::default();
        let mut target = BouncingTarget::new(layout, 11);
        let inset = TARGET_RADIUS + RELOCATION_MARGIN;
        for _ in 0..200 {
            target.relocate();
            let p = target.position();
            assert!(p.x >= inset && p.x <= layout.width - inset);
            assert!(p.y >= inset && p.y <= layout.height - inset);
            assert!(TARGET_SPEEDS.contains(&target.velocity().x));
        }
    }

    #[test]
    fn test_same_seed_same_path() {
        let layout = ScreenLayout::default();
        let mut a = BouncingTarget::new(layout, 42);
        let mut b = BouncingTarget::new(layout, 42);
        for _ in 0..100 {
            a.advance();
            b.advance();
        }
        a.relocate();
        b.relocate();
        assert_eq!(a.position(), b.position());
    }
}
