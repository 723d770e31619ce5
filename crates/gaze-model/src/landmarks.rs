//! Landmark detector contract and the normalized iris sample.
//!
//! Landmark positions are normalized to the camera image: `(0, 0)` is the
//! top-left, `(1, 1)` the bottom-right. The detector itself is external;
//! only its per-frame output shape is defined here.

use serde::{Deserialize, Serialize};

/// A point in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}

impl ImagePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Landmarks for one eye.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeLandmarks {
    pub inner_corner: ImagePoint,
    pub outer_corner: ImagePoint,
    pub upper_lid: ImagePoint,
    pub lower_lid: ImagePoint,
    pub pupil_center: ImagePoint,
}

impl EyeLandmarks {
    /// Eye width along the image x axis (always non-negative).
    pub fn width(&self) -> f64 {
        (self.outer_corner.x - self.inner_corner.x).abs()
    }

    /// Eyelid gap; negative when the lids are swapped.
    pub fn height(&self) -> f64 {
        self.lower_lid.y - self.upper_lid.y
    }

    /// The corner closer to the image's left edge.
    pub fn leftmost_corner(&self) -> ImagePoint {
        if self.inner_corner.x <= self.outer_corner.x {
            self.inner_corner
        } else {
            self.outer_corner
        }
    }

    /// Apply `f` to every landmark of this eye.
    pub fn map_points(&self, f: impl Fn(ImagePoint) -> ImagePoint) -> Self {
        Self {
            inner_corner: f(self.inner_corner),
            outer_corner: f(self.outer_corner),
            upper_lid: f(self.upper_lid),
            lower_lid: f(self.lower_lid),
            pupil_center: f(self.pupil_center),
        }
    }
}

/// Detector output for one frame with a face in view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    pub left_eye: EyeLandmarks,
    pub right_eye: EyeLandmarks,
}

/// Source of per-frame landmarks (camera + detector).
///
/// `None` means no face was detected this frame.
pub trait LandmarkSource {
    fn get_eye_landmarks(&mut self) -> Option<FaceLandmarks>;
}

/// Combined two-eye iris position inside the eye opening.
///
/// Each component is a fraction of the eye box: `x` from the image-left
/// corner, `y` from the upper lid. Plausible samples lie inside (0, 1).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IrisSample {
    pub x: f64,
    pub y: f64,
}

impl IrisSample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise mean of a set of samples. `None` when empty.
    ///
    /// Accumulates offsets from the first sample, so a constant stream
    /// averages to exactly that sample.
    pub fn mean<I>(samples: I) -> Option<IrisSample>
    where
        I: IntoIterator<Item = IrisSample>,
    {
        let mut samples = samples.into_iter();
        let first = samples.next()?;
        let (count, dx, dy) = samples.fold((1usize, 0.0, 0.0), |(n, dx, dy), s| {
            (n + 1, dx + (s.x - first.x), dy + (s.y - first.y))
        });
        let n = count as f64;
        Some(IrisSample::new(first.x + dx / n, first.y + dy / n))
    }
}
