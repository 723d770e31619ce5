//! Iris normalization: eye landmarks to a single `IrisSample`.
//!
//! For each eye the pupil is expressed as a fraction of the eye box:
//! horizontally from the image-left corner over the eye width, vertically
//! from the upper lid over the eyelid gap. Both eyes are measured in the
//! same image direction so averaging them keeps the horizontal signal.
//! The pipeline is stateless; a frame either yields a full sample or a
//! reason why it could not.

use focustrain_common::config::IrisConfig;
use focustrain_gaze_model::landmarks::{EyeLandmarks, FaceLandmarks, IrisSample};

/// Which eye a rejection refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EyeSide {
    Left,
    Right,
}

/// Why a frame produced no usable iris sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleRejection {
    /// No face in view this frame.
    DetectionAbsent,
    /// An eye is (nearly) closed or its corners collapsed.
    GeometryDegenerate { eye: EyeSide, width: f64, height: f64 },
    /// Averaged position outside the plausible central band.
    OutOfBand { x: f64, y: f64 },
}

/// Normalize one frame of detector output.
pub fn normalize_iris(
    face: Option<&FaceLandmarks>,
    config: &IrisConfig,
) -> Result<IrisSample, SampleRejection> {
    let face = face.ok_or(SampleRejection::DetectionAbsent)?;
    let sample = average_eye_fraction(face, config)?;

    let in_band = |v: f64| v > config.band_min && v < config.band_max;
    if !(in_band(sample.x) && in_band(sample.y)) {
        return Err(SampleRejection::OutOfBand {
            x: sample.x,
            y: sample.y,
        });
    }
    Ok(sample)
}

/// Two-eye average before the plausibility gate.
pub fn average_eye_fraction(
    face: &FaceLandmarks,
    config: &IrisConfig,
) -> Result<IrisSample, SampleRejection> {
    let left = eye_fraction(&face.left_eye, EyeSide::Left, config)?;
    let right = eye_fraction(&face.right_eye, EyeSide::Right, config)?;
    Ok(IrisSample::new(
        (left.x + right.x) / 2.0,
        (left.y + right.y) / 2.0,
    ))
}

/// Pupil position within a single eye box.
pub fn eye_fraction(
    eye: &EyeLandmarks,
    side: EyeSide,
    config: &IrisConfig,
) -> Result<IrisSample, SampleRejection> {
    let width = eye.width();
    let height = eye.height();
    if !(width > config.min_eye_width && height > config.min_eye_height) {
        return Err(SampleRejection::GeometryDegenerate {
            eye: side,
            width,
            height,
        });
    }

    let origin_x = eye.leftmost_corner().x;
    Ok(IrisSample::new(
        (eye.pupil_center.x - origin_x) / width,
        (eye.pupil_center.y - eye.upper_lid.y) / height,
    ))
}
