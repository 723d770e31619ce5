//! FocusTrain Gaze Model
//!
//! Defines the data contracts of the gaze-tracking pipeline:
//! - **Landmarks:** per-eye detector output and the normalized iris sample
//! - **Calibration:** the five anchors and the calibration profile
//! - **Geometry:** screen points and the anchor layout
//! - **Focus:** per-frame focus events and phases
//! - **Trace:** JSONL recording of detector output for replay
//!
//! Landmarks are normalized to the camera image; gaze points are in
//! screen pixels.

pub mod calibration;
pub mod focus;
pub mod geometry;
pub mod landmarks;
pub mod trace;

pub use calibration::*;
pub use focus::*;
pub use geometry::*;
pub use landmarks::*;
pub use trace::*;
