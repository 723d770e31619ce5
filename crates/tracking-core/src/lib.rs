//! FocusTrain Tracking Core
//!
//! Turns per-frame eye landmarks into a smoothed on-screen gaze point and
//! focus events:
//! - **Iris Normalizer:** landmarks to a normalized iris position
//! - **Calibration Controller:** guided five-point calibration
//! - **Gaze Mapper:** iris position to raw screen coordinates
//! - **Temporal Filter:** jitter suppression and jump limiting
//! - **Focus State Machine:** continuous-focus detection with grace
//!
//! This crate is pure computation. No camera, no rendering, no I/O.
//! `GazeTracker` ties the components together behind a frame-synchronous
//! API.

pub mod calibration;
pub mod filter;
pub mod focus;
pub mod iris;
pub mod mapper;
pub mod ring;
pub mod stats;
pub mod tracker;

pub use calibration::{CalibrationController, CalibrationProgress, CalibrationStep};
pub use filter::TemporalFilter;
pub use focus::{FocusState, FocusStateMachine};
pub use iris::{normalize_iris, SampleRejection};
pub use mapper::GazeMapper;
pub use stats::SessionStats;
pub use tracker::{FrameUpdate, GazeTracker};
