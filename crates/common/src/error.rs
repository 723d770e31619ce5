//! Error types shared across FocusTrain crates.

use std::path::PathBuf;

/// Top-level error type for FocusTrain operations.
///
/// Per-frame sensing problems (no face, closed eye, implausible iris
/// position) are not errors; they surface as sample rejections and are
/// absorbed by the tracking pipeline.
#[derive(Debug, thiserror::Error)]
pub enum FocusTrainError {
    /// Gaze mapping was requested before all five anchors were captured.
    #[error("Calibration incomplete: {captured} of 5 anchors captured")]
    CalibrationIncomplete { captured: usize },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Trace error: {message}")]
    Trace { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using FocusTrainError.
pub type FocusTrainResult<T> = Result<T, FocusTrainError>;

impl FocusTrainError {
    pub fn calibration_incomplete(captured: usize) -> Self {
        Self::CalibrationIncomplete { captured }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn trace(msg: impl Into<String>) -> Self {
        Self::Trace {
            message: msg.into(),
        }
    }

    /// Whether this error is a caller contract violation rather than an
    /// environmental failure.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::CalibrationIncomplete { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_incomplete_message() {
        let err = FocusTrainError::calibration_incomplete(2);
        assert_eq!(err.to_string(), "Calibration incomplete: 2 of 5 anchors captured");
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_io_error_is_not_contract_violation() {
        let err: FocusTrainError = std::io::Error::other("disk gone").into();
        assert!(!err.is_contract_violation());
    }
}
