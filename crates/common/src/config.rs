//! Application configuration.
//!
//! Every tuning constant of the tracking pipeline lives here so that a
//! session can be reproduced from a single JSON file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FocusTrainError, FocusTrainResult};

/// Number of samples the calibration stability history can hold.
pub const CALIBRATION_HISTORY_CAPACITY: usize = 15;

/// Number of raw estimates the temporal filter can hold.
pub const GAZE_HISTORY_CAPACITY: usize = 6;

/// Global application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Nominal camera frame rate. One tracker update happens per frame.
    pub frame_rate_hz: u32,

    /// Screen geometry the gaze is mapped onto.
    pub screen: ScreenConfig,

    /// Iris normalization limits.
    pub iris: IrisConfig,

    /// Guided calibration parameters.
    pub calibration: CalibrationConfig,

    /// Iris-space to screen-space mapping.
    pub mapping: MappingConfig,

    /// Temporal smoothing of the mapped gaze.
    pub filter: FilterConfig,

    /// Focus detection and scoring.
    pub focus: FocusConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Screen size and anchor placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Screen width in pixels.
    pub width: u32,
    /// Screen height in pixels.
    pub height: u32,
    /// Horizontal distance of the left/right anchors from the screen edge.
    pub edge_margin_x: f64,
    /// Vertical distance of the top/bottom anchors from the screen edge.
    pub edge_margin_y: f64,
}

/// Limits applied when turning eye landmarks into an iris position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrisConfig {
    /// Minimum eye width (normalized image units) before the eye is rejected.
    pub min_eye_width: f64,
    /// Minimum eyelid gap (normalized image units) before the eye is rejected.
    pub min_eye_height: f64,
    /// Lower bound of the plausible iris band (exclusive).
    pub band_min: f64,
    /// Upper bound of the plausible iris band (exclusive).
    pub band_max: f64,
}

/// Guided five-point calibration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Cumulative stable time required to capture one anchor (seconds).
    pub hold_time_secs: f64,
    /// Maximum per-axis iris range over the stability window.
    pub stability_threshold: f64,
    /// Number of most recent samples checked for stability and averaged
    /// on capture.
    pub stability_window: usize,
    /// Hold-time penalty applied on an unstable frame (seconds).
    pub unstable_penalty_secs: f64,
    /// Hold-time penalty applied on a frame without a usable sample (seconds).
    pub lost_penalty_secs: f64,
}

/// Iris-space to screen-space mapping parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Horizontal gain applied after normalization.
    pub gain_x: f64,
    /// Vertical gain applied after normalization.
    pub gain_y: f64,
    /// Bound on the normalized offset, in calibrated half-ranges.
    pub max_normalized_offset: f64,
    /// Calibration ranges below this are considered degenerate.
    pub min_axis_range: f64,
    /// Range substituted for a degenerate calibration range.
    pub degenerate_range_floor: f64,
}

/// Temporal filter parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Samples needed before the weighted average kicks in.
    pub min_samples_for_average: usize,
    /// Largest per-axis movement accepted in one frame (pixels).
    pub max_jump_px: f64,
    /// Fraction of the remaining gap closed per frame, in (0, 1].
    pub smoothing_factor: f64,
    /// Distance the smoothed gaze keeps from the screen edges (pixels).
    pub safety_margin_px: f64,
}

/// Focus state machine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Default maximum gaze-to-target distance counted as focused (pixels).
    pub threshold_px: f64,
    /// Continuous focus needed for a success (seconds).
    pub required_secs: f64,
    /// Grace period before an interruption resets focus (seconds).
    pub loss_tolerance_secs: f64,
    /// Accumulated-duration decay while in the grace period (per second).
    pub decay_rate_per_sec: f64,
    /// Accumulated duration above which a loss is reported (seconds).
    pub lost_notice_min_secs: f64,
    /// Score awarded per success.
    pub point_reward: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "focustrain=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: 30,
            screen: ScreenConfig::default(),
            iris: IrisConfig::default(),
            calibration: CalibrationConfig::default(),
            mapping: MappingConfig::default(),
            filter: FilterConfig::default(),
            focus: FocusConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            edge_margin_x: 200.0,
            edge_margin_y: 150.0,
        }
    }
}

impl Default for IrisConfig {
    fn default() -> Self {
        Self {
            min_eye_width: 0.005,
            min_eye_height: 0.002,
            band_min: 0.1,
            band_max: 0.9,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            hold_time_secs: 2.0,
            stability_threshold: 0.04,
            stability_window: 8,
            unstable_penalty_secs: 0.05,
            lost_penalty_secs: 0.1,
        }
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            gain_x: 1.0,
            gain_y: 1.0,
            max_normalized_offset: 1.5,
            min_axis_range: 0.001,
            degenerate_range_floor: 0.05,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_samples_for_average: 3,
            max_jump_px: 150.0,
            smoothing_factor: 0.22,
            safety_margin_px: 50.0,
        }
    }
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            threshold_px: 100.0,
            required_secs: 1.0,
            loss_tolerance_secs: 0.5,
            decay_rate_per_sec: 0.3,
            lost_notice_min_secs: 0.3,
            point_reward: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> FocusTrainResult<Self> {
        if !path.exists() {
            return Err(FocusTrainError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> FocusTrainResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> FocusTrainResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Seconds between two consecutive frames.
    pub fn frame_interval_secs(&self) -> f64 {
        1.0 / self.frame_rate_hz.max(1) as f64
    }

    /// Reject values the tracking pipeline cannot work with.
    pub fn validate(&self) -> FocusTrainResult<()> {
        if self.frame_rate_hz == 0 {
            return Err(FocusTrainError::config("frame_rate_hz must be positive"));
        }
        if self.screen.width == 0 || self.screen.height == 0 {
            return Err(FocusTrainError::config("screen size must be positive"));
        }
        let half_w = self.screen.width as f64 / 2.0;
        let half_h = self.screen.height as f64 / 2.0;
        if !(0.0..half_w).contains(&self.screen.edge_margin_x)
            || !(0.0..half_h).contains(&self.screen.edge_margin_y)
        {
            return Err(FocusTrainError::config(
                "edge margins must be non-negative and smaller than half the screen",
            ));
        }
        if self.filter.safety_margin_px < 0.0
            || self.filter.safety_margin_px >= half_w.min(half_h)
        {
            return Err(FocusTrainError::config(
                "filter.safety_margin_px must be smaller than half the screen",
            ));
        }
        if self.iris.band_min >= self.iris.band_max {
            return Err(FocusTrainError::config("iris band_min must be below band_max"));
        }
        let window = self.calibration.stability_window;
        if window == 0 || window > CALIBRATION_HISTORY_CAPACITY {
            return Err(FocusTrainError::config(format!(
                "calibration.stability_window must be in 1..={CALIBRATION_HISTORY_CAPACITY}"
            )));
        }
        if self.calibration.hold_time_secs <= 0.0 {
            return Err(FocusTrainError::config(
                "calibration.hold_time_secs must be positive",
            ));
        }
        let min_samples = self.filter.min_samples_for_average;
        if min_samples == 0 || min_samples > GAZE_HISTORY_CAPACITY {
            return Err(FocusTrainError::config(format!(
                "filter.min_samples_for_average must be in 1..={GAZE_HISTORY_CAPACITY}"
            )));
        }
        if !(self.filter.smoothing_factor > 0.0 && self.filter.smoothing_factor <= 1.0) {
            return Err(FocusTrainError::config(
                "filter.smoothing_factor must be in (0, 1]",
            ));
        }
        if self.mapping.degenerate_range_floor < self.mapping.min_axis_range {
            return Err(FocusTrainError::config(
                "mapping.degenerate_range_floor must not be below min_axis_range",
            ));
        }
        if self.focus.required_secs <= 0.0 || self.focus.threshold_px <= 0.0 {
            return Err(FocusTrainError::config(
                "focus.required_secs and focus.threshold_px must be positive",
            ));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("focustrain").join("config.json")
}
