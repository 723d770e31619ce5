//! Landmark trace format.
//!
//! A trace records the detector output of a session so it can be replayed
//! through the tracker deterministically. It is JSONL: the first line is
//! the header prefixed with `# `, followed by one `FrameRecord` per frame.
//! A frame without a detected face has `"landmarks": null`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use focustrain_common::clock::TimestampNs;

use crate::geometry::ScreenLayout;
use crate::landmarks::FaceLandmarks;

/// Current trace schema version.
pub const TRACE_SCHEMA_VERSION: &str = "1.0";

/// Metadata written at the top of a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Wall-clock time at session start (ISO 8601).
    pub epoch_wall: String,

    /// Nominal camera frame rate.
    pub frame_rate_hz: u32,

    /// Screen the session was calibrated against.
    pub screen: ScreenLayout,
}

impl TraceHeader {
    pub fn new(frame_rate_hz: u32, screen: ScreenLayout) -> Self {
        Self {
            schema_version: TRACE_SCHEMA_VERSION.to_string(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
            frame_rate_hz,
            screen,
        }
    }
}

/// Detector output for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Monotonic nanoseconds since session start.
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    /// Landmarks, or `None` when no face was detected.
    pub landmarks: Option<FaceLandmarks>,
}

impl FrameRecord {
    pub fn new(timestamp_ns: TimestampNs, landmarks: Option<FaceLandmarks>) -> Self {
        Self {
            timestamp_ns,
            landmarks,
        }
    }
}

/// A fully parsed trace.
#[derive(Debug, Clone)]
pub struct LoadedTrace {
    pub path: PathBuf,
    pub header: TraceHeader,
    pub frames: Vec<FrameRecord>,
}

/// Errors that can occur when reading traces.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid trace: {message}")]
    ValidationError { message: String },
}

impl LoadedTrace {
    /// Load and validate a trace file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| TraceError::IoError {
            path: path.clone(),
            source: e,
        })?;

        let header = parse_header(&content)
            .ok_or_else(|| TraceError::ValidationError {
                message: "missing '# {header}' first line".to_string(),
            })?
            .map_err(|e| TraceError::ParseError {
                path: path.clone(),
                source: e,
            })?;

        if header.frame_rate_hz == 0 {
            return Err(TraceError::ValidationError {
                message: "frame_rate_hz must be positive".to_string(),
            });
        }

        let frames = parse_frames(&content).map_err(|e| TraceError::ParseError {
            path: path.clone(),
            source: e,
        })?;

        if frames
            .windows(2)
            .any(|w| w[1].timestamp_ns < w[0].timestamp_ns)
        {
            return Err(TraceError::ValidationError {
                message: "frame timestamps are not monotonic".to_string(),
            });
        }

        Ok(Self {
            path,
            header,
            frames,
        })
    }

    /// Duration covered by the trace, in seconds.
    pub fn duration_secs(&self) -> f64 {
        match (self.frames.first(), self.frames.last()) {
            (Some(first), Some(last)) => {
                focustrain_common::clock::elapsed_secs(first.timestamp_ns, last.timestamp_ns)
            }
            _ => 0.0,
        }
    }
}

/// Parse the `# {...}` header line, if present.
pub fn parse_header(jsonl: &str) -> Option<Result<TraceHeader, serde_json::Error>> {
    let first = jsonl.lines().map(str::trim).find(|line| !line.is_empty())?;
    let raw = first.strip_prefix('#')?;
    Some(serde_json::from_str(raw.trim()))
}

/// Parse frame records, skipping `#` lines and blank lines.
pub fn parse_frames(jsonl: &str) -> Result<Vec<FrameRecord>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize a header and frames to trace JSONL.
pub fn serialize_trace(
    header: &TraceHeader,
    frames: &[FrameRecord],
) -> Result<String, serde_json::Error> {
    let mut output = format!("# {}\n", serde_json::to_string(header)?);
    for frame in frames {
        output.push_str(&serde_json::to_string(frame)?);
        output.push('\n');
    }
    Ok(output)
}
