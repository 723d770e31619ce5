//! Records the detector output of a live session as a landmark trace.
//!
//! Frames are buffered and pushed to disk every `FLUSH_INTERVAL_NS` of
//! session time, so an interrupted run still leaves a replayable prefix.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use focustrain_common::clock::{ns_to_secs, TimestampNs};
use focustrain_common::error::{FocusTrainError, FocusTrainResult};
use focustrain_gaze_model::landmarks::FaceLandmarks;
use focustrain_gaze_model::trace::{FrameRecord, TraceHeader};

/// Session time between flushes.
const FLUSH_INTERVAL_NS: TimestampNs = 2_000_000_000;

/// What a finished recording contains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedTrace {
    pub frames: u64,
    pub span_secs: f64,
}

/// Appends frames to a trace file, keeping timestamps monotonic.
pub struct TraceRecorder {
    out: BufWriter<File>,
    path: PathBuf,
    frames: u64,
    first_ns: Option<TimestampNs>,
    last_ns: TimestampNs,
    flushed_at_ns: TimestampNs,
}

impl TraceRecorder {
    /// Create (or truncate) `path` and write the header line.
    pub fn create(path: PathBuf, header: &TraceHeader) -> FocusTrainResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut out = BufWriter::new(File::create(&path)?);
        writeln!(out, "# {}", serde_json::to_string(header)?)
            .map_err(|e| FocusTrainError::trace(format!("Failed to write header: {e}")))?;

        Ok(Self {
            out,
            path,
            frames: 0,
            first_ns: None,
            last_ns: 0,
            flushed_at_ns: 0,
        })
    }

    /// Append one frame. `face` is `None` when nothing was detected.
    ///
    /// A timestamp earlier than the previous frame is refused, since the
    /// trace loader would reject the file.
    pub fn record(
        &mut self,
        timestamp_ns: TimestampNs,
        face: Option<&FaceLandmarks>,
    ) -> FocusTrainResult<()> {
        if self.first_ns.is_some() && timestamp_ns < self.last_ns {
            return Err(FocusTrainError::trace(format!(
                "Frame at {timestamp_ns} ns precedes previous frame at {} ns",
                self.last_ns
            )));
        }

        let line = serde_json::to_string(&FrameRecord::new(timestamp_ns, face.copied()))?;
        writeln!(self.out, "{line}")
            .map_err(|e| FocusTrainError::trace(format!("Failed to write frame: {e}")))?;

        let first = *self.first_ns.get_or_insert(timestamp_ns);
        if self.frames == 0 {
            self.flushed_at_ns = first;
        }
        self.frames += 1;
        self.last_ns = timestamp_ns;

        if timestamp_ns - self.flushed_at_ns >= FLUSH_INTERVAL_NS {
            self.flush()?;
            self.flushed_at_ns = timestamp_ns;
        }
        Ok(())
    }

    fn flush(&mut self) -> FocusTrainResult<()> {
        self.out
            .flush()
            .map_err(|e| FocusTrainError::trace(format!("Failed to flush trace: {e}")))
    }

    /// Flush the remaining frames and report what was written.
    pub fn finish(mut self) -> FocusTrainResult<RecordedTrace> {
        self.flush()?;
        let span_ns = self
            .first_ns
            .map_or(0, |first| self.last_ns.saturating_sub(first));
        tracing::debug!(path = %self.path.display(), frames = self.frames, "Trace closed");
        Ok(RecordedTrace {
            frames: self.frames,
            span_secs: ns_to_secs(span_ns),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focustrain_common::clock::FrameClock;
    use focustrain_gaze_model::geometry::ScreenLayout;
    use focustrain_gaze_model::trace::LoadedTrace;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("focustrain_test_recorder_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_recorded_trace_loads_back() {
        let dir = scratch("roundtrip");
        let path = dir.join("nested").join("trace.jsonl");
        let header = TraceHeader::new(30, ScreenLayout::default());

        let mut recorder = TraceRecorder::create(path.clone(), &header).unwrap();
        let mut clock = FrameClock::fixed(30);
        for _ in 0..31 {
            recorder.record(clock.tick(), None).unwrap();
        }
        let recorded = recorder.finish().unwrap();
        assert_eq!(recorded.frames, 31);
        assert_eq!(recorded.span_secs, 1.0);

        let trace = LoadedTrace::load(&path).unwrap();
        assert_eq!(trace.header, header);
        assert_eq!(trace.frames.len(), 31);
        assert!(trace.frames.iter().all(|f| f.landmarks.is_none()));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_frames_reach_disk_after_flush_interval() {
        let dir = scratch("flush");
        let path = dir.join("trace.jsonl");
        let header = TraceHeader::new(30, ScreenLayout::default());

        let mut recorder = TraceRecorder::create(path.clone(), &header).unwrap();
        let mut clock = FrameClock::fixed(30);
        // 2 s of frames, stamped 0 through 2_000_000_000 ns.
        for _ in 0..61 {
            recorder.record(clock.tick(), None).unwrap();
        }

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk.lines().count(), 1 + 61);

        recorder.finish().unwrap();
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_backwards_timestamp_is_refused() {
        let dir = scratch("backwards");
        let path = dir.join("trace.jsonl");
        let header = TraceHeader::new(30, ScreenLayout::default());

        let mut recorder = TraceRecorder::create(path.clone(), &header).unwrap();
        recorder.record(100, None).unwrap();
        recorder.record(100, None).unwrap();
        let err = recorder.record(99, None).unwrap_err();
        assert!(matches!(err, FocusTrainError::Trace { .. }));

        let recorded = recorder.finish().unwrap();
        assert_eq!(recorded.frames, 2);
        assert!(LoadedTrace::load(&path).is_ok());

        std::fs::remove_dir_all(&dir).ok();
    }
}
