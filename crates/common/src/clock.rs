//! Frame clock for the per-frame tracking loop.
//!
//! Every tracker update is stamped with a monotonic nanosecond timestamp
//! relative to the session start. Two sources are supported:
//! - `Fixed`: synthetic time advancing exactly one frame interval per tick,
//!   used for simulation, replay and tests
//! - `Wall`: real monotonic time, used with a live camera

use std::time::Instant;

/// Monotonic timestamp in nanoseconds since session start.
pub type TimestampNs = u64;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Source of per-frame timestamps.
#[derive(Debug, Clone)]
pub enum FrameClock {
    /// Deterministic clock: frame `n` is stamped `n * 1e9 / fps` ns.
    Fixed { fps: u32, frames: u64, last_ns: TimestampNs },
    /// Real monotonic clock anchored at `epoch`.
    Wall {
        epoch: Instant,
        epoch_wall: String,
        frames: u64,
        last_ns: TimestampNs,
    },
}

impl FrameClock {
    /// Synthetic clock at the given frame rate.
    pub fn fixed(fps: u32) -> Self {
        Self::Fixed {
            fps: fps.max(1),
            frames: 0,
            last_ns: 0,
        }
    }

    /// Real clock anchored to now.
    pub fn wall() -> Self {
        Self::Wall {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
            frames: 0,
            last_ns: 0,
        }
    }

    /// Advance to the next frame and return its timestamp.
    pub fn tick(&mut self) -> TimestampNs {
        match self {
            Self::Fixed {
                fps,
                frames,
                last_ns,
            } => {
                let ts = (*frames as u128 * NANOS_PER_SEC / *fps as u128) as TimestampNs;
                *frames += 1;
                *last_ns = ts;
                ts
            }
            Self::Wall {
                epoch,
                frames,
                last_ns,
                ..
            } => {
                // Instant is monotonic, but keep stamps non-decreasing anyway.
                let ts = (epoch.elapsed().as_nanos() as TimestampNs).max(*last_ns);
                *frames += 1;
                *last_ns = ts;
                ts
            }
        }
    }

    /// Timestamp of the most recent tick (0 before the first tick).
    pub fn now_ns(&self) -> TimestampNs {
        match self {
            Self::Fixed { last_ns, .. } | Self::Wall { last_ns, .. } => *last_ns,
        }
    }

    /// Number of ticks so far.
    pub fn frames(&self) -> u64 {
        match self {
            Self::Fixed { frames, .. } | Self::Wall { frames, .. } => *frames,
        }
    }

    /// Wall-clock time at session start, if this is a real clock.
    pub fn epoch_wall(&self) -> Option<&str> {
        match self {
            Self::Fixed { .. } => None,
            Self::Wall { epoch_wall, .. } => Some(epoch_wall),
        }
    }
}

/// Convert a nanosecond span to seconds.
pub fn ns_to_secs(ns: u64) -> f64 {
    ns as f64 / 1_000_000_000.0
}

/// Seconds elapsed between two timestamps (zero if `later` is earlier).
pub fn elapsed_secs(earlier: TimestampNs, later: TimestampNs) -> f64 {
    ns_to_secs(later.saturating_sub(earlier))
}
