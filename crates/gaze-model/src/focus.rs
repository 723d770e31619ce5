//! Focus outcome types shared between the tracker and the game layer.

use serde::{Deserialize, Serialize};

/// Per-frame result of a focus update.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FocusEvent {
    /// Nothing noteworthy this frame.
    #[default]
    None,
    /// Continuous focus reached the required duration (seconds).
    Success { duration: f64 },
    /// A focus streak longer than the notice threshold was lost.
    Lost { accumulated: f64 },
}

impl FocusEvent {
    pub fn is_success(&self) -> bool {
        matches!(self, FocusEvent::Success { .. })
    }

    pub fn is_lost(&self) -> bool {
        matches!(self, FocusEvent::Lost { .. })
    }
}

/// Coarse focus state, for UI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusPhase {
    Idle,
    Focused,
    /// Focused, but the gaze left the target or tracking dropped and the
    /// grace window is running.
    FocusedGrace,
}
