//! Recording state shown by the audio step.
//!
//! Valid transitions:
//! - Idle -> Recording (start)
//! - Stopped -> Recording (start again, previous take discarded)
//! - Recording -> Stopped (manual stop or hard timeout)
//! - Recording -> Idle (teardown)
//! - Stopped -> Idle (discard)

use std::fmt;
use std::time::Duration;

use expres_core::limits::{format_mm_ss, MAX_RECORDING_DURATION};

use crate::error::AudioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordingState {
    /// Nothing recorded yet, or the previous take was discarded.
    Idle,
    /// The microphone is live and the position is being sampled.
    Recording,
    /// A take has ended.
    Stopped,
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingState::Idle => write!(f, "idle"),
            RecordingState::Recording => write!(f, "recording"),
            RecordingState::Stopped => write!(f, "stopped"),
        }
    }
}

impl RecordingState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &RecordingState) -> bool {
        matches!(
            (self, target),
            (RecordingState::Idle, RecordingState::Recording)
                | (RecordingState::Stopped, RecordingState::Recording)
                | (RecordingState::Recording, RecordingState::Stopped)
                | (RecordingState::Recording, RecordingState::Idle)
                | (RecordingState::Stopped, RecordingState::Idle)
        )
    }
}

/// Snapshot of the recorder as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSession {
    pub state: RecordingState,
    /// Time recorded so far. Never exceeds `max_duration`.
    pub elapsed: Duration,
    pub max_duration: Duration,
    /// Failure of the last stop, including one triggered by the hard
    /// timeout. Cleared by the next successful start or a discard.
    pub last_error: Option<AudioError>,
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new(MAX_RECORDING_DURATION)
    }
}

impl RecordingSession {
    pub fn new(max_duration: Duration) -> Self {
        Self {
            state: RecordingState::Idle,
            elapsed: Duration::ZERO,
            max_duration,
            last_error: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    pub fn remaining(&self) -> Duration {
        self.max_duration.saturating_sub(self.elapsed)
    }

    /// Whole seconds recorded.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.as_secs()
    }

    /// Remaining time as `mm:ss`.
    pub fn display_remaining(&self) -> String {
        format_mm_ss(self.remaining())
    }

    /// Record a new position, clamped to the cap. Returns whether the cap has
    /// been reached.
    pub(crate) fn advance_to(&mut self, position: Duration) -> bool {
        self.elapsed = position.min(self.max_duration);
        self.elapsed >= self.max_duration
    }

    pub(crate) fn transition(&mut self, target: RecordingState) {
        if self.state.can_transition_to(&target) {
            tracing::debug!("Recording state: {} -> {}", self.state, target);
        } else {
            tracing::warn!("Unexpected recording transition: {} -> {}", self.state, target);
        }
        self.state = target;
    }
}

// =============================================================================
// Tests
// =============================================================================
