use expres_capture::CaptureError;
use expres_core::error::ExpresError;
use expres_core::types::Capability;

use crate::session::RecordingState;

/// Failure reported by an [`crate::AudioRecorder`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RecorderError(pub String);

impl RecorderError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Errors returned by the audio capture controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioError {
    #[error("microphone permission denied")]
    PermissionDenied,
    #[error(transparent)]
    Permission(#[from] CaptureError),
    #[error("recorder failed to start: {0}")]
    StartFailed(RecorderError),
    #[error("recorder failed to stop: {0}")]
    StopFailed(RecorderError),
    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: RecordingState,
    },
    #[error("audio controller has been torn down")]
    Closed,
}

impl From<AudioError> for ExpresError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::PermissionDenied => ExpresError::PermissionDenied {
                capability: Capability::Microphone,
            },
            AudioError::Permission(e) => e.into(),
            other => ExpresError::CaptureFailure {
                capability: Capability::Microphone,
                reason: other.to_string(),
            },
        }
    }
}
