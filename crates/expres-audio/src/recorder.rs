use std::future::Future;
use std::time::Duration;

use crate::error::RecorderError;

/// What the recorder hands back when a recording stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedClip {
    /// Handle to the recorded file (path or URI).
    pub content_handle: String,
    /// Size of the file, when the platform reports it.
    pub size_bytes: Option<u64>,
}

/// Platform microphone recorder.
///
/// One recording at a time. `position` is sampled from a separate task while
/// recording, so it must not block.
pub trait AudioRecorder: Send + Sync {
    /// Begin a new recording.
    fn start(&self) -> impl Future<Output = Result<(), RecorderError>> + Send;

    /// Finish the current recording and return the resulting file.
    fn stop(&self) -> impl Future<Output = Result<RecordedClip, RecorderError>> + Send;

    /// Current position of the active recording.
    fn position(&self) -> Duration;
}
