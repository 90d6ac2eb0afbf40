//! Expres Audio crate - voice note capture.
//!
//! Provides the `AudioRecorder` port, the `RecordingSession` state shown by
//! the audio step, and the `AudioCaptureController` that drives a recorder
//! through permission, recording, hard-timeout or manual stop, and
//! finalization into the draft. Includes a mock recorder for testing without
//! a microphone.

pub mod controller;
pub mod error;
pub mod mock;
pub mod recorder;
pub mod session;

pub use controller::AudioCaptureController;
pub use error::{AudioError, RecorderError};
pub use mock::MockRecorder;
pub use recorder::{AudioRecorder, RecordedClip};
pub use session::{RecordingSession, RecordingState};
