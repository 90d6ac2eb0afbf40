use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

use crate::error::RecorderError;
use crate::recorder::{AudioRecorder, RecordedClip};

#[derive(Debug)]
struct MockState {
    started_at: Option<Instant>,
    fail_start: Option<String>,
    fail_stop: Option<String>,
    clip: RecordedClip,
}

/// Mock recorder for testing.
///
/// Position follows the tokio clock, so paused-time tests drive it with
/// `tokio::time::advance`. Counts stop calls and position samples.
#[derive(Debug, Clone)]
pub struct MockRecorder {
    state: Arc<Mutex<MockState>>,
    stop_calls: Arc<AtomicUsize>,
    position_reads: Arc<AtomicUsize>,
}

impl Default for MockRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRecorder {
    pub fn new() -> Self {
        Self::with_clip("file:///cache/sound.m4a", None)
    }

    /// Recorder whose recordings end up at `content_handle`.
    pub fn with_clip(content_handle: impl Into<String>, size_bytes: Option<u64>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                started_at: None,
                fail_start: None,
                fail_stop: None,
                clip: RecordedClip {
                    content_handle: content_handle.into(),
                    size_bytes,
                },
            })),
            stop_calls: Arc::new(AtomicUsize::new(0)),
            position_reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make the next starts fail with `reason`. `None` restores success.
    pub fn fail_start(&self, reason: Option<&str>) {
        self.lock().fail_start = reason.map(str::to_string);
    }

    /// Make the next stops fail with `reason`. `None` restores success.
    pub fn fail_stop(&self, reason: Option<&str>) {
        self.lock().fail_stop = reason.map(str::to_string);
    }

    pub fn is_recording(&self) -> bool {
        self.lock().started_at.is_some()
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn position_reads(&self) -> usize {
        self.position_reads.load(Ordering::SeqCst)
    }
}

impl AudioRecorder for MockRecorder {
    async fn start(&self) -> Result<(), RecorderError> {
        let mut state = self.lock();
        if let Some(reason) = &state.fail_start {
            return Err(RecorderError::new(reason.clone()));
        }
        if state.started_at.is_some() {
            return Err(RecorderError::new("already recording"));
        }
        state.started_at = Some(Instant::now());
        tracing::info!("Mock recorder started");
        Ok(())
    }

    async fn stop(&self) -> Result<RecordedClip, RecorderError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock();
        if state.started_at.take().is_none() {
            return Err(RecorderError::new("not recording"));
        }
        if let Some(reason) = &state.fail_stop {
            return Err(RecorderError::new(reason.clone()));
        }
        tracing::info!("Mock recorder stopped");
        Ok(state.clip.clone())
    }

    fn position(&self) -> Duration {
        self.position_reads.fetch_add(1, Ordering::SeqCst);
        self.lock()
            .started_at
            .map(|started| started.elapsed())
            .unwrap_or(Duration::ZERO)
    }
}
