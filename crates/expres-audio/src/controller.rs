//! Audio capture controller.
//!
//! All commands and recorder position ticks are handled by a single actor
//! task, so a manual stop and the hard-timeout stop can never both finalize
//! the same recording. The tick channel belongs to one recording and is
//! dropped in the same step that leaves `Recording`; ticks still in flight
//! are discarded with it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use expres_capture::PermissionGate;
use expres_core::limits::{MAX_RECORDING_DURATION, RECORDING_TICK_INTERVAL};
use expres_core::types::{extension_from_name, AssetSlot, Capability, DraftAsset, DraftUpdate};
use expres_wizard::WizardSession;

use crate::error::AudioError;
use crate::recorder::{AudioRecorder, RecordedClip};
use crate::session::{RecordingSession, RecordingState};

type Reply<T> = oneshot::Sender<Result<T, AudioError>>;

enum Command {
    Start(Reply<()>),
    Stop(Reply<Option<DraftAsset>>),
    Discard(Reply<()>),
    Teardown(Reply<()>),
}

#[derive(Debug, Clone, Copy)]
enum StopTrigger {
    Manual,
    Timeout,
}

/// Handle to the audio capture actor of one wizard session.
///
/// Dropping the last handle tears the actor down: an active recording is
/// stopped and its file is not attached to the draft.
pub struct AudioCaptureController {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<RecordingSession>,
}

impl fmt::Debug for AudioCaptureController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioCaptureController")
            .field("session", &*self.state.borrow())
            .field("closed", &self.commands.is_closed())
            .finish()
    }
}

impl AudioCaptureController {
    /// Spawn the controller actor on the current tokio runtime.
    pub fn spawn<R, P>(recorder: R, permissions: P, session: WizardSession) -> Self
    where
        R: AudioRecorder + 'static,
        P: PermissionGate + 'static,
    {
        let (commands, command_rx) = mpsc::channel(8);
        let (state_tx, state) = watch::channel(RecordingSession::new(MAX_RECORDING_DURATION));
        let actor = Actor {
            recorder: Arc::new(recorder),
            permissions,
            session,
            state: state_tx,
            ticker: None,
            microphone_granted: false,
        };
        tokio::spawn(actor.run(command_rx));
        Self { commands, state }
    }

    /// Request the microphone (first time only) and start recording.
    ///
    /// Allowed from `Idle` and `Stopped`; starting again discards the
    /// previous take.
    pub async fn start(&self) -> Result<(), AudioError> {
        self.request(Command::Start).await
    }

    /// Stop the current recording and attach it to the draft.
    ///
    /// Returns `Ok(None)` when nothing is being recorded, for instance when
    /// the hard timeout already stopped it.
    pub async fn stop(&self) -> Result<Option<DraftAsset>, AudioError> {
        self.request(Command::Stop).await
    }

    /// Drop the current take and return to `Idle`.
    pub async fn discard(&self) -> Result<(), AudioError> {
        self.request(Command::Discard).await
    }

    /// Release the recorder. Any later command fails with `Closed`.
    pub async fn teardown(&self) -> Result<(), AudioError> {
        self.request(Command::Teardown).await
    }

    /// Latest recording snapshot.
    pub fn session(&self) -> RecordingSession {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state or elapsed-time change.
    pub fn subscribe(&self) -> watch::Receiver<RecordingSession> {
        self.state.clone()
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, AudioError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .await
            .map_err(|_| AudioError::Closed)?;
        rx.await.map_err(|_| AudioError::Closed)?
    }
}

// =============================================================================
// Actor
// =============================================================================

/// Position sampler for one recording.
struct Ticker {
    positions: mpsc::Receiver<Duration>,
    task: JoinHandle<()>,
}

impl Ticker {
    fn spawn<R: AudioRecorder + 'static>(recorder: Arc<R>) -> Self {
        let (tx, positions) = mpsc::channel(4);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(RECORDING_TICK_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(recorder.position()).await.is_err() {
                    break;
                }
            }
        });
        Self { positions, task }
    }

    fn cancel(self) {
        self.task.abort();
    }
}

async fn next_position(ticker: &mut Option<Ticker>) -> Duration {
    match ticker {
        Some(t) => match t.positions.recv().await {
            Some(position) => position,
            None => std::future::pending().await,
        },
        None => std::future::pending().await,
    }
}

struct Actor<R, P> {
    recorder: Arc<R>,
    permissions: P,
    session: WizardSession,
    state: watch::Sender<RecordingSession>,
    ticker: Option<Ticker>,
    microphone_granted: bool,
}

impl<R, P> Actor<R, P>
where
    R: AudioRecorder + 'static,
    P: PermissionGate + 'static,
{
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        let mut acknowledge = None;
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Start(reply)) => {
                        let _ = reply.send(self.start().await);
                    }
                    Some(Command::Stop(reply)) => {
                        let _ = reply.send(self.stop_and_finalize(StopTrigger::Manual).await);
                    }
                    Some(Command::Discard(reply)) => {
                        let _ = reply.send(self.discard());
                    }
                    Some(Command::Teardown(reply)) => {
                        acknowledge = Some(reply);
                        break;
                    }
                    None => break,
                },
                position = next_position(&mut self.ticker) => self.on_tick(position).await,
            }
        }

        self.teardown().await;
        // Refuse anything queued behind the teardown before acknowledging it.
        drop(commands);
        if let Some(reply) = acknowledge {
            let _ = reply.send(Ok(()));
        }
        tracing::debug!(session_id = %self.session.id(), "Audio controller stopped");
    }

    fn current(&self) -> RecordingState {
        self.state.borrow().state
    }

    async fn start(&mut self) -> Result<(), AudioError> {
        let current = self.current();
        if current == RecordingState::Recording {
            return Err(AudioError::InvalidState {
                action: "start",
                state: current,
            });
        }

        if !self.microphone_granted {
            let status = self.permissions.request(Capability::Microphone).await?;
            if !status.is_granted() {
                tracing::info!(session_id = %self.session.id(), "Microphone permission denied");
                return Err(AudioError::PermissionDenied);
            }
            self.microphone_granted = true;
        }

        self.recorder.start().await.map_err(|e| {
            tracing::warn!(session_id = %self.session.id(), error = %e, "Recorder failed to start");
            AudioError::StartFailed(e)
        })?;

        // A new take replaces whatever was recorded before.
        self.session.set_field(DraftUpdate::AudioAsset(None));
        self.ticker = Some(Ticker::spawn(Arc::clone(&self.recorder)));
        self.state.send_modify(|s| {
            s.elapsed = Duration::ZERO;
            s.last_error = None;
            s.transition(RecordingState::Recording);
        });
        tracing::info!(session_id = %self.session.id(), "Recording started");
        Ok(())
    }

    async fn on_tick(&mut self, position: Duration) {
        if self.current() != RecordingState::Recording {
            return;
        }
        let mut reached_cap = false;
        self.state.send_if_modified(|s| {
            let before = s.elapsed;
            reached_cap = s.advance_to(position);
            s.elapsed != before
        });
        if reached_cap {
            // A failed stop is published on the snapshot as `last_error`.
            let _ = self.stop_and_finalize(StopTrigger::Timeout).await;
        }
    }

    /// Leave `Recording`, stop the recorder and attach the file to the draft.
    async fn stop_and_finalize(
        &mut self,
        trigger: StopTrigger,
    ) -> Result<Option<DraftAsset>, AudioError> {
        if self.current() != RecordingState::Recording {
            tracing::debug!(?trigger, "Stop ignored, not recording");
            return Ok(None);
        }

        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
        self.state.send_modify(|s| s.transition(RecordingState::Stopped));
        let elapsed = self.state.borrow().elapsed;

        let clip = match self.recorder.stop().await {
            Ok(clip) => clip,
            Err(e) => {
                tracing::warn!(
                    session_id = %self.session.id(),
                    ?trigger,
                    error = %e,
                    "Recorder failed to stop"
                );
                let err = AudioError::StopFailed(e);
                self.state.send_modify(|s| s.last_error = Some(err.clone()));
                return Err(err);
            }
        };

        let asset = clip_to_asset(&clip);
        if self.session.is_disposed() {
            tracing::debug!(session_id = %self.session.id(), "Session disposed, recording not attached");
        } else {
            self.session
                .set_field(DraftUpdate::AudioAsset(Some(asset.clone())));
        }
        tracing::info!(
            session_id = %self.session.id(),
            ?trigger,
            elapsed_ms = elapsed.as_millis() as u64,
            handle = %asset.content_handle,
            "Recording finalized"
        );
        Ok(Some(asset))
    }

    fn discard(&mut self) -> Result<(), AudioError> {
        let current = self.current();
        if current == RecordingState::Recording {
            return Err(AudioError::InvalidState {
                action: "discard",
                state: current,
            });
        }
        self.session.set_field(DraftUpdate::AudioAsset(None));
        self.state.send_if_modified(|s| {
            let changed = s.state != RecordingState::Idle
                || s.elapsed != Duration::ZERO
                || s.last_error.is_some();
            s.elapsed = Duration::ZERO;
            s.last_error = None;
            if s.state != RecordingState::Idle {
                s.transition(RecordingState::Idle);
            }
            changed
        });
        tracing::debug!(session_id = %self.session.id(), "Recording discarded");
        Ok(())
    }

    async fn teardown(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
        if self.current() != RecordingState::Recording {
            return;
        }
        if let Err(e) = self.recorder.stop().await {
            tracing::warn!(session_id = %self.session.id(), error = %e, "Recorder stop failed during teardown");
        }
        self.state.send_modify(|s| {
            s.elapsed = Duration::ZERO;
            s.transition(RecordingState::Idle);
        });
        tracing::info!(session_id = %self.session.id(), "Recording abandoned on teardown");
    }
}

/// Describe a finished recording as a draft asset.
fn clip_to_asset(clip: &RecordedClip) -> DraftAsset {
    let ext = extension_from_name(&clip.content_handle)
        .unwrap_or_else(|| AssetSlot::Audio.default_extension().to_string());
    let mut asset = DraftAsset::new(clip.content_handle.clone())
        .with_mime_type(format!("audio/{ext}"))
        .with_display_name(format!("audio_{}.{ext}", Uuid::new_v4()));
    if let Some(size) = clip.size_bytes {
        asset = asset.with_size(size);
    }
    asset
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRecorder;
    use expres_capture::MockPermissionGate;

    #[test]
    fn test_clip_to_asset_uses_handle_extension() {
        let asset = clip_to_asset(&RecordedClip {
            content_handle: "file:///cache/sound.m4a".to_string(),
            size_bytes: Some(4096),
        });
        assert_eq!(asset.mime_type.as_deref(), Some("audio/m4a"));
        let name = asset.display_name.unwrap();
        assert!(name.starts_with("audio_"));
        assert!(name.ends_with(".m4a"));
        assert_eq!(asset.size_bytes, Some(4096));
    }

    #[test]
    fn test_clip_to_asset_defaults_to_mp4() {
        let asset = clip_to_asset(&RecordedClip {
            content_handle: "content://recorder/17".to_string(),
            size_bytes: None,
        });
        assert_eq!(asset.mime_type.as_deref(), Some("audio/mp4"));
        assert!(asset.display_name.unwrap().ends_with(".mp4"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_stop_attaches_asset() {
        let session = WizardSession::new();
        let recorder = MockRecorder::new();
        let controller = AudioCaptureController::spawn(
            recorder.clone(),
            MockPermissionGate::granting_all(),
            session.clone(),
        );

        controller.start().await.unwrap();
        assert!(controller.session().is_recording());

        tokio::time::sleep(Duration::from_millis(10_050)).await;
        let asset = controller.stop().await.unwrap().unwrap();

        assert_eq!(controller.session().state, RecordingState::Stopped);
        assert_eq!(controller.session().elapsed_secs(), 10);
        assert_eq!(session.draft().audio_asset(), Some(&asset));
        assert_eq!(recorder.stop_calls(), 1);
    }

    #[tokio::test]
    async fn test_stop_when_idle_is_noop() {
        let recorder = MockRecorder::new();
        let controller = AudioCaptureController::spawn(
            recorder.clone(),
            MockPermissionGate::granting_all(),
            WizardSession::new(),
        );
        assert_eq!(controller.stop().await.unwrap(), None);
        assert_eq!(recorder.stop_calls(), 0);
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let controller = AudioCaptureController::spawn(
            MockRecorder::new(),
            MockPermissionGate::granting_all(),
            WizardSession::new(),
        );
        controller.start().await.unwrap();
        assert_eq!(
            controller.start().await.unwrap_err(),
            AudioError::InvalidState {
                action: "start",
                state: RecordingState::Recording
            }
        );
        assert_eq!(
            controller.discard().await.unwrap_err(),
            AudioError::InvalidState {
                action: "discard",
                state: RecordingState::Recording
            }
        );
    }
}
