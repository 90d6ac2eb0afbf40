//! Submission coordinator.
//!
//! One attempt: check identity, encode the draft, send exactly one
//! create-incident request, reset the draft only on confirmed success.
//! Nothing is retried automatically; a retry is a new call that re-encodes
//! with fresh filenames.

use std::sync::atomic::{AtomicBool, Ordering};

use expres_capture::AssetReader;
use expres_core::error::ExpresError;
use expres_core::types::UserId;
use expres_wizard::WizardSession;

use crate::client::{ApiError, IncidentApi};
use crate::encoder::{AssetEncoder, EncodingError};
use crate::payload::SubmissionPayload;

/// Confirmation shown when the server does not send its own message.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Tu incidencia exprés ha sido enviada.";

/// Failure shown when the server rejects without a message.
pub const DEFAULT_REJECTION_MESSAGE: &str = "Error desconocido del servidor al crear incidencia.";

/// How a submission attempt ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The backend accepted the incident and the draft was reset.
    Submitted { message: String },
    /// The flow was left while the request was in flight. Nothing was
    /// touched and nothing should be shown.
    Abandoned,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("ID de usuario no encontrado.")]
    IdentityMissing,
    #[error("a submission is already in flight")]
    InFlight,
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{0}")]
    Rejected(String),
}

impl From<SubmissionError> for ExpresError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::IdentityMissing => ExpresError::Precondition(err.to_string()),
            SubmissionError::InFlight => {
                ExpresError::Submission("Ya se está enviando la incidencia.".to_string())
            }
            SubmissionError::Encoding(e) => e.into(),
            SubmissionError::Api(e) => ExpresError::Submission(e.to_string()),
            SubmissionError::Rejected(message) => ExpresError::Submission(message),
        }
    }
}

/// Clears the in-flight flag when an attempt ends, whichever way it ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Turns a finished draft into one create-incident request.
#[derive(Debug)]
pub struct SubmissionCoordinator<R, A> {
    encoder: AssetEncoder<R>,
    api: A,
    in_flight: AtomicBool,
}

impl<R, A> SubmissionCoordinator<R, A>
where
    R: AssetReader,
    A: IncidentApi,
{
    pub fn new(reader: R, api: A) -> Self {
        Self {
            encoder: AssetEncoder::new(reader),
            api,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submit the draft held by `session` on behalf of `identity`.
    ///
    /// On failure the draft is left exactly as it was.
    pub async fn submit(
        &self,
        session: &WizardSession,
        identity: Option<UserId>,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        let user_id = identity.ok_or(SubmissionError::IdentityMissing)?;
        if session.is_disposed() {
            tracing::debug!(session_id = %session.id(), "Submission skipped, flow already left");
            return Ok(SubmissionOutcome::Abandoned);
        }
        if self.in_flight.swap(true, Ordering::AcqRel) {
            tracing::debug!(session_id = %session.id(), "Submission ignored, one is in flight");
            return Err(SubmissionError::InFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let draft = session.draft();
        let encoded = self.encoder.encode(&draft).await?;
        let payload = SubmissionPayload::assemble(user_id, &draft, encoded);
        tracing::info!(
            session_id = %session.id(),
            user_id = %user_id,
            has_plate = payload.plate.is_some(),
            has_document = payload.document.is_some(),
            has_audio = payload.audio.is_some(),
            has_media = payload.media.is_some(),
            "Submitting express incident"
        );

        let result = self.api.create_incident(&payload).await;

        if session.is_disposed() {
            tracing::info!(session_id = %session.id(), "Submission completed after flow exit, ignoring");
            return Ok(SubmissionOutcome::Abandoned);
        }

        let response = result?;
        if !response.success {
            let message = response
                .message()
                .unwrap_or(DEFAULT_REJECTION_MESSAGE)
                .to_string();
            tracing::warn!(session_id = %session.id(), message = %message, "Incident rejected");
            return Err(SubmissionError::Rejected(message));
        }

        let message = response
            .message()
            .unwrap_or(DEFAULT_SUCCESS_MESSAGE)
            .to_string();
        session.reset();
        tracing::info!(session_id = %session.id(), "Express incident created");
        Ok(SubmissionOutcome::Submitted { message })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use expres_capture::MemoryAssetReader;
    use expres_core::types::{DraftAsset, DraftUpdate};

    use crate::payload::CreateIncidentResponse;

    /// Records payloads and answers with a fixed response.
    #[derive(Clone, Default)]
    struct RecordingApi {
        sent: Arc<Mutex<Vec<SubmissionPayload>>>,
        response: Option<std::result::Result<CreateIncidentResponse, ApiError>>,
    }

    impl RecordingApi {
        fn answering(response: std::result::Result<CreateIncidentResponse, ApiError>) -> Self {
            Self {
                sent: Arc::default(),
                response: Some(response),
            }
        }

        fn sent(&self) -> Vec<SubmissionPayload> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IncidentApi for RecordingApi {
        async fn create_incident(
            &self,
            payload: &SubmissionPayload,
        ) -> std::result::Result<CreateIncidentResponse, ApiError> {
            self.sent.lock().unwrap().push(payload.clone());
            self.response.clone().unwrap_or_else(|| {
                Ok(CreateIncidentResponse {
                    success: true,
                    message: None,
                })
            })
        }
    }

    fn ready_session(reader: &MemoryAssetReader) -> WizardSession {
        reader.insert("file:///cache/sound.m4a", vec![7; 64]);
        let session = WizardSession::new();
        session.set_field(DraftUpdate::PlateText(Some("1234ABC".into())));
        session.set_field(DraftUpdate::AudioAsset(Some(
            DraftAsset::new("file:///cache/sound.m4a").with_mime_type("audio/m4a"),
        )));
        session
    }

    #[tokio::test]
    async fn test_missing_identity_sends_nothing() {
        let reader = MemoryAssetReader::new();
        let session = ready_session(&reader);
        let api = RecordingApi::default();
        let coordinator = SubmissionCoordinator::new(reader.clone(), api.clone());

        let err = coordinator.submit(&session, None).await.unwrap_err();
        assert!(matches!(err, SubmissionError::IdentityMissing));
        assert_eq!(reader.reads(), 0);
        assert!(api.sent().is_empty());
        let top: ExpresError = err.into();
        assert_eq!(top.user_message(), "ID de usuario no encontrado.");
    }

    #[tokio::test]
    async fn test_success_resets_with_default_message() {
        let reader = MemoryAssetReader::new();
        let session = ready_session(&reader);
        let api = RecordingApi::default();
        let coordinator = SubmissionCoordinator::new(reader, api.clone());

        let outcome = coordinator.submit(&session, Some(UserId(3))).await.unwrap();
        assert_eq!(
            outcome,
            SubmissionOutcome::Submitted {
                message: DEFAULT_SUCCESS_MESSAGE.to_string()
            }
        );
        assert!(session.draft().is_empty());
        assert_eq!(api.sent().len(), 1);
        assert!(!coordinator.is_in_flight());
    }

    #[tokio::test]
    async fn test_rejection_keeps_draft() {
        let reader = MemoryAssetReader::new();
        let session = ready_session(&reader);
        let before = session.draft();
        let api = RecordingApi::answering(Ok(CreateIncidentResponse {
            success: false,
            message: None,
        }));
        let coordinator = SubmissionCoordinator::new(reader, api);

        let err = coordinator.submit(&session, Some(UserId(3))).await.unwrap_err();
        assert_eq!(err.to_string(), DEFAULT_REJECTION_MESSAGE);
        assert_eq!(session.draft(), before);
        assert!(!coordinator.is_in_flight());
    }

    #[tokio::test]
    async fn test_disposed_session_sends_nothing() {
        let reader = MemoryAssetReader::new();
        let session = ready_session(&reader);
        session.dispose();
        let before = session.draft();
        let api = RecordingApi::default();
        let coordinator = SubmissionCoordinator::new(reader.clone(), api.clone());

        let outcome = coordinator.submit(&session, Some(UserId(3))).await.unwrap();
        assert_eq!(outcome, SubmissionOutcome::Abandoned);
        assert_eq!(session.draft(), before);
        assert_eq!(reader.reads(), 0);
        assert!(api.sent().is_empty());
        assert!(!coordinator.is_in_flight());
    }

    #[test]
    fn test_in_flight_guard_releases() {
        let flag = AtomicBool::new(true);
        drop(InFlightGuard(&flag));
        assert!(!flag.load(Ordering::Acquire));
    }
}
