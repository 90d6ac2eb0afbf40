//! Session-scoped draft store.
//!
//! The draft lives in a `tokio::sync::watch` channel so that every write is a
//! whole-field replacement performed under the channel lock and every step
//! holding a receiver is woken to recompute its advance eligibility.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use uuid::Uuid;

use expres_core::types::{DraftField, DraftUpdate, IncidentDraft};

struct SessionInner {
    id: Uuid,
    started_at: DateTime<Utc>,
    draft: watch::Sender<IncidentDraft>,
    disposed: AtomicBool,
}

/// Handle to the draft of one incident flow.
///
/// Cloning is cheap and every clone refers to the same draft. The handle is
/// created at flow entry and disposed at flow exit.
#[derive(Clone)]
pub struct WizardSession {
    inner: Arc<SessionInner>,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WizardSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardSession")
            .field("id", &self.inner.id)
            .field("started_at", &self.inner.started_at)
            .field("disposed", &self.is_disposed())
            .field("draft", &*self.inner.draft.borrow())
            .finish()
    }
}

impl WizardSession {
    /// Create a session holding an empty draft.
    pub fn new() -> Self {
        let (draft, _) = watch::channel(IncidentDraft::new());
        let session = Self {
            inner: Arc::new(SessionInner {
                id: Uuid::new_v4(),
                started_at: Utc::now(),
                draft,
                disposed: AtomicBool::new(false),
            }),
        };
        tracing::debug!(session_id = %session.id(), "Wizard session created");
        session
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }

    /// Snapshot of the current draft.
    pub fn draft(&self) -> IncidentDraft {
        self.inner.draft.borrow().clone()
    }

    /// Replace one field of the draft.
    ///
    /// Returns the fields whose value changed. Subscribers are only notified
    /// when something actually changed.
    pub fn set_field(&self, update: DraftUpdate) -> Vec<DraftField> {
        let field = update.field();
        let mut changed = Vec::new();
        self.inner.draft.send_if_modified(|draft| {
            changed = draft.apply(update);
            !changed.is_empty()
        });
        if !changed.is_empty() {
            tracing::debug!(
                session_id = %self.inner.id,
                field = ?field,
                changed = ?changed,
                "Draft field updated"
            );
        }
        changed
    }

    /// Return the draft to its empty state.
    pub fn reset(&self) {
        let cleared = self.inner.draft.send_if_modified(|draft| {
            if draft.is_empty() {
                false
            } else {
                *draft = IncidentDraft::new();
                true
            }
        });
        tracing::info!(session_id = %self.inner.id, cleared, "Draft reset");
    }

    /// Receiver notified on every draft change.
    pub fn subscribe(&self) -> watch::Receiver<IncidentDraft> {
        self.inner.draft.subscribe()
    }

    /// Mark the session as abandoned. Completion handlers that outlive the
    /// flow check this and turn into no-ops.
    pub fn dispose(&self) {
        if !self.inner.disposed.swap(true, Ordering::AcqRel) {
            tracing::info!(session_id = %self.inner.id, "Wizard session disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Whether two handles refer to the same session.
    pub fn same_session(&self, other: &WizardSession) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use expres_core::types::DraftAsset;

    fn photo() -> DraftAsset {
        DraftAsset::new("content://photo/1").with_mime_type("image/jpeg")
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = WizardSession::new();
        assert!(session.draft().is_empty());
        assert!(!session.is_disposed());
        assert!(!session.id().is_nil());
    }

    #[test]
    fn test_clones_share_draft() {
        let a = WizardSession::new();
        let b = a.clone();
        a.set_field(DraftUpdate::PlateText(Some("1234abc".into())));
        assert_eq!(b.draft().plate_text(), Some("1234ABC"));
        assert!(a.same_session(&b));
        assert!(!a.same_session(&WizardSession::new()));
    }

    #[test]
    fn test_set_field_enforces_exclusion() {
        let session = WizardSession::new();
        session.set_field(DraftUpdate::DocumentAsset(Some(photo())));
        let changed = session.set_field(DraftUpdate::PlateText(Some("1234ABC".into())));

        let draft = session.draft();
        assert!(draft.document_asset().is_none());
        assert_eq!(draft.plate_text(), Some("1234ABC"));
        assert_eq!(changed.len(), 2);
    }

    #[test]
    fn test_reset_clears_everything() {
        let session = WizardSession::new();
        session.set_field(DraftUpdate::PlateText(Some("1234ABC".into())));
        session.set_field(DraftUpdate::AudioAsset(Some(DraftAsset::new("a.m4a"))));
        session.reset();
        assert!(session.draft().is_empty());
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let session = WizardSession::new();
        session.dispose();
        session.dispose();
        assert!(session.is_disposed());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let session = WizardSession::new();
        let mut rx = session.subscribe();

        session.set_field(DraftUpdate::MediaAsset(Some(photo())));
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().media_asset().is_some());
    }

    #[tokio::test]
    async fn test_noop_write_does_not_notify() {
        let session = WizardSession::new();
        let mut rx = session.subscribe();

        session.set_field(DraftUpdate::MediaAsset(None));
        assert!(!rx.has_changed().unwrap());

        session.reset();
        assert!(!rx.has_changed().unwrap());
    }
}
