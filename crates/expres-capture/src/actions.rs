//! Document and media step actions.
//!
//! Each action asks for the relevant permission, invokes the camera or the
//! picker, and writes the resulting asset into the session. A cancelled
//! capture or a denied permission leaves the draft untouched.

use expres_core::types::{AssetSlot, Capability, DraftAsset, DraftUpdate};
use expres_wizard::WizardSession;

use crate::error::CaptureError;
use crate::ports::{Camera, CaptureOutcome, GalleryPicker, MediaKind, PermissionGate};

/// Where an action gets its asset from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Camera,
    Gallery,
}

impl Source {
    fn capability(&self) -> Capability {
        match self {
            Source::Camera => Capability::Camera,
            Source::Gallery => Capability::Gallery,
        }
    }
}

/// Draft slot a capture action may fill. The audio slot is written by the
/// recording controller only, so it has no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Document,
    Media,
}

impl Target {
    fn slot(&self) -> AssetSlot {
        match self {
            Target::Document => AssetSlot::Document,
            Target::Media => AssetSlot::Media,
        }
    }

    fn kind(&self) -> MediaKind {
        match self {
            Target::Document => MediaKind::Photo,
            Target::Media => MediaKind::Mixed,
        }
    }

    fn attach(&self, asset: DraftAsset) -> DraftUpdate {
        match self {
            Target::Document => DraftUpdate::DocumentAsset(Some(asset)),
            Target::Media => DraftUpdate::MediaAsset(Some(asset)),
        }
    }
}

/// Capture actions for the documentation and media steps.
#[derive(Debug, Clone)]
pub struct CaptureActions<P, C, G> {
    permissions: P,
    camera: C,
    gallery: G,
}

impl<P, C, G> CaptureActions<P, C, G>
where
    P: PermissionGate,
    C: Camera,
    G: GalleryPicker,
{
    pub fn new(permissions: P, camera: C, gallery: G) -> Self {
        Self {
            permissions,
            camera,
            gallery,
        }
    }

    /// Documentation step: take a photo of the documentation. Clears the
    /// plate number when a photo is captured.
    pub async fn take_document_photo(
        &self,
        session: &WizardSession,
    ) -> Result<CaptureOutcome, CaptureError> {
        self.acquire(session, Target::Document, Source::Camera)
            .await
    }

    /// Documentation step: pick an existing photo of the documentation.
    pub async fn browse_document(
        &self,
        session: &WizardSession,
    ) -> Result<CaptureOutcome, CaptureError> {
        self.acquire(session, Target::Document, Source::Gallery)
            .await
    }

    /// Media step: take a photo or video.
    pub async fn capture_media(
        &self,
        session: &WizardSession,
    ) -> Result<CaptureOutcome, CaptureError> {
        self.acquire(session, Target::Media, Source::Camera)
            .await
    }

    /// Media step: pick an existing photo, video or file.
    pub async fn browse_media(
        &self,
        session: &WizardSession,
    ) -> Result<CaptureOutcome, CaptureError> {
        self.acquire(session, Target::Media, Source::Gallery)
            .await
    }

    pub fn remove_document(&self, session: &WizardSession) {
        session.set_field(DraftUpdate::DocumentAsset(None));
    }

    pub fn remove_media(&self, session: &WizardSession) {
        session.set_field(DraftUpdate::MediaAsset(None));
    }

    async fn acquire(
        &self,
        session: &WizardSession,
        target: Target,
        source: Source,
    ) -> Result<CaptureOutcome, CaptureError> {
        let slot = target.slot();
        let kind = target.kind();
        let capability = source.capability();
        let status = self.permissions.request(capability).await?;
        if !status.is_granted() {
            tracing::info!(%capability, %slot, "Permission denied");
            return Err(CaptureError::PermissionDenied(capability));
        }

        let outcome = match source {
            Source::Camera => self.camera.capture(kind).await,
            Source::Gallery => self.gallery.pick(kind).await,
        }
        .inspect_err(|e| tracing::warn!(%slot, error = %e, "Capture failed"))?;

        match &outcome {
            CaptureOutcome::Captured(asset) if session.is_disposed() => {
                tracing::debug!(
                    session_id = %session.id(),
                    %slot,
                    handle = %asset.content_handle,
                    "Capture finished after flow exit, dropping asset"
                );
            }
            CaptureOutcome::Captured(asset) => {
                session.set_field(target.attach(asset.clone()));
                tracing::info!(session_id = %session.id(), %slot, "Asset attached");
            }
            CaptureOutcome::Cancelled => {
                tracing::debug!(%slot, "Capture cancelled");
            }
        }
        Ok(outcome)
    }
}

// =============================================================================
// Tests
// =============================================================================
