//! File-backed capability ports for the command-line host.
//!
//! The user hands over files explicitly, so every permission is granted, the
//! gallery returns the files given on the command line and the recorder
//! "records" a pre-existing voice note.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use expres_audio::{AudioRecorder, RecordedClip, RecorderError};
use expres_capture::{
    Camera, CaptureError, CaptureOutcome, GalleryPicker, MediaKind, PermissionGate,
    PermissionStatus,
};
use expres_core::types::{Capability, DraftAsset};

/// Describe a local file as a draft asset.
pub fn file_asset(path: &Path) -> expres_core::Result<DraftAsset> {
    let metadata = std::fs::metadata(path)?;
    let mut asset = DraftAsset::new(path.to_string_lossy()).with_size(metadata.len());
    if let Some(name) = path.file_name() {
        asset = asset.with_display_name(name.to_string_lossy());
    }
    Ok(asset)
}

// =============================================================================
// Permissions
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct HostPermissions;

impl PermissionGate for HostPermissions {
    async fn request(
        &self,
        capability: Capability,
    ) -> Result<PermissionStatus, CaptureError> {
        tracing::debug!(%capability, "Permission granted by command line");
        Ok(PermissionStatus::Granted)
    }
}

// =============================================================================
// Camera and gallery
// =============================================================================

/// There is no live camera on a terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCamera;

impl Camera for NoCamera {
    async fn capture(&self, _kind: MediaKind) -> Result<CaptureOutcome, CaptureError> {
        Err(CaptureError::failed(Capability::Camera, "no hay cámara disponible"))
    }
}

/// Gallery that offers the files passed on the command line.
#[derive(Debug, Clone, Default)]
pub struct FileGallery {
    photo: Option<DraftAsset>,
    mixed: Option<DraftAsset>,
}

impl FileGallery {
    pub fn new(photo: Option<DraftAsset>, mixed: Option<DraftAsset>) -> Self {
        Self { photo, mixed }
    }
}

impl GalleryPicker for FileGallery {
    async fn pick(&self, kind: MediaKind) -> Result<CaptureOutcome, CaptureError> {
        let picked = match kind {
            MediaKind::Photo => self.photo.clone(),
            MediaKind::Mixed => self.mixed.clone(),
        };
        Ok(picked.map_or(CaptureOutcome::Cancelled, CaptureOutcome::Captured))
    }
}

// =============================================================================
// Recorder
// =============================================================================

/// Recorder that hands back an existing voice note file.
#[derive(Debug)]
pub struct FileRecorder {
    clip: PathBuf,
    started_at: Mutex<Option<Instant>>,
}

impl FileRecorder {
    pub fn new(clip: impl Into<PathBuf>) -> Self {
        Self {
            clip: clip.into(),
            started_at: Mutex::new(None),
        }
    }

    fn started_at(&self) -> MutexGuard<'_, Option<Instant>> {
        self.started_at.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AudioRecorder for FileRecorder {
    async fn start(&self) -> Result<(), RecorderError> {
        let metadata = tokio::fs::metadata(&self.clip)
            .await
            .map_err(|e| RecorderError::new(format!("{}: {e}", self.clip.display())))?;
        if !metadata.is_file() {
            return Err(RecorderError::new(format!(
                "{} no es un archivo",
                self.clip.display()
            )));
        }
        *self.started_at() = Some(Instant::now());
        Ok(())
    }

    async fn stop(&self) -> Result<RecordedClip, RecorderError> {
        let was_recording = self.started_at().take().is_some();
        if !was_recording {
            return Err(RecorderError::new("no hay ninguna grabación en curso"));
        }
        let size_bytes = tokio::fs::metadata(&self.clip).await.ok().map(|m| m.len());
        Ok(RecordedClip {
            content_handle: self.clip.to_string_lossy().into_owned(),
            size_bytes,
        })
    }

    fn position(&self) -> Duration {
        self.started_at()
            .map(|t| t.elapsed())
            .unwrap_or_default()
    }
}

// =============================================================================
// Tests
// =============================================================================
