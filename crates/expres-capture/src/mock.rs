//! Mock capability ports for testing without hardware.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use expres_core::types::{Capability, DraftAsset};

use crate::error::CaptureError;
use crate::ports::{
    AssetReader, Camera, CaptureOutcome, GalleryPicker, MediaKind, PermissionGate,
    PermissionStatus,
};

// =============================================================================
// Permissions
// =============================================================================

/// Permission gate that grants everything except an explicit deny list.
///
/// Counts requests so tests can assert that a permission was (not) asked.
#[derive(Debug, Clone, Default)]
pub struct MockPermissionGate {
    denied: Arc<Mutex<HashSet<Capability>>>,
    requests: Arc<AtomicUsize>,
}

impl MockPermissionGate {
    pub fn granting_all() -> Self {
        Self::default()
    }

    pub fn denying(capability: Capability) -> Self {
        let gate = Self::default();
        gate.set_denied(capability, true);
        gate
    }

    pub fn set_denied(&self, capability: Capability, denied: bool) {
        let mut set = self.denied.lock().unwrap_or_else(|e| e.into_inner());
        if denied {
            set.insert(capability);
        } else {
            set.remove(&capability);
        }
    }

    /// Number of prompts shown so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl PermissionGate for MockPermissionGate {
    async fn request(&self, capability: Capability) -> Result<PermissionStatus, CaptureError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let denied = self
            .denied
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&capability);
        Ok(if denied {
            PermissionStatus::Denied
        } else {
            PermissionStatus::Granted
        })
    }
}

// =============================================================================
// Camera / gallery
// =============================================================================

type Scripted = Arc<Mutex<VecDeque<Result<CaptureOutcome, CaptureError>>>>;

fn next_scripted(script: &Scripted) -> Result<CaptureOutcome, CaptureError> {
    script
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .pop_front()
        .unwrap_or(Ok(CaptureOutcome::Cancelled))
}

/// Camera returning scripted outcomes in order, then `Cancelled`.
#[derive(Debug, Clone, Default)]
pub struct MockCamera {
    script: Scripted,
    last_kind: Arc<Mutex<Option<MediaKind>>>,
}

impl MockCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returning(asset: DraftAsset) -> Self {
        let camera = Self::new();
        camera.push(Ok(CaptureOutcome::Captured(asset)));
        camera
    }

    pub fn push(&self, outcome: Result<CaptureOutcome, CaptureError>) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(outcome);
    }

    /// Kind requested by the most recent capture.
    pub fn last_kind(&self) -> Option<MediaKind> {
        *self.last_kind.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Camera for MockCamera {
    async fn capture(&self, kind: MediaKind) -> Result<CaptureOutcome, CaptureError> {
        *self.last_kind.lock().unwrap_or_else(|e| e.into_inner()) = Some(kind);
        next_scripted(&self.script)
    }
}

/// Gallery returning scripted outcomes in order, then `Cancelled`.
#[derive(Debug, Clone, Default)]
pub struct MockGallery {
    script: Scripted,
}

impl MockGallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returning(asset: DraftAsset) -> Self {
        let gallery = Self::new();
        gallery.push(Ok(CaptureOutcome::Captured(asset)));
        gallery
    }

    pub fn push(&self, outcome: Result<CaptureOutcome, CaptureError>) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(outcome);
    }
}

impl GalleryPicker for MockGallery {
    async fn pick(&self, _kind: MediaKind) -> Result<CaptureOutcome, CaptureError> {
        next_scripted(&self.script)
    }
}

// =============================================================================
// Asset reader
// =============================================================================

/// In-memory asset store keyed by content handle.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetReader {
    assets: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    reads: Arc<AtomicUsize>,
}

impl MemoryAssetReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, content_handle: impl Into<String>, bytes: Vec<u8>) {
        self.assets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(content_handle.into(), bytes);
    }

    /// Number of read attempts, successful or not.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl AssetReader for MemoryAssetReader {
    async fn read(&self, content_handle: &str) -> std::io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.assets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(content_handle)
            .cloned()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no asset behind handle {content_handle}"),
                )
            })
    }
}
