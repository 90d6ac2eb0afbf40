//! Capability ports.
//!
//! Each port has a single async method. Implementations live outside this
//! crate (platform glue) or in [`crate::mock`].

use std::future::Future;

use expres_core::types::{Capability, DraftAsset};

use crate::error::CaptureError;

// =============================================================================
// Enums
// =============================================================================

/// Answer from the platform permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// What a camera or gallery invocation may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Still photos only (documentation step).
    Photo,
    /// Photos or videos (media step).
    Mixed,
}

/// Result of a user-driven capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Captured(DraftAsset),
    /// The user dismissed the camera or picker. Not an error.
    Cancelled,
}

// =============================================================================
// Traits
// =============================================================================

/// Runtime permission prompt.
pub trait PermissionGate: Send + Sync {
    /// Ask for `capability`. A prompt that cannot be shown is an error;
    /// a refusal is `Ok(Denied)`.
    fn request(
        &self,
        capability: Capability,
    ) -> impl Future<Output = Result<PermissionStatus, CaptureError>> + Send;
}

/// Device camera.
pub trait Camera: Send + Sync {
    fn capture(
        &self,
        kind: MediaKind,
    ) -> impl Future<Output = Result<CaptureOutcome, CaptureError>> + Send;
}

/// Photo library or file picker, single selection.
pub trait GalleryPicker: Send + Sync {
    fn pick(
        &self,
        kind: MediaKind,
    ) -> impl Future<Output = Result<CaptureOutcome, CaptureError>> + Send;
}

/// Binary access to a captured asset.
pub trait AssetReader: Send + Sync {
    /// Read the full contents behind `content_handle`.
    fn read(&self, content_handle: &str) -> impl Future<Output = std::io::Result<Vec<u8>>> + Send;
}
