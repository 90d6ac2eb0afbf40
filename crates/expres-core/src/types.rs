use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// One of the three asset categories held by a draft.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSlot {
    /// Photo of the vehicle documentation (alternative to the plate number).
    Document,
    /// Voice note describing the problem.
    Audio,
    /// Optional final photo, video or file.
    Media,
}

impl AssetSlot {
    /// All slots in payload order.
    pub const ALL: [AssetSlot; 3] = [AssetSlot::Document, AssetSlot::Audio, AssetSlot::Media];

    /// Field prefix used by the create-incident endpoint.
    pub fn field_prefix(&self) -> &'static str {
        match self {
            AssetSlot::Document => "image",
            AssetSlot::Audio => "audio",
            AssetSlot::Media => "archivo",
        }
    }

    /// Extension used when neither the name nor the mime type yields one.
    pub fn default_extension(&self) -> &'static str {
        match self {
            AssetSlot::Document => "jpg",
            AssetSlot::Audio => "mp4",
            AssetSlot::Media => "jpg",
        }
    }
}

impl fmt::Display for AssetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetSlot::Document => write!(f, "document"),
            AssetSlot::Audio => write!(f, "audio"),
            AssetSlot::Media => write!(f, "media"),
        }
    }
}

/// A device capability guarded by a runtime permission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Microphone,
    Camera,
    Gallery,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Microphone => write!(f, "microphone"),
            Capability::Camera => write!(f, "camera"),
            Capability::Gallery => write!(f, "gallery"),
        }
    }
}

/// Names of the draft fields, used to report which fields a write touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    PlateText,
    DocumentAsset,
    AudioAsset,
    MediaAsset,
}

// =============================================================================
// Identity
// =============================================================================

/// Resolved user identifier supplied by the authentication collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(UserId)
    }
}

// =============================================================================
// Assets
// =============================================================================

/// A captured but not yet uploaded resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftAsset {
    /// Opaque handle understood by the asset reader (usually a URI or path).
    pub content_handle: String,
    /// MIME type reported by the capture capability, if any.
    pub mime_type: Option<String>,
    /// Name reported by the capture capability. Never sent to the backend.
    pub display_name: Option<String>,
    /// Size in bytes reported by the capture capability, if any.
    pub size_bytes: Option<u64>,
}

impl DraftAsset {
    pub fn new(content_handle: impl Into<String>) -> Self {
        Self {
            content_handle: content_handle.into(),
            mime_type: None,
            display_name: None,
            size_bytes: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    /// Infer the file extension for this asset.
    ///
    /// Order: display name, then mime type, then the slot default.
    pub fn infer_extension(&self, slot: AssetSlot) -> String {
        self.display_name
            .as_deref()
            .and_then(extension_from_name)
            .or_else(|| self.mime_type.as_deref().and_then(extension_from_mime))
            .unwrap_or_else(|| slot.default_extension().to_string())
    }

    /// Whether the capture reported a video mime type.
    pub fn is_video(&self) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|m| m.starts_with("video/"))
    }
}

/// Extract a plausible extension from a file name or path.
pub fn extension_from_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 5 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Map a mime type to an extension.
pub fn extension_from_mime(mime: &str) -> Option<String> {
    let mime = mime.split(';').next().unwrap_or(mime).trim().to_ascii_lowercase();
    let ext = match mime.as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/heic" => "heic",
        "image/webp" => "webp",
        "video/mp4" => "mp4",
        "video/quicktime" => "mov",
        "audio/m4a" | "audio/x-m4a" => "m4a",
        "audio/aac" => "aac",
        "audio/mpeg" => "mp3",
        "audio/mp4" => "mp4",
        "application/pdf" => "pdf",
        other if other.starts_with("video/") || other.starts_with("audio/") => "mp4",
        other if other.starts_with("image/") => "jpg",
        _ => return None,
    };
    Some(ext.to_string())
}

// =============================================================================
// Draft
// =============================================================================

/// A whole-field replacement applied to an [`IncidentDraft`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DraftUpdate {
    PlateText(Option<String>),
    DocumentAsset(Option<DraftAsset>),
    AudioAsset(Option<DraftAsset>),
    MediaAsset(Option<DraftAsset>),
}

impl DraftUpdate {
    pub fn field(&self) -> DraftField {
        match self {
            DraftUpdate::PlateText(_) => DraftField::PlateText,
            DraftUpdate::DocumentAsset(_) => DraftField::DocumentAsset,
            DraftUpdate::AudioAsset(_) => DraftField::AudioAsset,
            DraftUpdate::MediaAsset(_) => DraftField::MediaAsset,
        }
    }
}

/// The in-progress, unsubmitted incident.
///
/// Fields are only reachable through [`IncidentDraft::apply`], which keeps the
/// plate number and the documentation photo mutually exclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IncidentDraft {
    plate_text: Option<String>,
    document_asset: Option<DraftAsset>,
    audio_asset: Option<DraftAsset>,
    media_asset: Option<DraftAsset>,
}

impl IncidentDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plate_text(&self) -> Option<&str> {
        self.plate_text.as_deref()
    }

    pub fn document_asset(&self) -> Option<&DraftAsset> {
        self.document_asset.as_ref()
    }

    pub fn audio_asset(&self) -> Option<&DraftAsset> {
        self.audio_asset.as_ref()
    }

    pub fn media_asset(&self) -> Option<&DraftAsset> {
        self.media_asset.as_ref()
    }

    /// The asset held in `slot`, if any.
    pub fn asset(&self, slot: AssetSlot) -> Option<&DraftAsset> {
        match slot {
            AssetSlot::Document => self.document_asset.as_ref(),
            AssetSlot::Audio => self.audio_asset.as_ref(),
            AssetSlot::Media => self.media_asset.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply a whole-field replacement and return every field whose value
    /// changed, including fields cleared by the plate/document exclusion.
    ///
    /// Plate text is upper-cased and trimmed; a blank plate is stored as
    /// absent and leaves the document photo in place.
    pub fn apply(&mut self, update: DraftUpdate) -> Vec<DraftField> {
        let mut changed = Vec::new();
        match update {
            DraftUpdate::PlateText(text) => {
                let plate = text.as_deref().and_then(normalize_plate);
                if plate.is_some() && self.document_asset.take().is_some() {
                    changed.push(DraftField::DocumentAsset);
                }
                if self.plate_text != plate {
                    self.plate_text = plate;
                    changed.push(DraftField::PlateText);
                }
            }
            DraftUpdate::DocumentAsset(asset) => {
                if asset.is_some() && self.plate_text.take().is_some() {
                    changed.push(DraftField::PlateText);
                }
                if self.document_asset != asset {
                    self.document_asset = asset;
                    changed.push(DraftField::DocumentAsset);
                }
            }
            DraftUpdate::AudioAsset(asset) => {
                if self.audio_asset != asset {
                    self.audio_asset = asset;
                    changed.push(DraftField::AudioAsset);
                }
            }
            DraftUpdate::MediaAsset(asset) => {
                if self.media_asset != asset {
                    self.media_asset = asset;
                    changed.push(DraftField::MediaAsset);
                }
            }
        }
        changed
    }
}

/// Upper-case and trim a plate number. Blank input yields `None`.
pub fn normalize_plate(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

// =============================================================================
// Tests
// =============================================================================
