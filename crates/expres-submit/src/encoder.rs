//! Asset encoder.
//!
//! Turns the assets of a draft into base64 content with freshly generated
//! filenames. Size caps are checked on declared sizes for every slot before
//! any read starts, then again on the bytes actually read. Reads run
//! concurrently and the first failure aborts the whole batch.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use uuid::Uuid;

use expres_capture::AssetReader;
use expres_core::error::ExpresError;
use expres_core::limits::MAX_MEDIA_BYTES;
use expres_core::types::{AssetSlot, DraftAsset, IncidentDraft};

/// Errors produced while encoding a draft. Each one names the failing slot.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("{slot} asset is {size} bytes, limit is {limit}")]
    TooLarge { slot: AssetSlot, size: u64, limit: u64 },
    #[error("failed to read {slot} asset: {source}")]
    Read {
        slot: AssetSlot,
        #[source]
        source: std::io::Error,
    },
}

impl EncodingError {
    pub fn slot(&self) -> AssetSlot {
        match self {
            EncodingError::TooLarge { slot, .. } | EncodingError::Read { slot, .. } => *slot,
        }
    }

    /// Text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            EncodingError::TooLarge { .. } => "El archivo final excede los 100 MB.".to_string(),
            EncodingError::Read { slot, .. } => {
                format!("Error al procesar archivo {}.", slot.field_prefix())
            }
        }
    }
}

impl From<EncodingError> for ExpresError {
    fn from(err: EncodingError) -> Self {
        ExpresError::Encoding {
            slot: err.slot(),
            reason: err.user_message(),
        }
    }
}

/// Size cap for `slot`, if it has one.
pub fn size_limit(slot: AssetSlot) -> Option<u64> {
    match slot {
        AssetSlot::Media => Some(MAX_MEDIA_BYTES),
        AssetSlot::Document | AssetSlot::Audio => None,
    }
}

fn check_size(slot: AssetSlot, size: u64) -> Result<(), EncodingError> {
    match size_limit(slot) {
        Some(limit) if size > limit => Err(EncodingError::TooLarge { slot, size, limit }),
        _ => Ok(()),
    }
}

/// Transport-ready form of one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAsset {
    /// Base64 (standard alphabet, padded) of the file contents.
    pub content: String,
    /// `<uuid>.<ext>`, generated per attempt.
    pub filename: String,
}

/// Encoded assets of one draft, by slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedAssets {
    pub document: Option<EncodedAsset>,
    pub audio: Option<EncodedAsset>,
    pub media: Option<EncodedAsset>,
}

impl EncodedAssets {
    pub fn get(&self, slot: AssetSlot) -> Option<&EncodedAsset> {
        match slot {
            AssetSlot::Document => self.document.as_ref(),
            AssetSlot::Audio => self.audio.as_ref(),
            AssetSlot::Media => self.media.as_ref(),
        }
    }
}

/// Encodes draft assets read through an [`AssetReader`].
///
/// Holds no mutable state; encoding the same draft twice reads the same bytes
/// and produces new filenames.
#[derive(Debug, Clone)]
pub struct AssetEncoder<R> {
    reader: R,
}

impl<R: AssetReader> AssetEncoder<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Encode every present asset of `draft`.
    pub async fn encode(&self, draft: &IncidentDraft) -> Result<EncodedAssets, EncodingError> {
        for slot in AssetSlot::ALL {
            if let Some(size) = draft.asset(slot).and_then(|a| a.size_bytes) {
                check_size(slot, size).inspect_err(|e| {
                    tracing::warn!(%slot, size, error = %e, "Asset rejected before read");
                })?;
            }
        }

        let (document, audio, media) = tokio::try_join!(
            self.encode_slot(AssetSlot::Document, draft.document_asset()),
            self.encode_slot(AssetSlot::Audio, draft.audio_asset()),
            self.encode_slot(AssetSlot::Media, draft.media_asset()),
        )?;

        Ok(EncodedAssets {
            document,
            audio,
            media,
        })
    }

    async fn encode_slot(
        &self,
        slot: AssetSlot,
        asset: Option<&DraftAsset>,
    ) -> Result<Option<EncodedAsset>, EncodingError> {
        let Some(asset) = asset else {
            return Ok(None);
        };

        let bytes = self
            .reader
            .read(&asset.content_handle)
            .await
            .map_err(|source| {
                tracing::warn!(%slot, handle = %asset.content_handle, error = %source, "Asset read failed");
                EncodingError::Read { slot, source }
            })?;
        check_size(slot, bytes.len() as u64)?;

        let filename = format!("{}.{}", Uuid::new_v4(), asset.infer_extension(slot));
        tracing::debug!(%slot, bytes = bytes.len(), filename = %filename, "Asset encoded");
        Ok(Some(EncodedAsset {
            content: STANDARD.encode(&bytes),
            filename,
        }))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use expres_capture::MemoryAssetReader;
    use expres_core::types::DraftUpdate;

    fn draft_with(updates: Vec<DraftUpdate>) -> IncidentDraft {
        let mut draft = IncidentDraft::new();
        for update in updates {
            draft.apply(update);
        }
        draft
    }

    #[test]
    fn test_size_limits() {
        assert_eq!(size_limit(AssetSlot::Media), Some(MAX_MEDIA_BYTES));
        assert_eq!(size_limit(AssetSlot::Document), None);
        assert!(check_size(AssetSlot::Media, MAX_MEDIA_BYTES).is_ok());
        assert!(check_size(AssetSlot::Media, MAX_MEDIA_BYTES + 1).is_err());
        assert!(check_size(AssetSlot::Audio, u64::MAX).is_ok());
    }

    #[test]
    fn test_user_messages() {
        let err = EncodingError::TooLarge {
            slot: AssetSlot::Media,
            size: 1,
            limit: 0,
        };
        assert_eq!(err.user_message(), "El archivo final excede los 100 MB.");

        let err = EncodingError::Read {
            slot: AssetSlot::Audio,
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.user_message(), "Error al procesar archivo audio.");
        let top: ExpresError = err.into();
        assert!(matches!(top, ExpresError::Encoding { slot: AssetSlot::Audio, .. }));
    }

    #[tokio::test]
    async fn test_empty_draft_encodes_to_nothing() {
        let encoder = AssetEncoder::new(MemoryAssetReader::new());
        let encoded = encoder.encode(&IncidentDraft::new()).await.unwrap();
        assert_eq!(encoded, EncodedAssets::default());
        assert_eq!(encoder.reader().reads(), 0);
    }

    #[tokio::test]
    async fn test_encodes_content_and_filename() {
        let reader = MemoryAssetReader::new();
        reader.insert("content://doc", b"hello".to_vec());
        let draft = draft_with(vec![DraftUpdate::DocumentAsset(Some(
            DraftAsset::new("content://doc").with_display_name("Scan.PNG"),
        ))]);

        let encoded = AssetEncoder::new(reader).encode(&draft).await.unwrap();
        let document = encoded.document.unwrap();
        assert_eq!(document.content, "aGVsbG8=");
        assert!(document.filename.ends_with(".png"));
        let stem = document.filename.trim_end_matches(".png");
        assert!(Uuid::parse_str(stem).is_ok());
        assert!(encoded.audio.is_none());
    }

    #[tokio::test]
    async fn test_declared_oversize_rejected_before_any_read() {
        let reader = MemoryAssetReader::new();
        reader.insert("doc", vec![0; 10]);
        reader.insert("big", vec![0; 10]);
        let draft = draft_with(vec![
            DraftUpdate::DocumentAsset(Some(DraftAsset::new("doc"))),
            DraftUpdate::MediaAsset(Some(
                DraftAsset::new("big").with_size(MAX_MEDIA_BYTES + 1),
            )),
        ]);

        let encoder = AssetEncoder::new(reader);
        let err = encoder.encode(&draft).await.unwrap_err();
        assert_eq!(err.slot(), AssetSlot::Media);
        assert!(matches!(err, EncodingError::TooLarge { .. }));
        assert_eq!(encoder.reader().reads(), 0);
    }

    #[tokio::test]
    async fn test_read_failure_names_slot() {
        let reader = MemoryAssetReader::new();
        reader.insert("doc", vec![1, 2, 3]);
        let draft = draft_with(vec![
            DraftUpdate::DocumentAsset(Some(DraftAsset::new("doc"))),
            DraftUpdate::AudioAsset(Some(DraftAsset::new("missing.m4a"))),
        ]);

        let err = AssetEncoder::new(reader).encode(&draft).await.unwrap_err();
        assert_eq!(err.slot(), AssetSlot::Audio);
        assert!(matches!(err, EncodingError::Read { .. }));
    }

    /// Serves a media file one byte over the cap without declaring its size.
    struct OversizedMediaReader;

    impl AssetReader for OversizedMediaReader {
        async fn read(&self, content_handle: &str) -> std::io::Result<Vec<u8>> {
            match content_handle {
                "video" => Ok(vec![0; MAX_MEDIA_BYTES as usize + 1]),
                _ => Ok(vec![1, 2, 3]),
            }
        }
    }

    #[tokio::test]
    async fn test_undeclared_oversize_rejected_after_read() {
        let draft = draft_with(vec![
            DraftUpdate::DocumentAsset(Some(DraftAsset::new("doc"))),
            DraftUpdate::AudioAsset(Some(DraftAsset::new("sound.m4a"))),
            DraftUpdate::MediaAsset(Some(DraftAsset::new("video").with_mime_type("video/mp4"))),
        ]);
        assert!(draft.media_asset().unwrap().size_bytes.is_none());

        let result = AssetEncoder::new(OversizedMediaReader).encode(&draft).await;
        match result {
            Err(EncodingError::TooLarge { slot, size, limit }) => {
                assert_eq!(slot, AssetSlot::Media);
                assert_eq!(size, MAX_MEDIA_BYTES + 1);
                assert_eq!(limit, MAX_MEDIA_BYTES);
            }
            other => panic!("expected media to be rejected, got {:?}", other.map(|_| ())),
        }
    }
}
