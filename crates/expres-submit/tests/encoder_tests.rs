//! Encoder properties over assets produced by the capture side.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use expres_audio::{AudioCaptureController, MockRecorder};
use expres_capture::{MemoryAssetReader, MockPermissionGate};
use expres_core::types::{AssetSlot, DraftAsset, DraftUpdate};
use expres_submit::AssetEncoder;
use expres_wizard::WizardSession;

// =============================================================================
// Helpers
// =============================================================================

fn photo_and_video(reader: &MemoryAssetReader) -> WizardSession {
    reader.insert("content://docs/1", vec![1, 2, 3, 4, 5]);
    reader.insert("content://media/video/7", vec![9; 2048]);
    let session = WizardSession::new();
    session.set_field(DraftUpdate::DocumentAsset(Some(
        DraftAsset::new("content://docs/1").with_mime_type("image/jpeg"),
    )));
    session.set_field(DraftUpdate::MediaAsset(Some(
        DraftAsset::new("content://media/video/7").with_mime_type("video/mp4"),
    )));
    session
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn recorded_clip_round_trips_through_encoder() {
    const CLIP_BYTES: usize = 48_000;
    let reader = MemoryAssetReader::new();
    reader.insert("file:///cache/take.m4a", vec![0x5a; CLIP_BYTES]);

    let session = WizardSession::new();
    let recorder = MockRecorder::with_clip("file:///cache/take.m4a", Some(CLIP_BYTES as u64));
    let gate = MockPermissionGate::granting_all();
    let controller = AudioCaptureController::spawn(recorder, gate, session.clone());
    controller.start().await.unwrap();
    let asset = controller.stop().await.unwrap().expect("clip finalized");
    assert_eq!(session.draft().audio_asset(), Some(&asset));

    let encoded = AssetEncoder::new(reader).encode(&session.draft()).await.unwrap();
    let audio = encoded.get(AssetSlot::Audio).unwrap();
    let decoded = STANDARD.decode(&audio.content).unwrap();
    assert_eq!(decoded.len(), CLIP_BYTES);
    assert!(audio.filename.ends_with(".m4a"));
}

#[tokio::test]
async fn encoding_twice_keeps_content_and_renames() {
    let reader = MemoryAssetReader::new();
    let session = photo_and_video(&reader);
    let encoder = AssetEncoder::new(reader.clone());

    let first = encoder.encode(&session.draft()).await.unwrap();
    let second = encoder.encode(&session.draft()).await.unwrap();

    for slot in [AssetSlot::Document, AssetSlot::Media] {
        let (a, b) = (first.get(slot).unwrap(), second.get(slot).unwrap());
        assert_eq!(a.content, b.content);
        assert_ne!(a.filename, b.filename);
    }
    assert!(first.get(AssetSlot::Audio).is_none());
    assert_eq!(reader.reads(), 4);
}

#[tokio::test]
async fn extensions_follow_asset_metadata() {
    let reader = MemoryAssetReader::new();
    let session = photo_and_video(&reader);

    let encoded = AssetEncoder::new(reader).encode(&session.draft()).await.unwrap();
    assert!(encoded.get(AssetSlot::Document).unwrap().filename.ends_with(".jpg"));
    assert!(encoded.get(AssetSlot::Media).unwrap().filename.ends_with(".mp4"));
}
