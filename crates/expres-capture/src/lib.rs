//! Expres Capture crate - capability ports for camera, gallery, permissions
//! and asset reads, plus the document and media step actions built on them.
//!
//! Hardware access is never implemented here: every capability is an
//! injected port returning an asset descriptor, a cancellation, or an error.
//! Mock implementations are provided for tests and for the CLI host.

pub mod actions;
pub mod error;
pub mod mock;
pub mod ports;
pub mod reader;

pub use actions::CaptureActions;
pub use error::CaptureError;
pub use mock::{MemoryAssetReader, MockCamera, MockGallery, MockPermissionGate};
pub use ports::{
    AssetReader, Camera, CaptureOutcome, GalleryPicker, MediaKind, PermissionGate,
    PermissionStatus,
};
pub use reader::FsAssetReader;
