//! Expres Submit crate - asset encoding and incident submission.
//!
//! The `AssetEncoder` turns draft assets into base64 content with fresh
//! filenames, enforcing the media size cap. The `SubmissionCoordinator`
//! assembles the payload, sends exactly one create-incident request through
//! an `IncidentApi`, and resets the draft only on confirmed success.

pub mod client;
pub mod coordinator;
pub mod encoder;
pub mod payload;

pub use client::{ApiError, HttpIncidentApi, IncidentApi};
pub use coordinator::{SubmissionCoordinator, SubmissionError, SubmissionOutcome};
pub use encoder::{AssetEncoder, EncodedAsset, EncodedAssets, EncodingError};
pub use payload::{CreateIncidentResponse, SubmissionPayload};
