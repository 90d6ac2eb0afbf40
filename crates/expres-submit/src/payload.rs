//! Wire types of the create-incident endpoint.

use serde::{Deserialize, Serialize};

use expres_core::types::{IncidentDraft, UserId};

use crate::encoder::{EncodedAsset, EncodedAssets};

/// Request body of `POST Incidencias/IncidenciaRapida`.
///
/// Absent values are sent as explicit `null`s. Built fresh for every attempt
/// and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    #[serde(rename = "idUsuario")]
    pub user_id: UserId,
    #[serde(rename = "matricula")]
    pub plate: Option<String>,
    #[serde(rename = "image")]
    pub document: Option<String>,
    #[serde(rename = "imageName")]
    pub document_name: Option<String>,
    pub audio: Option<String>,
    #[serde(rename = "audioName")]
    pub audio_name: Option<String>,
    #[serde(rename = "archivo")]
    pub media: Option<String>,
    #[serde(rename = "archivoName")]
    pub media_name: Option<String>,
}

fn split(asset: Option<EncodedAsset>) -> (Option<String>, Option<String>) {
    match asset {
        Some(a) => (Some(a.content), Some(a.filename)),
        None => (None, None),
    }
}

impl SubmissionPayload {
    pub fn assemble(user_id: UserId, draft: &IncidentDraft, encoded: EncodedAssets) -> Self {
        let (document, document_name) = split(encoded.document);
        let (audio, audio_name) = split(encoded.audio);
        let (media, media_name) = split(encoded.media);
        Self {
            user_id,
            plate: draft.plate_text().map(str::to_string),
            document,
            document_name,
            audio,
            audio_name,
            media,
            media_name,
        }
    }
}

/// Response body of the create-incident endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIncidentResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl CreateIncidentResponse {
    /// Server message, if it sent a non-blank one.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}
