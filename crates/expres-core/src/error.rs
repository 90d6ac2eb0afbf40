use thiserror::Error;

use crate::types::{AssetSlot, Capability};

/// Top-level error type for the express incident pipeline.
///
/// Each subsystem crate defines its own error type and implements
/// `From<SubsystemError> for ExpresError` so that `?` works across crate
/// boundaries. The variants mirror the failure taxonomy surfaced to users.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExpresError {
    #[error("Permission denied: {capability}")]
    PermissionDenied { capability: Capability },

    #[error("Capture failure ({capability}): {reason}")]
    CaptureFailure {
        capability: Capability,
        reason: String,
    },

    #[error("Validation failure: {0}")]
    Validation(String),

    #[error("Encoding failure on {slot} slot: {reason}")]
    Encoding { slot: AssetSlot, reason: String },

    #[error("Submission failure: {0}")]
    Submission(String),

    #[error("Precondition failure: {0}")]
    Precondition(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ExpresError {
    /// Whether the user can recover by retrying with the draft intact.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ExpresError::PermissionDenied { .. } => true,
            ExpresError::CaptureFailure { .. } => true,
            ExpresError::Validation(_) => true,
            ExpresError::Encoding { .. } => true,
            ExpresError::Submission(_) => true,
            // Needs the auth collaborator to resolve an identity first.
            ExpresError::Precondition(_) => false,
            ExpresError::Config(_) => false,
            ExpresError::Io(_) => false,
            ExpresError::Serialization(_) => false,
        }
    }

    /// Message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ExpresError::PermissionDenied { capability } => match capability {
                Capability::Microphone => "No se puede grabar sin permiso.".to_string(),
                Capability::Camera => "No se puede usar la cámara.".to_string(),
                Capability::Gallery => "No se puede acceder a galería.".to_string(),
            },
            ExpresError::CaptureFailure { capability, .. } => match capability {
                Capability::Microphone => "No se pudo completar la grabación.".to_string(),
                Capability::Camera => "No se pudo iniciar la cámara.".to_string(),
                Capability::Gallery => "No se pudo abrir la galería.".to_string(),
            },
            ExpresError::Validation(msg) => msg.clone(),
            // Already user-facing when produced, show them verbatim.
            ExpresError::Encoding { reason, .. } => reason.clone(),
            ExpresError::Submission(msg) => msg.clone(),
            ExpresError::Precondition(_) => "ID de usuario no encontrado.".to_string(),
            ExpresError::Config(_) => "Error de configuración.".to_string(),
            ExpresError::Io(_) => "Error de acceso a archivos.".to_string(),
            ExpresError::Serialization(_) => "Respuesta inesperada del servidor.".to_string(),
        }
    }
}

impl From<toml::de::Error> for ExpresError {
    fn from(err: toml::de::Error) -> Self {
        ExpresError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ExpresError {
    fn from(err: toml::ser::Error) -> Self {
        ExpresError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ExpresError {
    fn from(err: serde_json::Error) -> Self {
        ExpresError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for pipeline operations.
pub type Result<T> = std::result::Result<T, ExpresError>;
