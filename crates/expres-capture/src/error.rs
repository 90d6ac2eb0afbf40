use expres_core::error::ExpresError;
use expres_core::types::Capability;

/// Errors produced by the capture ports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("{0} permission denied")]
    PermissionDenied(Capability),
    #[error("{capability} capture failed: {reason}")]
    Failed {
        capability: Capability,
        reason: String,
    },
}

impl CaptureError {
    pub fn failed(capability: Capability, reason: impl Into<String>) -> Self {
        CaptureError::Failed {
            capability,
            reason: reason.into(),
        }
    }
}

impl From<CaptureError> for ExpresError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::PermissionDenied(capability) => {
                ExpresError::PermissionDenied { capability }
            }
            CaptureError::Failed { capability, reason } => {
                ExpresError::CaptureFailure { capability, reason }
            }
        }
    }
}
