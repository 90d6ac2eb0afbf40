//! Error types for the wizard.

use expres_core::error::ExpresError;

use crate::sequencer::WizardStep;

/// Errors raised while moving through the wizard.
///
/// None of these have side effects: the draft and the current step are left
/// as they were.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("step {step} is incomplete: {reason}")]
    StepIncomplete { step: WizardStep, reason: String },
    #[error("cannot skip from {from} to {to}")]
    SkipForward { from: WizardStep, to: WizardStep },
    #[error("{0} is the last step")]
    NoNextStep(WizardStep),
    #[error("finish is only available on the last step, current step is {0}")]
    NotOnFinalStep(WizardStep),
    #[error("no resolved user identity")]
    IdentityMissing,
}

impl From<WizardError> for ExpresError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::StepIncomplete { reason, .. } => ExpresError::Validation(reason),
            WizardError::IdentityMissing => ExpresError::Precondition(err.to_string()),
            other => ExpresError::Validation(other.to_string()),
        }
    }
}
