//! Linear step sequencing with per-step advance predicates.
//!
//! Allowed moves:
//! - Documentation -> Audio (plate number or documentation photo present)
//! - Audio -> Media (voice note present)
//! - any step -> any earlier step (never clears the draft)
//! - finish on Media (requires a resolved identity)

use std::fmt;

use expres_core::types::{IncidentDraft, UserId};

use crate::error::WizardError;
use crate::store::WizardSession;

/// A step of the incident wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WizardStep {
    /// Plate number or documentation photo.
    Documentation,
    /// Voice note.
    Audio,
    /// Optional attachment and submission.
    Media,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardStep::Documentation => write!(f, "documentation"),
            WizardStep::Audio => write!(f, "audio"),
            WizardStep::Media => write!(f, "media"),
        }
    }
}

impl WizardStep {
    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Documentation => Some(WizardStep::Audio),
            WizardStep::Audio => Some(WizardStep::Media),
            WizardStep::Media => None,
        }
    }

    pub fn previous(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Documentation => None,
            WizardStep::Audio => Some(WizardStep::Documentation),
            WizardStep::Media => Some(WizardStep::Audio),
        }
    }

    /// Why the draft does not yet allow leaving this step forward, if it
    /// does not.
    pub fn blocker(&self, draft: &IncidentDraft) -> Option<&'static str> {
        match self {
            WizardStep::Documentation => {
                let has_plate = draft.plate_text().is_some_and(|p| !p.trim().is_empty());
                if has_plate || draft.document_asset().is_some() {
                    None
                } else {
                    Some("Introduce la matrícula o adjunta una foto de la documentación.")
                }
            }
            WizardStep::Audio => {
                if draft.audio_asset().is_some() {
                    None
                } else {
                    Some("Graba una nota de audio para continuar.")
                }
            }
            WizardStep::Media => None,
        }
    }

    pub fn is_satisfied(&self, draft: &IncidentDraft) -> bool {
        self.blocker(draft).is_none()
    }
}

/// What the current step's navigation controls should allow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEligibility {
    pub step: WizardStep,
    pub can_go_next: bool,
    pub can_finish: bool,
    /// User-facing reason the forward control is disabled.
    pub blocker: Option<String>,
}

/// Walks a single flow through its steps.
#[derive(Debug, Clone)]
pub struct StepSequencer {
    session: WizardSession,
    current: WizardStep,
}

impl StepSequencer {
    /// Start at the first step of `session`.
    pub fn new(session: WizardSession) -> Self {
        Self {
            session,
            current: WizardStep::Documentation,
        }
    }

    pub fn current(&self) -> WizardStep {
        self.current
    }

    pub fn session(&self) -> &WizardSession {
        &self.session
    }

    /// Check the current step's predicate against the latest draft.
    pub fn check_advance(&self) -> Result<(), WizardError> {
        let draft = self.session.draft();
        match self.current.blocker(&draft) {
            Some(reason) => Err(WizardError::StepIncomplete {
                step: self.current,
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Move to the next step if the current one is complete.
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        let target = self
            .current
            .next()
            .ok_or(WizardError::NoNextStep(self.current))?;
        self.check_advance()?;
        tracing::debug!(
            session_id = %self.session.id(),
            from = %self.current,
            to = %target,
            "Wizard advanced"
        );
        self.current = target;
        Ok(target)
    }

    /// Move one step back. Returns `None` when leaving the flow from the first
    /// step; the draft is untouched either way.
    pub fn back(&mut self) -> Option<WizardStep> {
        let target = self.current.previous()?;
        tracing::debug!(
            session_id = %self.session.id(),
            from = %self.current,
            to = %target,
            "Wizard went back"
        );
        self.current = target;
        Some(target)
    }

    /// Navigate directly to `target`. Backward moves are unrestricted;
    /// forward moves may only reach the immediately next step.
    pub fn jump_to(&mut self, target: WizardStep) -> Result<WizardStep, WizardError> {
        if target <= self.current {
            self.current = target;
            return Ok(target);
        }
        if self.current.next() != Some(target) {
            return Err(WizardError::SkipForward {
                from: self.current,
                to: target,
            });
        }
        self.next()
    }

    /// Gate for the finish action: only on the last step, and only with a
    /// resolved identity.
    pub fn finish_gate(&self, identity: Option<UserId>) -> Result<UserId, WizardError> {
        if self.current != WizardStep::Media {
            return Err(WizardError::NotOnFinalStep(self.current));
        }
        identity.ok_or(WizardError::IdentityMissing)
    }

    pub fn eligibility(&self, identity: Option<UserId>) -> StepEligibility {
        let draft = self.session.draft();
        let blocker = self.current.blocker(&draft).map(str::to_string);
        StepEligibility {
            step: self.current,
            can_go_next: self.current.next().is_some() && blocker.is_none(),
            can_finish: self.current == WizardStep::Media && identity.is_some(),
            blocker,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use expres_core::types::{DraftAsset, DraftUpdate};

    fn sequencer() -> StepSequencer {
        StepSequencer::new(WizardSession::new())
    }

    fn voice_note() -> DraftAsset {
        DraftAsset::new("file:///tmp/audio.m4a").with_mime_type("audio/m4a")
    }

    #[test]
    fn test_step_order() {
        assert_eq!(WizardStep::Documentation.next(), Some(WizardStep::Audio));
        assert_eq!(WizardStep::Audio.next(), Some(WizardStep::Media));
        assert_eq!(WizardStep::Media.next(), None);
        assert_eq!(WizardStep::Documentation.previous(), None);
        assert_eq!(WizardStep::Media.previous(), Some(WizardStep::Audio));
    }

    #[test]
    fn test_documentation_requires_plate_or_photo() {
        let mut seq = sequencer();
        assert!(matches!(
            seq.next(),
            Err(WizardError::StepIncomplete { step: WizardStep::Documentation, .. })
        ));
        assert_eq!(seq.current(), WizardStep::Documentation);

        seq.session()
            .set_field(DraftUpdate::PlateText(Some("1234ABC".into())));
        assert_eq!(seq.next().unwrap(), WizardStep::Audio);
    }

    #[test]
    fn test_documentation_accepts_photo() {
        let mut seq = sequencer();
        seq.session().set_field(DraftUpdate::DocumentAsset(Some(
            DraftAsset::new("content://doc").with_mime_type("image/jpeg"),
        )));
        assert_eq!(seq.next().unwrap(), WizardStep::Audio);
    }

    #[test]
    fn test_audio_requires_voice_note() {
        let mut seq = sequencer();
        seq.session()
            .set_field(DraftUpdate::PlateText(Some("1234ABC".into())));
        seq.next().unwrap();

        let err = seq.next().unwrap_err();
        assert!(matches!(err, WizardError::StepIncomplete { step: WizardStep::Audio, .. }));

        seq.session()
            .set_field(DraftUpdate::AudioAsset(Some(voice_note())));
        assert_eq!(seq.next().unwrap(), WizardStep::Media);
        assert_eq!(seq.next(), Err(WizardError::NoNextStep(WizardStep::Media)));
    }

    #[test]
    fn test_back_never_clears() {
        let mut seq = sequencer();
        seq.session()
            .set_field(DraftUpdate::PlateText(Some("1234ABC".into())));
        seq.next().unwrap();
        seq.session()
            .set_field(DraftUpdate::AudioAsset(Some(voice_note())));
        seq.next().unwrap();

        assert_eq!(seq.back(), Some(WizardStep::Audio));
        assert_eq!(seq.back(), Some(WizardStep::Documentation));
        assert_eq!(seq.back(), None);

        let draft = seq.session().draft();
        assert_eq!(draft.plate_text(), Some("1234ABC"));
        assert!(draft.audio_asset().is_some());
    }

    #[test]
    fn test_jump_rules() {
        let mut seq = sequencer();
        seq.session()
            .set_field(DraftUpdate::PlateText(Some("1234ABC".into())));
        seq.session()
            .set_field(DraftUpdate::AudioAsset(Some(voice_note())));

        assert_eq!(
            seq.jump_to(WizardStep::Media),
            Err(WizardError::SkipForward {
                from: WizardStep::Documentation,
                to: WizardStep::Media
            })
        );
        assert_eq!(seq.jump_to(WizardStep::Audio).unwrap(), WizardStep::Audio);
        assert_eq!(seq.jump_to(WizardStep::Media).unwrap(), WizardStep::Media);
        assert_eq!(
            seq.jump_to(WizardStep::Documentation).unwrap(),
            WizardStep::Documentation
        );
        assert_eq!(seq.jump_to(WizardStep::Documentation).unwrap(), WizardStep::Documentation);
    }

    #[test]
    fn test_finish_gate() {
        let mut seq = sequencer();
        assert_eq!(
            seq.finish_gate(Some(UserId(1))),
            Err(WizardError::NotOnFinalStep(WizardStep::Documentation))
        );

        seq.session()
            .set_field(DraftUpdate::PlateText(Some("1234ABC".into())));
        seq.next().unwrap();
        seq.session()
            .set_field(DraftUpdate::AudioAsset(Some(voice_note())));
        seq.next().unwrap();

        assert_eq!(seq.finish_gate(None), Err(WizardError::IdentityMissing));
        assert_eq!(seq.finish_gate(Some(UserId(7))).unwrap(), UserId(7));
    }

    #[test]
    fn test_eligibility_tracks_draft() {
        let seq = sequencer();
        let before = seq.eligibility(Some(UserId(1)));
        assert!(!before.can_go_next);
        assert!(!before.can_finish);
        assert!(before.blocker.is_some());

        seq.session()
            .set_field(DraftUpdate::PlateText(Some("1234ABC".into())));
        let after = seq.eligibility(Some(UserId(1)));
        assert!(after.can_go_next);
        assert!(after.blocker.is_none());

        // Clearing the only satisfying field disables it again.
        seq.session().set_field(DraftUpdate::PlateText(None));
        assert!(!seq.eligibility(None).can_go_next);
    }
}
