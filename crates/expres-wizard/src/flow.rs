//! Flow entry and exit.
//!
//! Every explicit entry into the incident flow starts from an empty draft.
//! Leaving for an unrelated screen and coming back resumes the same flow.

use uuid::Uuid;

use crate::sequencer::StepSequencer;
use crate::store::WizardSession;

/// One run of the incident wizard: a session plus its sequencer.
#[derive(Debug, Clone)]
pub struct IncidentFlow {
    sequencer: StepSequencer,
}

impl IncidentFlow {
    fn new() -> Self {
        Self {
            sequencer: StepSequencer::new(WizardSession::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.sequencer.session().id()
    }

    pub fn session(&self) -> &WizardSession {
        self.sequencer.session()
    }

    pub fn sequencer(&self) -> &StepSequencer {
        &self.sequencer
    }

    pub fn sequencer_mut(&mut self) -> &mut StepSequencer {
        &mut self.sequencer
    }
}

/// Owns the active flow, if any.
#[derive(Debug, Default)]
pub struct FlowLauncher {
    current: Option<IncidentFlow>,
}

impl FlowLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the flow from scratch. Any previous flow is disposed and its
    /// draft dropped.
    pub fn start_new(&mut self) -> &mut IncidentFlow {
        if let Some(previous) = self.current.take() {
            previous.session().dispose();
        }
        let flow = IncidentFlow::new();
        tracing::info!(session_id = %flow.id(), "Incident flow started");
        self.current.insert(flow)
    }

    /// Return to the active flow without touching its draft or step.
    pub fn resume(&mut self) -> Option<&mut IncidentFlow> {
        self.current.as_mut()
    }

    pub fn current(&self) -> Option<&IncidentFlow> {
        self.current.as_ref()
    }

    /// Leave the flow. The session is disposed so that late completions
    /// against it become no-ops.
    pub fn exit(&mut self) {
        if let Some(flow) = self.current.take() {
            flow.session().dispose();
            tracing::info!(session_id = %flow.id(), "Incident flow exited");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
