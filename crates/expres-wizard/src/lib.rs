//! Expres Wizard crate - session-scoped draft store and step sequencing.
//!
//! A `WizardSession` is created when an incident flow starts and is shared by
//! every step of that flow. The `StepSequencer` walks the linear
//! Documentation -> Audio -> Media path, gating forward moves on the draft
//! contents. `FlowLauncher` owns the current flow so that leaving for an
//! unrelated screen preserves the draft while starting a new flow does not.

pub mod error;
pub mod flow;
pub mod sequencer;
pub mod store;

pub use error::WizardError;
pub use flow::{FlowLauncher, IncidentFlow};
pub use sequencer::{StepEligibility, StepSequencer, WizardStep};
pub use store::WizardSession;
