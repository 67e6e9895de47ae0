//! CACAO/Ermack playbook export.

pub mod playbook;
pub mod step;

pub use playbook::{CacaoPublisher, ERMACK_SPEC_VERSION, Playbook, Workflow};
pub use step::{ActionStep, StepKind, WorkflowStep};
