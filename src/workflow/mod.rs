pub mod policy;
pub mod sequencer;
pub mod types;

pub use policy::PollPolicy;
pub use sequencer::DispatchSequencer;
pub use types::{RunOutcome, RunStatus, WorkflowResult};
