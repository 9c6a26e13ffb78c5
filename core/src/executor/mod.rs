//! Artifact execution: save-only for non-executable types, otherwise run as
//! `{app_type} -c {content}` and persist on success.

pub mod engine;
pub mod policy;
pub mod traits;
pub mod types;

pub use engine::{relative_outcome_path, Executor};
pub use policy::{NonExecutables, NON_EXECUTABLES};
pub use traits::{ProgramOutput, ProgramRunner, RunError};
pub use types::{ExecutionOutcome, OutcomeStatus, OutputOverride, ResolvedOverride};
