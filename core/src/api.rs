//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `chatops_core::api` instead of reaching into internal modules.

pub use crate::artifact::{
    extract, normalize, Artifact, ArtifactCandidate, ArtifactStatus, InvalidArtifact, Normalized,
};
pub use crate::backend::{CompletionBackend, CompletionRequest, Message, MessageRole, Tokenizer};
pub use crate::chain::{
    Chainer, CompletionHistory, RetryStrategyPlugin, RoleCompletion, RoleStatus,
    TaskCompletions, ARTIFACT_PROTOCOL,
};
pub use crate::config::{
    load, load_default, load_from_path, AppConfig, ChainConfig, CompletionConfig, CompletionProvider,
    ExecutorConfig, LoggingConfig, ObjectivePlacement, OutputConfig, RetryConfig,
};
pub use crate::engine::{process_input, run_plans, run_prompt, BatchProcessor, BatchReport, RunReport};
pub use crate::error::{ChainError, CliError, CompletionError, ExecError, InputError, RolesError};
pub use crate::executor::{
    ExecutionOutcome, Executor, NonExecutables, OutcomeStatus, OutputOverride, ProgramOutput,
    ProgramRunner, RunError,
};
pub use crate::plan::{parse_roles, PromptBuilder, RolePlan, RoleSpec, Task, TaskCatalog};
pub use crate::store::{resolve_project_dir, OutputStore, ProjectVersion};
