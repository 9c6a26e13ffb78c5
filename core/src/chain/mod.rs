//! Completion chaining: concurrent, retrying role completions seeded with
//! the run's latest accepted output.

mod chainer;
mod history;
mod protocol;
mod traits;
mod types;

pub use chainer::{Chainer, DEFAULT_TEMPERATURE};
pub use history::CompletionHistory;
pub use protocol::{previous_completion_hint, ARTIFACT_PROTOCOL};
pub use traits::RetryStrategyPlugin;
pub use types::{CompletionAttempt, RoleCompletion, RoleStatus, TaskCompletions};
