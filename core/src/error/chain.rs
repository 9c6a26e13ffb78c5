use thiserror::Error;

/// Failure reported by a completion backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// Rate limits, timeouts, connection resets: worth another attempt.
    #[error("transient completion failure: {0}")]
    Transient(String),
    #[error("permanent completion failure: {0}")]
    Permanent(String),
}

impl CompletionError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Terminal failure of one role completion. Sibling roles and tasks keep running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("task '{task}' role '{role}' failed after {attempts} attempt(s): {last_error}")]
    RetriesExhausted {
        task: String,
        role: String,
        attempts: u32,
        last_error: String,
    },

    #[error("task '{task}' role '{role}' aborted: {source}")]
    Fatal {
        task: String,
        role: String,
        source: CompletionError,
    },

    #[error("completion produced no artifacts")]
    NoArtifacts,
}
