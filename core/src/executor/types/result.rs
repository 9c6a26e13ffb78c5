use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Non-executable, or test mode: written without running.
    SavedDirectly,
    /// Ran and exited cleanly; persisted.
    Completed,
    /// Non-zero exit, spawn error or write error.
    Failed,
    /// The interpreter named by `app_type` could not be found.
    LanguageNotInstalled,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SavedDirectly => "saved_directly",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::LanguageNotInstalled => "language_not_installed",
        }
    }
}

/// What happened to one artifact of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub artifact_name: String,
    pub status: OutcomeStatus,
    /// Captured stdout on success, an error message otherwise.
    pub result: String,
    pub app_type: String,
    /// File written for this artifact, if any.
    pub path: Option<PathBuf>,
}
