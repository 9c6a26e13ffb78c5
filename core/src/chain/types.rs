use serde::Serialize;

use crate::backend::Message;
use crate::error::ChainError;

/// One try at a role completion. Lives only for the duration of the attempt.
#[derive(Debug, Clone)]
pub struct CompletionAttempt {
    pub attempt_number: u32,
    pub prompt: Vec<Message>,
    pub response: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RoleCompletion {
    pub task: String,
    pub role: String,
    pub attempts: u32,
    pub outcome: Result<String, ChainError>,
}

impl RoleCompletion {
    pub fn text(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }
}

#[derive(Debug, Clone)]
pub struct TaskCompletions {
    pub task: String,
    /// In role declaration order, whatever order they finished in.
    pub roles: Vec<RoleCompletion>,
}

/// Serializable view of a role completion for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleStatus {
    pub task: String,
    pub role: String,
    pub attempts: u32,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&RoleCompletion> for RoleStatus {
    fn from(c: &RoleCompletion) -> Self {
        Self {
            task: c.task.clone(),
            role: c.role.clone(),
            attempts: c.attempts,
            ok: c.outcome.is_ok(),
            error: c.outcome.as_ref().err().map(|e| e.to_string()),
        }
    }
}
