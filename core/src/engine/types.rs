use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::artifact::InvalidArtifact;
use crate::chain::RoleStatus;
use crate::executor::ExecutionOutcome;
use crate::store::ProjectVersion;

/// Result of pushing one raw completion through extraction, validation and
/// execution.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// `task/role` for chained completions, the input name otherwise.
    pub source: String,
    pub valid: usize,
    pub invalid: Vec<InvalidArtifact>,
    pub outcomes: BTreeMap<String, ExecutionOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub project: ProjectVersion,
    pub completions: Vec<RoleStatus>,
    pub batches: Vec<BatchReport>,
}

impl RunReport {
    pub fn begin(project: ProjectVersion) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            finished_at: None,
            project,
            completions: Vec::new(),
            batches: Vec::new(),
        }
    }

    pub fn failed_completions(&self) -> usize {
        self.completions.iter().filter(|c| !c.ok).count()
    }

    pub fn succeeded_completions(&self) -> usize {
        self.completions.len() - self.failed_completions()
    }

    /// Stamps the finish time and logs the run summary.
    pub fn finish(&mut self) {
        let finished = Utc::now();
        let duration_ms = (finished - self.started_at).num_milliseconds();
        self.finished_at = Some(finished);

        let artifacts: usize = self.batches.iter().map(|b| b.outcomes.len()).sum();
        let invalid: usize = self.batches.iter().map(|b| b.invalid.len()).sum();
        tracing::info!(
            target: "chatops.chain",
            run_id = %self.run_id,
            duration_ms,
            succeeded = self.succeeded_completions(),
            failed = self.failed_completions(),
            artifacts,
            invalid,
            project_dir = %self.project.directory.display(),
            "run finished"
        );
    }
}
