use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::artifact::{Artifact, UNSTRUCTURED_PATH};
use crate::error::ExecError;
use crate::store::OutputStore;

use super::policy::NonExecutables;
use super::traits::{ProgramRunner, RunError};
use super::types::{ExecutionOutcome, OutcomeStatus, OutputOverride, ResolvedOverride};

/// Persists or runs validated artifacts against one versioned output store.
///
/// Artifacts of a batch are handled sequentially in input order, so when two
/// artifacts share a name the later one wins, both on disk and in the
/// returned outcome map.
pub struct Executor {
    store: OutputStore,
    runner: Arc<dyn ProgramRunner>,
    non_executables: NonExecutables,
    unstructured_seq: usize,
}

impl Executor {
    pub fn new(store: OutputStore, runner: Arc<dyn ProgramRunner>) -> Self {
        Self {
            store,
            runner,
            non_executables: NonExecutables::default(),
            unstructured_seq: 0,
        }
    }

    pub fn with_non_executables(mut self, non_executables: NonExecutables) -> Self {
        self.non_executables = non_executables;
        self
    }

    pub fn store(&self) -> &OutputStore {
        &self.store
    }

    /// Handles one batch. A partial `output_override` is rejected before any
    /// artifact is touched; every other problem is reported per artifact.
    pub async fn execute(
        &mut self,
        artifacts: &[Artifact],
        output_override: &OutputOverride,
        test_mode: bool,
    ) -> Result<BTreeMap<String, ExecutionOutcome>, ExecError> {
        let destination = output_override.resolve()?;
        let mut outcomes = BTreeMap::new();

        for artifact in artifacts {
            let name = self.outcome_name(artifact);
            let outcome = self
                .execute_one(&name, artifact, destination.as_ref(), test_mode)
                .await;

            tracing::info!(
                target: "chatops.exec",
                artifact = %name,
                app_type = %outcome.app_type,
                status = outcome.status.as_str(),
                path = ?outcome.path,
                "artifact handled"
            );
            if outcomes.insert(name.clone(), outcome).is_some() {
                tracing::debug!(target: "chatops.exec", artifact = %name, "replaced earlier outcome");
            }
        }

        Ok(outcomes)
    }

    fn outcome_name(&mut self, artifact: &Artifact) -> String {
        if artifact.name.trim().is_empty() {
            self.unstructured_seq += 1;
            format!("unstructured_file_{}", self.unstructured_seq)
        } else {
            artifact.name.clone()
        }
    }

    async fn execute_one(
        &self,
        name: &str,
        artifact: &Artifact,
        destination: Option<&ResolvedOverride>,
        test_mode: bool,
    ) -> ExecutionOutcome {
        let app_type = artifact.app_type.trim().to_lowercase();
        let mut outcome = ExecutionOutcome {
            artifact_name: name.to_string(),
            status: OutcomeStatus::SavedDirectly,
            result: String::new(),
            app_type: app_type.clone(),
            path: None,
        };

        if test_mode || self.non_executables.contains(&app_type) {
            self.persist(&mut outcome, &artifact.path, name, &app_type, &artifact.content);
            return outcome;
        }

        match self.runner.run(&app_type, &artifact.content).await {
            Ok(output) if output.success() => {
                outcome.status = OutcomeStatus::Completed;
                outcome.result = output.stdout.trim().to_string();
                let (file_name, file_type) = match destination {
                    Some(d) => (d.file_name.as_str(), d.app_type.as_str()),
                    None => (name, app_type.as_str()),
                };
                self.persist(&mut outcome, &artifact.path, file_name, file_type, &artifact.content);
            }
            Ok(output) => {
                outcome.status = OutcomeStatus::Failed;
                outcome.result = format!("Error executing code: {}", output.stderr.trim());
            }
            Err(RunError::NotInstalled(_)) => {
                outcome.status = OutcomeStatus::LanguageNotInstalled;
                outcome.result = format!("Error: {app_type} is not installed.");
            }
            Err(err) => {
                outcome.status = OutcomeStatus::Failed;
                outcome.result = format!("Error executing code: {err}");
            }
        }
        outcome
    }

    /// Writes the artifact and records the path. A write error turns the
    /// outcome into `failed` instead of aborting the batch.
    fn persist(
        &self,
        outcome: &mut ExecutionOutcome,
        relative_path: &str,
        file_name: &str,
        app_type: &str,
        content: &str,
    ) {
        match self.store.save(relative_path, file_name, app_type, content) {
            Ok(path) => outcome.path = Some(path),
            Err(err) => {
                tracing::warn!(target: "chatops.store", file = %file_name, error = %err, "write failed");
                outcome.status = OutcomeStatus::Failed;
                outcome.result = format!("Error writing file: {err}");
            }
        }
    }
}

/// Outcome paths relative to the project directory, for reporting.
pub fn relative_outcome_path(store: &OutputStore, path: &Path) -> String {
    path.strip_prefix(store.directory())
        .unwrap_or(path)
        .display()
        .to_string()
}
