use crate::artifact::{extract, normalize};
use crate::error::ExecError;
use crate::executor::{Executor, OutputOverride};
use crate::store::OutputStore;

use super::types::BatchReport;

/// Extract, validate and execute raw completions against one executor.
pub struct BatchProcessor {
    executor: Executor,
    output_override: OutputOverride,
    test_mode: bool,
    persist_invalid: bool,
}

impl BatchProcessor {
    pub fn new(executor: Executor) -> Self {
        Self {
            executor,
            output_override: OutputOverride::default(),
            test_mode: false,
            persist_invalid: false,
        }
    }

    pub fn with_output_override(mut self, output_override: OutputOverride) -> Self {
        self.output_override = output_override;
        self
    }

    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Also save whatever content invalid records carry, without running it.
    pub fn with_persist_invalid(mut self, persist_invalid: bool) -> Self {
        self.persist_invalid = persist_invalid;
        self
    }

    pub fn store(&self) -> &OutputStore {
        self.executor.store()
    }

    /// Validation problems end up in the report; only a partial override
    /// is an error, raised before anything is written.
    pub async fn process(&mut self, source: &str, raw: &str) -> Result<BatchReport, ExecError> {
        let normalized = normalize(extract(raw));
        tracing::info!(
            target: "chatops.artifact",
            source,
            valid = normalized.valid.len(),
            invalid = normalized.errors.len(),
            "batch validated"
        );

        let mut outcomes = self
            .executor
            .execute(&normalized.valid, &self.output_override, self.test_mode)
            .await?;

        if self.persist_invalid {
            let salvaged: Vec<_> = normalized.errors.iter().filter_map(|e| e.salvage()).collect();
            if !salvaged.is_empty() {
                let saved = self
                    .executor
                    .execute(&salvaged, &OutputOverride::default(), true)
                    .await?;
                outcomes.extend(saved);
            }
        }

        Ok(BatchReport {
            source: source.to_string(),
            valid: normalized.valid.len(),
            invalid: normalized.errors,
            outcomes,
        })
    }
}
