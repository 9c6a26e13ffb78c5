use crate::chain::{Chainer, RoleStatus};
use crate::error::ExecError;
use crate::plan::RolePlan;

use super::batch::BatchProcessor;
use super::types::RunReport;

/// Chains every plan, then processes each accepted completion in plan and
/// role order.
pub async fn run_plans(
    chainer: &Chainer,
    processor: &mut BatchProcessor,
    plans: &[RolePlan],
) -> Result<RunReport, ExecError> {
    let mut report = RunReport::begin(processor.store().version().clone());
    let completions = chainer.run(plans).await;

    for task in &completions {
        for role in &task.roles {
            report.completions.push(RoleStatus::from(role));
            match &role.outcome {
                Ok(text) => {
                    let source = format!("{}/{}", role.task, role.role);
                    report.batches.push(processor.process(&source, text).await?);
                }
                Err(err) => {
                    tracing::error!(target: "chatops.chain", task = %role.task, role = %role.role, error = %err, "role completion failed");
                }
            }
        }
    }

    report.finish();
    Ok(report)
}

/// One unchained completion for `prompt`, processed like any other batch.
pub async fn run_prompt(
    chainer: &Chainer,
    processor: &mut BatchProcessor,
    prompt: &str,
) -> Result<RunReport, ExecError> {
    let mut report = RunReport::begin(processor.store().version().clone());
    let outcome = chainer.complete_single(prompt).await;
    report.completions.push(RoleStatus {
        task: "prompt".to_string(),
        role: "single".to_string(),
        attempts: 1,
        ok: outcome.is_ok(),
        error: outcome.as_ref().err().map(|e| e.to_string()),
    });
    match outcome {
        Ok(text) => report.batches.push(processor.process("prompt", &text).await?),
        Err(err) => tracing::error!(target: "chatops.chain", error = %err, "single completion failed"),
    }
    report.finish();
    Ok(report)
}

/// Processes a saved raw completion without calling the completion source.
pub async fn process_input(
    processor: &mut BatchProcessor,
    source: &str,
    raw: &str,
) -> Result<RunReport, ExecError> {
    let mut report = RunReport::begin(processor.store().version().clone());
    report.batches.push(processor.process(source, raw).await?);
    report.finish();
    Ok(report)
}
