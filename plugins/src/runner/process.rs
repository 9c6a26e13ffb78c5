use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use chatops_core::api::{ProgramOutput, ProgramRunner, RunError};

/// Runs artifact content on the host as `{interpreter} -c {content}`.
/// No sandboxing: the interpreter sees the caller's environment.
pub struct ProcessRunnerPlugin {}

impl ProcessRunnerPlugin {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for ProcessRunnerPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgramRunner for ProcessRunnerPlugin {
    fn name(&self) -> &str {
        "process"
    }

    async fn run(&self, interpreter: &str, content: &str) -> Result<ProgramOutput, RunError> {
        tracing::debug!(target: "chatops.exec", interpreter, bytes = content.len(), "spawning interpreter");
        let output = Command::new(interpreter)
            .arg("-c")
            .arg(content)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => RunError::NotInstalled(interpreter.to_string()),
                _ => RunError::Spawn {
                    interpreter: interpreter.to_string(),
                    message: err.to_string(),
                },
            })?;

        Ok(ProgramOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
