use async_trait::async_trait;
use thiserror::Error;

/// Captured result of one interpreter invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProgramOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("{0} is not installed")]
    NotInstalled(String),
    #[error("failed to spawn {interpreter}: {message}")]
    Spawn {
        interpreter: String,
        message: String,
    },
}

/// Runs artifact content as `{interpreter} -c {content}`.
#[async_trait]
pub trait ProgramRunner: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self, interpreter: &str, content: &str) -> Result<ProgramOutput, RunError>;
}
