use thiserror::Error;

use super::executor::ExecError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("input error: {0}")]
    Input(#[from] InputError),
    #[error("executor error: {0}")]
    Exec(#[from] ExecError),
    #[error("{failed} role completion(s) failed")]
    CompletionsFailed { failed: usize },
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Problems with caller-supplied input, raised before any completion call.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("data file not found: {0}")]
    DataFileNotFound(String),
    #[error("data file is empty: {0}")]
    EmptyDataFile(String),
    #[error("pairs of task and data values are required, got {0} value(s)")]
    UnpairedTasks(usize),
    #[error("no tasks were supplied")]
    NoTasks,
    #[error("roles file {path}: {source}")]
    Roles { path: String, source: RolesError },
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

/// Why a roles template could not be turned into role specs.
#[derive(Error, Debug)]
pub enum RolesError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected an object of role -> instructions")]
    NotAnObject,
    #[error("role '{role}' must map to a list of instructions, got {found}")]
    Instructions { role: String, found: String },
    #[error("no roles defined")]
    Empty,
}
