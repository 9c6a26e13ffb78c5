use thiserror::Error;

/// Caller mistakes detected before any artifact of a batch is processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    #[error("output override requires both a file name and an app type (file_name={file_name:?}, app_type={app_type:?})")]
    PartialOverride {
        file_name: Option<String>,
        app_type: Option<String>,
    },
}
