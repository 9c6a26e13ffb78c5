use crate::error::ExecError;

/// Optional batch-wide destination override for executed artifacts.
/// Both halves must be supplied together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputOverride {
    pub file_name: Option<String>,
    pub app_type: Option<String>,
}

/// A complete `(file_name, app_type)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOverride {
    pub file_name: String,
    pub app_type: String,
}

impl OutputOverride {
    pub fn new(file_name: Option<String>, app_type: Option<String>) -> Self {
        Self {
            file_name,
            app_type,
        }
    }

    /// `Ok(None)` when neither half is set, `PartialOverride` when only one is.
    pub fn resolve(&self) -> Result<Option<ResolvedOverride>, ExecError> {
        match (&self.file_name, &self.app_type) {
            (None, None) => Ok(None),
            (Some(file_name), Some(app_type)) => Ok(Some(ResolvedOverride {
                file_name: file_name.clone(),
                app_type: app_type.trim().to_lowercase(),
            })),
            _ => Err(ExecError::PartialOverride {
                file_name: self.file_name.clone(),
                app_type: self.app_type.clone(),
            }),
        }
    }
}
