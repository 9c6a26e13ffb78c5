//! Versioned output store: `{location}/{project}_v{N}/{path}/{name}.{ext}`.

mod extension;
mod version;
mod writer;

use std::path::{Path, PathBuf};

pub use extension::{extension_for, DEFAULT_EXTENSION};
pub use version::{resolve_project_dir, resolve_project_version, version_dir, ProjectVersion};
pub use writer::{normalize_relative, sanitize_file_name, write};

/// Output location of one run. The version is resolved once when the store
/// is opened; the directory itself is created on first write.
#[derive(Debug, Clone)]
pub struct OutputStore {
    version: ProjectVersion,
}

impl OutputStore {
    pub fn open(location: &Path, project_name: &str, overwrite: bool) -> Self {
        Self {
            version: resolve_project_version(location, project_name, overwrite),
        }
    }

    pub fn version(&self) -> &ProjectVersion {
        &self.version
    }

    pub fn directory(&self) -> &Path {
        &self.version.directory
    }

    /// File name for an artifact: `{name}.{ext}`, unless `name` already ends
    /// in the extension of `app_type`.
    pub fn file_name(name: &str, app_type: &str) -> String {
        let ext = extension_for(app_type);
        let suffix = format!(".{ext}");
        if name.len() > suffix.len() && name.to_lowercase().ends_with(&suffix.to_lowercase()) {
            name.to_string()
        } else {
            format!("{name}{suffix}")
        }
    }

    pub fn save(
        &self,
        relative_path: &str,
        name: &str,
        app_type: &str,
        content: &str,
    ) -> std::io::Result<PathBuf> {
        write(
            self.directory(),
            relative_path,
            &Self::file_name(name, app_type),
            content,
        )
    }
}
