use std::path::{Path, PathBuf};

use serde::Serialize;

/// A numbered output directory `{location}/{project}_v{version}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectVersion {
    pub project_name: String,
    pub version: u32,
    pub directory: PathBuf,
}

pub fn version_dir(location: &Path, project_name: &str, version: u32) -> PathBuf {
    location.join(format!("{project_name}_v{version}"))
}

/// Probes `_v1`, `_v2`, ... and picks the first unused version. With
/// `overwrite`, the latest existing version is reused instead (version 1
/// when none exists yet).
///
/// The lookup is not atomic: concurrent runs against the same project name
/// can pick the same directory.
pub fn resolve_project_version(location: &Path, project_name: &str, overwrite: bool) -> ProjectVersion {
    let mut version = 1;
    while version_dir(location, project_name, version).exists() {
        version += 1;
    }
    if overwrite {
        version = (version - 1).max(1);
    }

    let directory = version_dir(location, project_name, version);
    tracing::info!(target: "chatops.store", project = %project_name, version, dir = %directory.display(), overwrite, "resolved project directory");
    ProjectVersion {
        project_name: project_name.to_string(),
        version,
        directory,
    }
}

pub fn resolve_project_dir(location: &Path, project_name: &str, overwrite: bool) -> PathBuf {
    resolve_project_version(location, project_name, overwrite).directory
}
