use std::path::{Component, Path, PathBuf};

/// Replaces every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Keeps only the normal components of an artifact's relative path, so
/// `./src`, `/src/` and `src/../src` all land under the project directory.
pub fn normalize_relative(path: &str) -> PathBuf {
    Path::new(path.trim())
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

/// Writes `content` to `{directory}/{relative_path}/{file_name}`, creating
/// missing directories. Returns the written path.
pub fn write(
    directory: &Path,
    relative_path: &str,
    file_name: &str,
    content: &str,
) -> std::io::Result<PathBuf> {
    let folder = directory.join(normalize_relative(relative_path));
    std::fs::create_dir_all(&folder)?;

    let target = folder.join(sanitize_file_name(file_name));
    std::fs::write(&target, content)?;
    tracing::debug!(target: "chatops.store", path = %target.display(), bytes = content.len(), "wrote artifact");
    Ok(target)
}
