use std::collections::BTreeSet;

/// App types that are persisted as-is and never handed to an interpreter.
pub const NON_EXECUTABLES: &[&str] = &[
    // config and data
    "yaml", "yml", "json", "xml", "csv", "toml", "ini", "conf", "env", "sql", "tf", "hcl",
    "terraform", "dockerfile", "docker", "kubernetes", "makefile",
    // markup and documents
    "html", "md", "markdown", "rst", "css", "scss", "less", "txt", "text", "log", "pdf", "docx",
    "xlsx", "pptx",
    // media and archives
    "jpg", "jpeg", "png", "gif", "svg", "mp3", "mp4", "avi", "mov", "zip", "tar", "gz",
];

#[derive(Debug, Clone)]
pub struct NonExecutables {
    types: BTreeSet<String>,
}

impl Default for NonExecutables {
    fn default() -> Self {
        Self {
            types: NON_EXECUTABLES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl NonExecutables {
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.types
            .extend(extra.into_iter().map(|s| s.as_ref().trim().to_lowercase()));
        self
    }

    pub fn contains(&self, app_type: &str) -> bool {
        self.types.contains(&app_type.trim().to_lowercase())
    }
}
