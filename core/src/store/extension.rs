/// Suffix used when an app type is not in the table.
pub const DEFAULT_EXTENSION: &str = "txt";

const EXTENSIONS: &[(&str, &str)] = &[
    ("python", "py"),
    ("javascript", "js"),
    ("java", "java"),
    ("yaml", "yaml"),
    ("yml", "yml"),
    ("json", "json"),
    ("html", "html"),
    ("css", "css"),
    ("php", "php"),
    ("typescript", "ts"),
    ("c#", "cs"),
    ("shell", "sh"),
    ("sh", "sh"),
    ("bash", "sh"),
    ("ruby", "rb"),
    ("go", "go"),
    ("swift", "swift"),
    ("kotlin", "kt"),
    ("c++", "cpp"),
    ("rust", "rs"),
    ("scala", "scala"),
    ("spark", "py"),
    ("dart", "dart"),
    ("lua", "lua"),
    ("perl", "pl"),
    ("r", "r"),
    ("haskell", "hs"),
    ("objective-c", "m"),
    ("hcl", "tf"),
    ("terraform", "tf"),
    ("markdown", "md"),
    ("md", "md"),
    ("docker", "Dockerfile"),
    ("kubernetes", "yaml"),
    ("powershell", "ps1"),
    ("makefile", "mk"),
    ("sql", "sql"),
    ("toml", "toml"),
    ("ini", "ini"),
    ("conf", "conf"),
    ("env", "env"),
    ("csv", "csv"),
    ("xml", "xml"),
    ("text", "txt"),
    ("txt", "txt"),
];

/// File suffix for an app type, case-insensitive.
pub fn extension_for(app_type: &str) -> &'static str {
    let key = app_type.trim().to_lowercase();
    EXTENSIONS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, ext)| *ext)
        .unwrap_or(DEFAULT_EXTENSION)
}
