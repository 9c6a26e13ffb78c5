use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default chatops data directory: ~/.chatops
pub fn get_chatops_data_dir() -> anyhow::Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".chatops"))
        .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    load(None)
}

/// Loads `explicit` when given, otherwise the first of
/// `~/.chatops/config.toml` and `./chatops.toml` that exists.
/// Environment overrides are applied last.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<AppConfig> {
    let data_dir = get_chatops_data_dir()?;
    let user_config = data_dir.join("config.toml");
    let local_config = Path::new("chatops.toml");

    let mut cfg = if let Some(path) = explicit {
        load_from_path(path)?
    } else if user_config.exists() {
        load_from_path(&user_config)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    if cfg
        .logging
        .directory
        .as_deref()
        .map(|s| s.trim().is_empty())
        .unwrap_or(true)
    {
        cfg.logging.directory = Some(data_dir.join("logs").to_string_lossy().to_string());
    }

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read config {}: {}", path.display(), e))?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
    Ok(cfg)
}

/// Environment variable overrides (Priority 0: highest).
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("CHATOPS_PROVIDER") {
        cfg.completion.provider = v.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    }
    if let Some(v) = get("CHATOPS_ENDPOINT") {
        cfg.completion.endpoint = v;
    }
    if let Some(v) = get("CHATOPS_API_KEY") {
        cfg.completion.api_key = v;
    }
    if let Some(v) = get("CHATOPS_API_VERSION") {
        cfg.completion.api_version = v;
    }
    if let Some(v) = get("CHATOPS_MODEL") {
        cfg.completion.model = v;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CompletionProvider, ObjectivePlacement};
    use std::collections::HashMap;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.chain.max_retries, 3);
        assert_eq!(cfg.output.location, "output");
        assert_eq!(cfg.output.project, "bot");
        assert!((cfg.completion.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(cfg.chain.objective_placement, ObjectivePlacement::EveryRole);
    }

    #[test]
    fn partial_sections_are_filled_in() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [completion]
            provider = "azure"
            model = "gpt-4"

            [chain]
            objective_placement = "first_block"

            [output]
            overwrite = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.completion.provider, CompletionProvider::Azure);
        assert_eq!(cfg.completion.model, "gpt-4");
        assert_eq!(cfg.chain.objective_placement, ObjectivePlacement::FirstBlock);
        assert!(cfg.output.overwrite);
        assert_eq!(cfg.output.project, "bot");
    }

    #[test]
    fn env_overrides_win_and_blank_values_are_ignored() {
        let env: HashMap<&str, &str> = [
            ("CHATOPS_PROVIDER", "replay"),
            ("CHATOPS_MODEL", "gpt-4o"),
            ("CHATOPS_API_KEY", "   "),
        ]
        .into_iter()
        .collect();

        let mut cfg = AppConfig::default();
        cfg.completion.api_key = "from-file".to_string();
        apply_env_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(cfg.completion.provider, CompletionProvider::Replay);
        assert_eq!(cfg.completion.model, "gpt-4o");
        assert_eq!(cfg.completion.api_key, "from-file");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let mut cfg = AppConfig::default();
        let err = apply_env_overrides(&mut cfg, |k| {
            (k == "CHATOPS_PROVIDER").then(|| "bard".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("bard"));
    }

    #[test]
    fn load_from_path_reports_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatops.toml");
        std::fs::write(&path, "[chain]\nmax_retries = \"many\"\n").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("chatops.toml"));
    }
}
