use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub chain: ChainConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub executor: ExecutorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (`~/.chatops/logs` if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "chatops_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    false
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionProvider {
    OpenAi,
    Azure,
    Replay,
}

impl std::str::FromStr for CompletionProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "azure" => Ok(Self::Azure),
            "replay" => Ok(Self::Replay),
            other => Err(format!("unknown completion provider: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_provider")]
    pub provider: CompletionProvider,

    /// Base URL of the chat-completion service.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: String,

    /// Only used by the Azure flavour.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Model name (OpenAI) or deployment name (Azure).
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Canned completions for the replay provider.
    #[serde(default)]
    pub replay_file: Option<String>,
}

fn default_provider() -> CompletionProvider {
    CompletionProvider::OpenAi
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_version() -> String {
    "2023-05-15".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout_ms() -> u64 {
    120_000
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: default_endpoint(),
            api_key: String::new(),
            api_version: default_api_version(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_ms: default_timeout_ms(),
            replay_file: None,
        }
    }
}

/// Where the objective system message goes in a role plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectivePlacement {
    /// Every role block of every task starts with the objective.
    #[default]
    EveryRole,
    /// Only the first role block of the first task carries it.
    FirstBlock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Upper bound on in-flight completion calls; 0 means unbounded.
    #[serde(default)]
    pub max_concurrency: usize,

    #[serde(default)]
    pub objective_placement: ObjectivePlacement,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_max_retries() -> u32 {
    3
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            max_concurrency: 0,
            objective_placement: ObjectivePlacement::default(),
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retry_strategy")]
    pub strategy: String,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            strategy: default_retry_strategy(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_retry_strategy() -> String {
    "exponential-backoff".to_string()
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    8_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_location")]
    pub location: String,

    #[serde(default = "default_output_project")]
    pub project: String,

    /// Reuse the latest `{project}_v{N}` directory instead of creating a new one.
    #[serde(default)]
    pub overwrite: bool,

    /// Save structurally invalid artifacts that still carry content.
    #[serde(default)]
    pub persist_invalid: bool,
}

fn default_output_location() -> String {
    "output".to_string()
}

fn default_output_project() -> String {
    "bot".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            location: default_output_location(),
            project: default_output_project(),
            overwrite: false,
            persist_invalid: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Save every artifact without running anything.
    #[serde(default)]
    pub test_mode: bool,

    /// App types treated as save-only in addition to the built-in set.
    #[serde(default)]
    pub extra_non_executables: Vec<String>,
}
