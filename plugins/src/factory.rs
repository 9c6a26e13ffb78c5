use std::sync::Arc;

use anyhow::{bail, Result};

use chatops_core::api::{
    ChainConfig, CompletionBackend, CompletionConfig, CompletionProvider, ProgramRunner,
    RetryStrategyPlugin, Tokenizer,
};

use crate::backend::{ChatCompletionBackend, ReplayBackend};
use crate::executor::{ExponentialBackoffPlugin, ImmediateRetryPlugin, LinearRetryPlugin, RetryBudget};
use crate::runner::ProcessRunnerPlugin;
use crate::tokenizer::HeuristicTokenizer;

pub fn build_backend(cfg: &CompletionConfig) -> Result<Arc<dyn CompletionBackend>> {
    match cfg.provider {
        CompletionProvider::OpenAi => {
            require_api_key(cfg)?;
            Ok(Arc::new(ChatCompletionBackend::openai(
                cfg.endpoint.clone(),
                cfg.api_key.clone(),
                cfg.timeout_ms,
            )?))
        }
        CompletionProvider::Azure => {
            require_api_key(cfg)?;
            Ok(Arc::new(ChatCompletionBackend::azure(
                cfg.endpoint.clone(),
                cfg.api_key.clone(),
                cfg.api_version.clone(),
                cfg.timeout_ms,
            )?))
        }
        CompletionProvider::Replay => {
            let Some(file) = cfg.replay_file.as_deref().filter(|f| !f.trim().is_empty()) else {
                bail!("completion.replay_file is required when provider = \"replay\"");
            };
            let expanded = shellexpand::tilde(file).into_owned();
            Ok(Arc::new(ReplayBackend::new(expanded)))
        }
    }
}

fn require_api_key(cfg: &CompletionConfig) -> Result<()> {
    if cfg.api_key.trim().is_empty() {
        bail!("completion.api_key is required (set it in the config file or CHATOPS_API_KEY)");
    }
    Ok(())
}

pub fn build_retry(cfg: &ChainConfig) -> Result<Arc<dyn RetryStrategyPlugin>> {
    let budget = RetryBudget::new(cfg.max_retries, &cfg.retry);
    match cfg.retry.strategy.as_str() {
        "exponential-backoff" | "exponential" => Ok(Arc::new(ExponentialBackoffPlugin::new(budget))),
        "linear" => Ok(Arc::new(LinearRetryPlugin::new(budget))),
        "none" | "immediate" => Ok(Arc::new(ImmediateRetryPlugin::new(cfg.max_retries))),
        other => bail!("unknown retry strategy: {other}"),
    }
}

pub fn build_tokenizer() -> Box<dyn Tokenizer> {
    Box::new(HeuristicTokenizer)
}

pub fn build_runner() -> Arc<dyn ProgramRunner> {
    Arc::new(ProcessRunnerPlugin::new())
}
