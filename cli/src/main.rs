use clap::Parser;
use chatops_cli::app;
use chatops_cli::commands::cli;
use chatops_core::api::{CliError, ExecError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let explicit = args
        .config
        .as_deref()
        .map(|p| std::path::PathBuf::from(shellexpand::tilde(p).into_owned()));
    let cfg = chatops_core::api::load(explicit.as_deref())
        .map_err(|e| CliError::Config(e.to_string()))?;
    init_tracing(&cfg.logging).map_err(CliError::Config)?;

    tracing::debug!(provider = ?cfg.completion.provider, model = %cfg.completion.model, "configuration loaded");

    match args.command {
        cli::Commands::Run(run_args) => app::run_cmd(cfg, run_args).await,
        cli::Commands::Plan(plan_args) => app::plan_cmd(cfg, plan_args).await,
        cli::Commands::Process(process_args) => app::process_cmd(cfg, process_args).await,
        cli::Commands::Prompt(prompt_args) => app::prompt_cmd(cfg, prompt_args).await,
    }
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 11: config error (including a half-specified output override)
    // 12: input error (tasks, data files, roles file)
    // 30: at least one role completion failed
    // 50: internal/uncategorized
    match e {
        CliError::Config(_) => 11,
        CliError::Exec(ExecError::PartialOverride { .. }) => 11,
        CliError::Input(_) => 12,
        CliError::CompletionsFailed { .. } => 30,
        CliError::Anyhow(_) => 50,
    }
}

fn init_tracing(logging: &chatops_core::api::LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(shellexpand::tilde(d).into_owned()),
            None => std::env::temp_dir().join("chatops"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("chatops.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
