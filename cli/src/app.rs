use std::path::{Path, PathBuf};
use std::sync::Arc;

use chatops_core::api::{
    parse_roles, process_input, run_plans, run_prompt, AppConfig, BatchProcessor, Chainer,
    CliError, Executor, InputError, NonExecutables, OutputOverride, OutputStore, PromptBuilder,
    RolePlan, RoleSpec, RunReport, TaskCatalog,
};
use chatops_plugins::factory;

use crate::commands::cli::{OutputArgs, PlanArgs, ProcessArgs, PromptArgs, RunArgs, DEFAULT_ROLES_FILE};

/// Reads a data file and wraps it in triple quotes so the content reaches
/// the completion source as one opaque literal.
pub fn read_data_file(path: &str) -> Result<String, InputError> {
    let expanded = shellexpand::tilde(path).into_owned();
    let path = Path::new(&expanded);
    if !path.is_file() {
        return Err(InputError::DataFileNotFound(expanded));
    }
    let data = std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: expanded.clone(),
        source,
    })?;
    if data.trim().is_empty() {
        return Err(InputError::EmptyDataFile(expanded));
    }
    Ok(format!("\"\"\"{data}\"\"\""))
}

/// Builds the task catalog from `--tasks-and-data` / `--data-file`.
pub fn load_tasks(values: &[String], data_file: Option<&str>) -> Result<TaskCatalog, InputError> {
    if values.is_empty() {
        return Err(InputError::NoTasks);
    }

    let mut catalog = TaskCatalog::new();
    if let Some(file) = data_file {
        let data = read_data_file(file)?;
        for task in values {
            catalog.add(task.clone(), Some(data.clone()));
        }
        return Ok(catalog);
    }

    if values.len() % 2 != 0 {
        return Err(InputError::UnpairedTasks(values.len()));
    }
    for pair in values.chunks(2) {
        let data = if Path::new(&pair[1]).is_file() {
            read_data_file(&pair[1])?
        } else {
            pair[1].clone()
        };
        catalog.add(pair[0].clone(), Some(data));
    }
    Ok(catalog)
}

pub fn default_roles() -> Vec<RoleSpec> {
    vec![
        RoleSpec {
            name: "Technical Writer".to_string(),
            instructions: vec![
                "You are a technical writer at ChatOps, it is your job to produce amazing content. Always fact check whatever you write and do not make things up".to_string(),
                "Make sure your content is coherent and that all of it comes together nicely".to_string(),
            ],
        },
        RoleSpec {
            name: "Quality Control".to_string(),
            instructions: vec![
                "You are a QA specialist, your job is to review the content generated previously, fix any issues and add improvements as needed".to_string(),
            ],
        },
    ]
}

/// Loads roles from `path`. Without an explicit path, `prompt_roles.json`
/// is used when present and the built-in roles otherwise.
pub fn load_roles(path: Option<&str>) -> Result<Vec<RoleSpec>, InputError> {
    let (path, explicit) = match path {
        Some(p) => (shellexpand::tilde(p).into_owned(), true),
        None => (DEFAULT_ROLES_FILE.to_string(), false),
    };
    if !explicit && !Path::new(&path).is_file() {
        tracing::info!(target: "chatops.plan", "no {DEFAULT_ROLES_FILE} found, using built-in roles");
        return Ok(default_roles());
    }

    let text = std::fs::read_to_string(&path).map_err(|source| InputError::Read {
        path: path.clone(),
        source,
    })?;
    parse_roles(&text).map_err(|source| InputError::Roles { path, source })
}

pub fn apply_output_args(cfg: &mut AppConfig, out: &OutputArgs) {
    if let Some(project) = &out.project_name {
        cfg.output.project = project.clone();
    }
    if let Some(location) = &out.output_location {
        cfg.output.location = location.clone();
    }
    cfg.output.overwrite |= out.overwrite_project;
    cfg.output.persist_invalid |= out.persist_invalid;
    cfg.executor.test_mode |= out.test;
}

/// Resolves the override flags up front so a half-given pair fails before
/// any completion call or version lookup.
fn checked_override(out: &OutputArgs) -> Result<OutputOverride, CliError> {
    let output_override =
        OutputOverride::new(out.override_file_name.clone(), out.override_app_type.clone());
    output_override.resolve()?;
    Ok(output_override)
}

fn open_processor(cfg: &AppConfig, output_override: OutputOverride) -> BatchProcessor {
    let location = PathBuf::from(shellexpand::tilde(&cfg.output.location).into_owned());
    let store = OutputStore::open(&location, &cfg.output.project, cfg.output.overwrite);
    let non_executables = NonExecutables::default().with_extra(&cfg.executor.extra_non_executables);
    let executor = Executor::new(store, factory::build_runner()).with_non_executables(non_executables);

    BatchProcessor::new(executor)
        .with_output_override(output_override)
        .with_test_mode(cfg.executor.test_mode)
        .with_persist_invalid(cfg.output.persist_invalid)
}

fn build_chainer(cfg: &AppConfig) -> Result<Chainer, CliError> {
    let backend =
        factory::build_backend(&cfg.completion).map_err(|e| CliError::Config(e.to_string()))?;
    let retry = factory::build_retry(&cfg.chain).map_err(|e| CliError::Config(e.to_string()))?;
    Ok(Chainer::new(backend, retry, cfg.completion.model.clone())
        .with_temperature(cfg.completion.temperature)
        .with_max_concurrency(cfg.chain.max_concurrency))
}

fn build_plans(cfg: &AppConfig, args: &PlanArgs) -> Result<Vec<RolePlan>, CliError> {
    let catalog = load_tasks(&args.tasks_and_data, args.data_file.as_deref())?;
    let roles = load_roles(args.roles_file.as_deref())?;
    let tokenizer = factory::build_tokenizer();
    let builder = PromptBuilder::new(args.context.clone(), roles, cfg.completion.model.clone())
        .with_placement(cfg.chain.objective_placement);
    Ok(builder.plan(&catalog, tokenizer.as_ref()))
}

pub async fn run_cmd(mut cfg: AppConfig, args: RunArgs) -> Result<i32, CliError> {
    if let Some(model) = &args.plan.model {
        cfg.completion.model = model.clone();
    }
    if let Some(max_retries) = args.max_retries {
        cfg.chain.max_retries = max_retries;
    }
    if let Some(max_concurrency) = args.max_concurrency {
        cfg.chain.max_concurrency = max_concurrency;
    }
    apply_output_args(&mut cfg, &args.output);

    // Input problems surface before any completion call or version lookup.
    let plans = build_plans(&cfg, &args.plan)?;
    let output_override = checked_override(&args.output)?;
    let chainer = build_chainer(&cfg)?;
    let mut processor = open_processor(&cfg, output_override);

    let report = run_plans(&chainer, &mut processor, &plans).await?;
    print_report(&report)
}

pub async fn plan_cmd(mut cfg: AppConfig, args: PlanArgs) -> Result<i32, CliError> {
    if let Some(model) = &args.model {
        cfg.completion.model = model.clone();
    }
    let plans = build_plans(&cfg, &args)?;
    let out = serde_json::to_string_pretty(&plans).map_err(anyhow::Error::from)?;
    println!("{out}");
    Ok(0)
}

pub async fn process_cmd(mut cfg: AppConfig, args: ProcessArgs) -> Result<i32, CliError> {
    apply_output_args(&mut cfg, &args.output);
    let output_override = checked_override(&args.output)?;
    let path = shellexpand::tilde(&args.input).into_owned();
    let raw = std::fs::read_to_string(&path).map_err(|source| InputError::Read {
        path: path.clone(),
        source,
    })?;

    let mut processor = open_processor(&cfg, output_override);
    let report = process_input(&mut processor, &path, &raw).await?;
    print_report(&report)
}

pub async fn prompt_cmd(mut cfg: AppConfig, args: PromptArgs) -> Result<i32, CliError> {
    if let Some(model) = &args.model {
        cfg.completion.model = model.clone();
    }
    apply_output_args(&mut cfg, &args.output);
    let output_override = checked_override(&args.output)?;
    let chainer = build_chainer(&cfg)?;
    let mut processor = open_processor(&cfg, output_override);

    let report = run_prompt(&chainer, &mut processor, &args.text).await?;
    print_report(&report)
}

fn print_report(report: &RunReport) -> Result<i32, CliError> {
    let out = serde_json::to_string_pretty(report).map_err(anyhow::Error::from)?;
    println!("{out}");

    let failed = report.failed_completions();
    if failed > 0 {
        return Err(CliError::CompletionsFailed { failed });
    }
    Ok(0)
}
