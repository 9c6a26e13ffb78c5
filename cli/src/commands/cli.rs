use clap::{Args as ClapArgs, Parser, Subcommand};

pub const DEFAULT_CONTEXT: &str = "You are a helpful AI Assistant with extensive knowledge in programming, writing, and creative development.";
pub const DEFAULT_ROLES_FILE: &str = "prompt_roles.json";

#[derive(Parser, Debug)]
#[command(
    name = "chatops",
    version,
    about = "Chain LLM completions into versioned, executable artifacts"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to load instead of ~/.chatops/config.toml or ./chatops.toml.
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan, complete, extract and execute.
    Run(RunArgs),
    /// Print the role plans as JSON without calling the completion source.
    Plan(PlanArgs),
    /// Extract and execute artifacts from a saved completion.
    Process(ProcessArgs),
    /// Send one prompt (no roles, no chaining) and process the reply.
    Prompt(PromptArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PlanArgs {
    /// Objective sent to every role.
    #[arg(long, default_value = DEFAULT_CONTEXT)]
    pub context: String,

    /// Pairs of task and data values: --tasks-and-data 'Task1' 'Data1' 'Task2' 'Data2'.
    /// A data value naming an existing file is replaced by its contents.
    /// With --data-file every value is a task name.
    #[arg(
        long,
        num_args = 1..,
        default_values = [
            "write a haiku about ChatOps, a prompt engineering framework path should be poems",
            "no data",
        ]
    )]
    pub tasks_and_data: Vec<String>,

    /// File whose contents are the data of every task.
    #[arg(long)]
    pub data_file: Option<String>,

    /// Roles JSON file: {"Role": ["instruction", ...]}.
    #[arg(long)]
    pub roles_file: Option<String>,

    #[arg(long)]
    pub model: Option<String>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output project name; files land in {output-location}/{project-name}_v{N}.
    #[arg(long)]
    pub project_name: Option<String>,

    #[arg(long)]
    pub output_location: Option<String>,

    /// Reuse the latest project version instead of creating a new one.
    #[arg(long)]
    pub overwrite_project: bool,

    /// Save every artifact without running anything.
    #[arg(long)]
    pub test: bool,

    /// Also save the content of structurally invalid records.
    #[arg(long)]
    pub persist_invalid: bool,

    /// File name for executed artifacts (requires --override-app-type).
    #[arg(long)]
    pub override_file_name: Option<String>,

    /// App type for executed artifacts (requires --override-file-name).
    #[arg(long)]
    pub override_app_type: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Cap on concurrent completion calls (0 = unbounded).
    #[arg(long)]
    pub max_concurrency: Option<usize>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ProcessArgs {
    /// Raw completion text to process.
    #[arg(long)]
    pub input: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PromptArgs {
    pub text: String,

    #[arg(long)]
    pub model: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}
