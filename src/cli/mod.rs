pub mod args;
pub mod commands;

pub use args::{GenerateArgs, MatrixArgs, RunArgs, ValidateArgs};
use crate::core::ConfigLoader;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
COMMANDS:\n{subcommands}\n\
{after-help}";

#[derive(Parser, Debug)]
#[command(name = "loom-actions")]
#[command(version = crate::VERSION)]
#[command(about = "Translate Loom pipeline resources into GitHub Actions workflows")]
#[command(help_template = HELP_TEMPLATE)]
#[command(after_long_help = long_help_footer())]
pub struct Args {
    /// Tool configuration file (default: ./loom-actions.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        about = "Generate a workflow from local resource files",
        long_about = "Generate decodes every document in the given files, validates them, and writes one merged GitHub Actions workflow.",
        after_help = "Example:\n    loom-actions generate config.yaml pipeline.yaml -o .github/workflows/ci.yaml"
    )]
    Generate(GenerateArgs),
    #[command(
        about = "Validate resource files without generating",
        long_about = "Validate decodes the given files and runs every validation rule, reporting errors and warnings per resource.",
        after_help = "Example:\n    loom-actions validate pipeline.yaml"
    )]
    Validate(ValidateArgs),
    #[command(
        about = "Fetch sources and generate a workflow",
        long_about = "Run fetches local or remote sources (GitHub/GitLab blob URLs are translated to raw URLs), then validates and generates.",
        after_help = "Example:\n    loom-actions run --sources \"https://github.com/acme/ci/blob/main/loom.yaml, local.yaml\" --pipeline-vars \"ENV=prod\""
    )]
    Run(RunArgs),
    #[command(
        about = "Emit a JSON job matrix for dynamic workflows",
        long_about = "Generate-matrix produces {\"include\": [...]} with one entry per generated job, suitable for strategy.matrix.",
        after_help = "Example:\n    loom-actions generate-matrix --sources pipeline.yaml"
    )]
    GenerateMatrix(MatrixArgs),
    #[command(about = "List registered resource types")]
    ListTypes,
}

/// Workflow hint plus the environment overrides the config loader honours.
fn long_help_footer() -> String {
    let mut footer = String::from(
        "Typical flow: validate resource files, then generate a workflow from them or from remote sources with run.\n\nENVIRONMENT:\n",
    );
    for line in ConfigLoader::env_var_documentation() {
        footer.push_str("    ");
        footer.push_str(line);
        footer.push('\n');
    }
    footer
}

pub async fn run(args: Args) -> crate::Result<()> {
    let config = commands::load_config(args.config.as_deref())?;
    match args.command {
        Command::Generate(generate_args) => commands::generate(generate_args, config),
        Command::Validate(validate_args) => commands::validate(validate_args),
        Command::Run(run_args) => commands::run(run_args, config).await,
        Command::GenerateMatrix(matrix_args) => commands::generate_matrix(matrix_args, config).await,
        Command::ListTypes => commands::list_types(),
    }
}
