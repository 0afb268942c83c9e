use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Resource files to merge, in order
    #[arg(value_name = "FILE", required = true)]
    pub input_files: Vec<PathBuf>,

    /// Write the workflow here instead of stdout (parent directories are created)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Runner used for every job (default: ubuntu-latest)
    #[arg(long, value_name = "RUNNER")]
    pub default_runner: Option<String>,

    /// Generate even if validation reports errors
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Resource files to validate
    #[arg(value_name = "FILE", required = true)]
    pub input_files: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Local paths or GitHub/GitLab URLs, separated by commas or whitespace
    #[arg(long, value_name = "SOURCES")]
    pub sources: String,

    /// Access token for remote sources
    #[arg(long, value_name = "TOKEN", env = "LOOM_ACTIONS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Write the workflow here instead of stdout (parent directories are created)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Runner used for every job (default: ubuntu-latest)
    #[arg(long, value_name = "RUNNER")]
    pub default_runner: Option<String>,

    /// Extra global variables, e.g. "KEY1=val1; KEY2=val2"
    #[arg(long, value_name = "VARS")]
    pub pipeline_vars: Option<String>,

    /// Generate even if validation reports errors
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct MatrixArgs {
    /// Local paths or GitHub/GitLab URLs, separated by commas or whitespace
    #[arg(long, value_name = "SOURCES")]
    pub sources: String,

    /// Access token for remote sources
    #[arg(long, value_name = "TOKEN", env = "LOOM_ACTIONS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Extra global variables, e.g. "KEY1=val1; KEY2=val2"
    #[arg(long, value_name = "VARS")]
    pub pipeline_vars: Option<String>,

    /// Emit the matrix even if validation reports errors
    #[arg(long)]
    pub force: bool,
}
