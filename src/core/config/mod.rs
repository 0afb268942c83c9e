use serde::{Deserialize, Serialize};

/// Runner every lowered job starts with before any override.
pub const DEFAULT_RUNNER: &str = "ubuntu-latest";

/// Tool configuration loaded from loom-actions.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ActionsConfig {
    /// Workflow generation settings
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Remote source retrieval settings
    #[serde(default)]
    pub fetch: FetchSettings,
}

/// Settings consumed by the workflow generator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    /// Runner written to `runs-on`; anything other than the built-in default replaces every job's runner
    #[serde(default = "default_runner")]
    pub default_runner: String,

    /// Branches for the push trigger used when no pipeline declares one
    #[serde(default = "default_trigger_branches")]
    pub trigger_branches: Vec<String>,

    #[serde(default)]
    pub emit: EmitStyle,
}

/// Serialization flags for generated text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct EmitStyle {
    /// Emit the whole document in flow style
    #[serde(default)]
    pub default_flow_style: bool,

    /// Sort mapping keys recursively
    #[serde(default)]
    pub sort_keys: bool,
}

/// Fetcher configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchSettings {
    /// Per-request timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_runner() -> String {
    DEFAULT_RUNNER.to_string()
}

fn default_trigger_branches() -> Vec<String> {
    vec!["main".to_string()]
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            default_runner: default_runner(),
            trigger_branches: default_trigger_branches(),
            emit: EmitStyle::default(),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        FetchSettings {
            timeout_seconds: default_timeout_seconds(),
        }
    }
}


pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;
