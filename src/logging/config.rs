use crate::logging::layers::console::ConsoleOutput;
use crate::Result;
use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::filter::Directive;

const DEFAULT_LEVEL: &str = "info";

/// Resolved logging configuration after reading the config file and env overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub default_level: String,
    pub log_file: Option<PathBuf>,
    pub console_output: ConsoleOutput,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_level: DEFAULT_LEVEL.to_string(),
            log_file: None,
            console_output: ConsoleOutput::default(),
        }
    }
}

impl LoggingConfig {
    /// Load configuration with deterministic precedence: defaults, config file, env overrides.
    ///
    /// Only the `[logging]` table of the file is read; a missing file leaves the defaults.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut config = LoggingConfig::default();
        if let Some(path) = config_file {
            if let Some(file_config) = Self::load_from_file(path)? {
                config.apply(file_config);
            }
        }
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<Option<TomlLogging>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read logging config {}", path.display()))?;
        let parsed: TomlLogging = toml::from_str(&content)
            .with_context(|| format!("failed to parse logging config {}", path.display()))?;
        Ok(Some(parsed))
    }

    fn apply(&mut self, toml: TomlLogging) {
        if let Some(logging) = toml.logging {
            if let Some(default_level) = logging.default_level {
                self.default_level = default_level;
            }
            if let Some(log_file) = logging.log_file {
                self.log_file = Some(PathBuf::from(log_file));
            }
            if let Some(console_output) = logging.console_output {
                self.console_output = console_output;
            }
        }
    }

    /// `LOG_LEVEL` replaces the configured default; `RUST_LOG` is handled by the filter itself.
    fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("LOG_LEVEL") {
            if !level.trim().is_empty() {
                self.default_level = level.trim().to_lowercase();
            }
        }
    }

    fn validate(&self) -> Result<()> {
        Directive::from_str(&self.default_level)
            .map_err(|_| anyhow!("logging.default_level must be a valid tracing directive"))?;

        if let Some(path) = &self.log_file {
            if path.as_os_str().is_empty() {
                return Err(anyhow!("logging.log_file cannot be empty"));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TomlLogging {
    pub logging: Option<TomlLoggingSection>,
}

#[derive(Debug, Deserialize)]
struct TomlLoggingSection {
    pub default_level: Option<String>,
    pub log_file: Option<String>,
    #[serde(default)]
    pub console_output: Option<ConsoleOutput>,
}
