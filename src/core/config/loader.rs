#![allow(clippy::result_large_err)]

use super::ActionsConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::Path;

/// File looked up in the working directory when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "loom-actions.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from `dir/loom-actions.toml`, falling back to defaults when absent.
    /// Environment variables override file values.
    pub fn load_from_dir(dir: &Path) -> Result<ActionsConfig, AppError> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        let mut config = Self::load_from_file(&config_path)?.unwrap_or_default();
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Load config from an explicit path. A missing file is an error here.
    pub fn load_explicit(path: &Path) -> Result<ActionsConfig, AppError> {
        let mut config = Self::load_from_file(path)?.ok_or_else(|| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Config file {} does not exist", path.display()),
            )
            .with_context("path", path.display().to_string())
        })?;
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Returns Ok(None) if the file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<ActionsConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: ActionsConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
        })?;

        tracing::debug!("loaded configuration from {}", path.display());
        Ok(Some(config))
    }

    /// Environment variables take precedence over config file values.
    /// Unparseable values are ignored.
    fn apply_env_overrides(config: &mut ActionsConfig) {
        if let Ok(runner) = env::var("LOOM_ACTIONS_DEFAULT_RUNNER") {
            config.generator.default_runner = runner;
        }

        if let Ok(branches) = env::var("LOOM_ACTIONS_TRIGGER_BRANCHES") {
            config.generator.trigger_branches = branches
                .split(',')
                .map(str::trim)
                .filter(|branch| !branch.is_empty())
                .map(String::from)
                .collect();
        }

        if let Ok(sort_keys_str) = env::var("LOOM_ACTIONS_SORT_KEYS") {
            if let Ok(sort_keys) = sort_keys_str.parse::<bool>() {
                config.generator.emit.sort_keys = sort_keys;
            }
        }

        if let Ok(timeout_str) = env::var("LOOM_ACTIONS_FETCH_TIMEOUT") {
            if let Ok(timeout) = timeout_str.parse::<u64>() {
                config.fetch.timeout_seconds = timeout;
            }
        }
    }

    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "LOOM_ACTIONS_DEFAULT_RUNNER - Override the runner for every job (default: ubuntu-latest)",
            "LOOM_ACTIONS_TRIGGER_BRANCHES - Comma-separated branches for the default push trigger (default: main)",
            "LOOM_ACTIONS_SORT_KEYS - Sort keys in generated output (true/false, default: false)",
            "LOOM_ACTIONS_FETCH_TIMEOUT - Remote fetch timeout in seconds (default: 30)",
        ]
    }
}
