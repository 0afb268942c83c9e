#![allow(clippy::result_large_err)]

use super::ActionsConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &ActionsConfig) -> Result<(), AppError> {
        if config.generator.default_runner.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "generator.default_runner cannot be empty",
            ));
        }

        if config.generator.trigger_branches.is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "generator.trigger_branches must list at least one branch",
            ));
        }

        if let Some(index) = config
            .generator
            .trigger_branches
            .iter()
            .position(|branch| branch.trim().is_empty())
        {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "generator.trigger_branches cannot contain blank entries",
            )
            .with_context("index", index.to_string()));
        }

        if config.fetch.timeout_seconds == 0 {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "fetch.timeout_seconds must be greater than zero",
            ));
        }

        Ok(())
    }
}
