use super::{ValidationResult, Validator};
use crate::core::resources::{Resource, ResourceObject};
use std::collections::HashSet;

pub fn built_in_validators() -> Vec<Box<dyn Validator>> {
    vec![
        Box::new(RequiredFieldsValidator),
        Box::new(JobReferenceValidator),
        Box::new(UniqueStageNamesValidator),
    ]
}

/// `apiVersion` and `kind` must be non-empty.
pub struct RequiredFieldsValidator;

impl Validator for RequiredFieldsValidator {
    fn name(&self) -> &'static str {
        "required-fields"
    }

    fn validate(&self, resource: &Resource) -> ValidationResult {
        let mut result = ValidationResult::success();
        if resource.api_version().trim().is_empty() {
            result.add_error("apiVersion is required");
        }
        if resource.kind().trim().is_empty() {
            result.add_error("kind is required");
        }
        result
    }
}

/// Every stage must point at a job defined in the same pipeline.
pub struct JobReferenceValidator;

impl Validator for JobReferenceValidator {
    fn name(&self) -> &'static str {
        "job-references"
    }

    fn handles(&self, resource: &Resource) -> bool {
        resource.as_pipeline().is_some()
    }

    fn validate(&self, resource: &Resource) -> ValidationResult {
        let mut result = ValidationResult::success();
        let Some(pipeline) = resource.as_pipeline() else {
            return result;
        };
        let jobs = &pipeline.pipeline.jobs;

        for stage in &pipeline.pipeline.stages {
            if jobs.contains_key(&stage.job) {
                continue;
            }
            let mut available: Vec<&str> = jobs.keys().map(String::as_str).collect();
            available.sort_unstable();
            let available = if available.is_empty() {
                "none".to_string()
            } else {
                available.join(", ")
            };
            result.add_error(format!(
                "Stage '{}' references undefined job '{}'. Available jobs: {}",
                stage.name, stage.job, available
            ));
        }
        result
    }
}

/// Repeated stage names are suspicious but not fatal.
pub struct UniqueStageNamesValidator;

impl Validator for UniqueStageNamesValidator {
    fn name(&self) -> &'static str {
        "unique-stage-names"
    }

    fn handles(&self, resource: &Resource) -> bool {
        resource.as_pipeline().is_some()
    }

    fn validate(&self, resource: &Resource) -> ValidationResult {
        let mut result = ValidationResult::success();
        let Some(pipeline) = resource.as_pipeline() else {
            return result;
        };

        let mut seen = HashSet::new();
        for stage in &pipeline.pipeline.stages {
            if !seen.insert(stage.name.as_str()) {
                result.add_warning(format!("Duplicate stage name: '{}'", stage.name));
            }
        }
        result
    }
}
