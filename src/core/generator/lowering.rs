//! Conversion of typed resources into workflow fragments.

use super::document::{Container, Step, WorkflowFragment, WorkflowJob};
use super::GenerationError;
use crate::core::config::DEFAULT_RUNNER;
use crate::core::resources::{
    Job, JobWhen, LoomConfig, LoomPipeline, PipelineSpec, ResourceObject,
};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

pub const CHECKOUT_ACTION: &str = "actions/checkout@v4";
pub const UPLOAD_ARTIFACT_ACTION: &str = "actions/upload-artifact@v4";

impl ResourceObject for LoomConfig {
    fn api_version(&self) -> &str {
        &self.api_version
    }

    fn kind(&self) -> &str {
        &self.kind
    }

    /// Configs only contribute global env. Credentials are not emitted.
    fn lower(&self) -> Result<WorkflowFragment, GenerationError> {
        Ok(WorkflowFragment {
            env: self.global.vars.clone(),
            ..WorkflowFragment::default()
        })
    }
}

impl ResourceObject for LoomPipeline {
    fn api_version(&self) -> &str {
        &self.api_version
    }

    fn kind(&self) -> &str {
        &self.kind
    }

    fn lower(&self) -> Result<WorkflowFragment, GenerationError> {
        lower_pipeline(&self.pipeline)
    }
}

fn lower_pipeline(spec: &PipelineSpec) -> Result<WorkflowFragment, GenerationError> {
    let mut jobs = IndexMap::new();

    // Each staged job needs the job of the stage right before it, whether or not that job exists.
    let mut previous: Option<&str> = None;
    for stage in &spec.stages {
        if let Some(job) = spec.jobs.get(&stage.job) {
            let needs = previous.map(|key| vec![key.to_string()]).unwrap_or_default();
            jobs.insert(stage.job.clone(), lower_job(&stage.job, job, needs)?);
        } else {
            tracing::debug!(
                "stage '{}' skipped: job '{}' is not defined",
                stage.name,
                stage.job
            );
        }
        previous = Some(&stage.job);
    }

    for (key, job) in &spec.jobs {
        if !jobs.contains_key(key) {
            jobs.insert(key.clone(), lower_job(key, job, Vec::new())?);
        }
    }

    Ok(WorkflowFragment {
        name: spec.name.clone().filter(|name| !name.is_empty()),
        trigger: spec.trigger.clone(),
        env: spec.vars.clone(),
        jobs,
    })
}

fn lower_job(key: &str, job: &Job, needs: Vec<String>) -> Result<WorkflowJob, GenerationError> {
    let mut env = job.variables.clone();
    if let Some(input) = &job.input {
        for (name, value) in input.params.iter().chain(&input.secure_params) {
            env.insert(normalize_param_key(name), value.clone());
        }
    }

    let mut steps = vec![
        Step::uses(CHECKOUT_ACTION),
        Step::run(format!("Run {}", job.command), format!("loom {}", job.command)),
    ];
    if let Some(output) = job.output.as_ref().filter(|output| !output.files.is_empty()) {
        let paths: Vec<&str> = output.files.values().map(String::as_str).collect();
        steps.push(Step {
            name: Some("Upload artifacts".to_string()),
            condition: Some("always()".to_string()),
            uses: Some(UPLOAD_ARTIFACT_ACTION.to_string()),
            run: None,
            with: IndexMap::from([
                ("name".to_string(), format!("{}-artifacts", key)),
                ("path".to_string(), paths.join("\n")),
            ]),
        });
    }

    let condition = match &job.when {
        Some(when) => guard(key, when)?,
        None => None,
    };

    Ok(WorkflowJob {
        runs_on: DEFAULT_RUNNER.to_string(),
        container: Container {
            image: job.path.clone(),
        },
        needs,
        env,
        steps,
        condition,
    })
}

/// `db.host` becomes `DB_HOST`.
fn normalize_param_key(key: &str) -> String {
    key.replace('.', "_").to_uppercase()
}

fn condition_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\w+)\s*(==|!=)\s*(.+)$").expect("condition pattern is valid")
    })
}

fn guard(key: &str, when: &JobWhen) -> Result<Option<String>, GenerationError> {
    let statuses = when.statuses.as_deref().filter(|s| !s.is_empty());
    match when.condition.as_deref().filter(|c| !c.is_empty()) {
        Some(condition) => {
            let mut parts = vec![render_condition(key, condition)?];
            if let Some(statuses) = statuses {
                parts.push(status_function(statuses).to_string());
            }
            Ok(Some(parts.join(" && ")))
        }
        None => Ok(statuses.map(|s| status_function(s).to_string())),
    }
}

/// `VAR op VALUE` as a GitHub expression over the job env.
fn render_condition(key: &str, condition: &str) -> Result<String, GenerationError> {
    let caps = condition_pattern()
        .captures(condition.trim())
        .ok_or_else(|| GenerationError::InvalidCondition {
            job: key.to_string(),
            condition: condition.to_string(),
        })?;
    Ok(format!(
        "${{{{ env.{} }}}} {} '{}'",
        &caps[1],
        &caps[2],
        caps[3].trim()
    ))
}

fn status_function(status: &str) -> &'static str {
    match status.to_ascii_uppercase().as_str() {
        "SUCCESS" => "success()",
        "FAILURE" => "failure()",
        "ALWAYS" => "always()",
        other => {
            tracing::warn!("unknown status '{}', falling back to success()", other);
            "success()"
        }
    }
}
